//! Actions representing side effects to be executed by the runtime.
//!
//! This module defines the [`Action`] type, which represents imperative commands
//! produced by the event handler after processing user input or remote replies.
//! Actions bridge pure state transformations and effectful operations like HTTP
//! calls, timers and the durable credential store.
//!
//! # Architecture
//!
//! The event handler returns a `Vec<Action>` after processing each event, allowing
//! multiple side effects to be queued atomically. The runtime executes them in
//! order; remote calls run concurrently and report back as events.
//!
//! # Example
//!
//! ```rust
//! use campus_portal::app::{Action, ListKind};
//! use tokio::time::{Duration, Instant};
//!
//! let actions = vec![
//!     Action::ClearStoredSession,
//!     Action::ScheduleSearch {
//!         list: ListKind::Courses,
//!         deadline: Instant::now() + Duration::from_millis(500),
//!     },
//! ];
//! assert_eq!(actions.len(), 2);
//! ```

use crate::remote::RemoteCall;
use crate::routing::Route;
use crate::storage::StoredSession;
use serde::Serialize;
use std::fmt;
use tokio::time::Instant;

/// A paged, searchable collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ListKind {
    Courses,
    Teachers,
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Courses => "courses",
            Self::Teachers => "teachers",
        })
    }
}

/// Commands representing side effects to be executed by the runtime.
///
/// Actions are produced by the event handler and executed by the runtime. They
/// represent the boundary between pure state transformations and effectful
/// operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Runs a backend request on a background task.
    ///
    /// The reply comes back as `Event::Remote` carrying the same ticket.
    Remote(RemoteCall),

    /// Writes the token and user to the durable credential store.
    PersistSession(StoredSession),

    /// Removes the durable credential copy.
    ClearStoredSession,

    /// Arms the debounce timer of a search box.
    ///
    /// When `deadline` passes the runtime delivers `Event::SearchDeadline`.
    /// Re-arming replaces any pending timer for the same list.
    ScheduleSearch {
        /// Which list's search box was edited.
        list: ListKind,
        /// Instant at which the typed text should be committed.
        deadline: Instant,
    },

    /// The handler moved the user to another route on its own, e.g. after
    /// login, logout or an expired session.
    Redirect(Route),
}
