//! Application layer coordinating state, events, and actions.
//!
//! This module defines the core client logic, sitting between the runtime
//! (`runtime.rs`, driven by a front-end) and the domain, remote and storage
//! layers. It is pure: nothing in here performs I/O or reads the clock.
//!
//! # Architecture
//!
//! The application layer follows a unidirectional data flow pattern:
//!
//! ```text
//! Intent → Event → handle_event → State Mutations → Actions → Runtime
//!                      ↑                                        ↓
//!                      └──────── Remote replies, timers ────────┘
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Side effect commands emitted by the event handler
//! - [`debounce`]: Quiet-period tracking for search boxes
//! - [`handler`]: Event processing logic and state transition coordinator
//! - [`notification`]: Toast-style messages queued for the front-end
//! - [`slot`]: Per-collection request status and stale-reply detection
//! - [`state`]: Central application state container and view model computation
//!
//! # Example
//!
//! ```rust
//! use campus_portal::app::{handle_event, AppState, Event};
//! use campus_portal::Config;
//!
//! let mut state = AppState::new(&Config::default());
//! let (_changed, actions) = handle_event(&mut state, &Event::Logout)?;
//! assert!(!actions.is_empty());
//! # Ok::<(), campus_portal::domain::PortalError>(())
//! ```

pub mod actions;
pub mod debounce;
pub mod handler;
pub mod notification;
pub mod slot;
pub mod state;

pub use actions::{Action, ListKind};
pub use debounce::Debouncer;
pub use handler::{handle_event, Event};
pub use notification::{Notification, NotificationLevel};
pub use slot::{ListQuery, ListResult, RequestStatus, Resource, SlotId, Ticket};
pub use state::{AppState, FormError};
