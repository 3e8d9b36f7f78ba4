//! Storage record models for the durable session copy.
//!
//! These types are separate from the domain `Session` so the on-disk format can
//! evolve (via `version`) without touching the reducer.

use crate::domain::UserProfile;
use serde::{Deserialize, Serialize};

/// Current on-disk format version.
pub const STORED_SESSION_VERSION: u32 = 1;

/// What survives a restart: the bearer token and the last-known user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    /// Format version for future migrations.
    pub version: u32,

    /// Bearer token handed out by the login endpoint.
    pub token: String,

    /// Last-known user object, serialized JSON in the original browser
    /// storage; kept structured here. `None` if it could not be parsed.
    #[serde(default)]
    pub user: Option<UserProfile>,
}

impl StoredSession {
    /// Creates a record at the current format version.
    ///
    /// # Examples
    ///
    /// ```
    /// use campus_portal::storage::StoredSession;
    ///
    /// let record = StoredSession::new("tok", None);
    /// assert_eq!(record.token, "tok");
    /// assert!(record.user.is_none());
    /// ```
    pub fn new(token: impl Into<String>, user: Option<UserProfile>) -> Self {
        Self {
            version: STORED_SESSION_VERSION,
            token: token.into(),
            user,
        }
    }
}
