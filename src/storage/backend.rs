//! Credential storage abstraction.
//!
//! This module defines the [`CredentialStore`] trait over the durable copy of the
//! session. The runtime only ever loads it once at start-up, overwrites it on
//! login and clears it on logout.

use crate::domain::error::Result;
use crate::storage::models::StoredSession;

/// Abstraction over durable client-side session storage.
///
/// # Implementations
///
/// - [`JsonCredentialStore`](crate::storage::JsonCredentialStore): JSON file with
///   atomic writes (default)
/// - [`MemoryCredentialStore`](crate::storage::MemoryCredentialStore): process-local,
///   used by tests and by `--ephemeral` runs
///
/// # Examples
///
/// ```no_run
/// use campus_portal::storage::{CredentialStore, JsonCredentialStore, StoredSession};
/// use std::path::PathBuf;
///
/// let mut store = JsonCredentialStore::new(PathBuf::from("/tmp/session.json"))?;
/// store.save(&StoredSession::new("token", None))?;
/// assert!(store.load()?.is_some());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait CredentialStore: Send {
    /// Returns the stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn load(&self) -> Result<Option<StoredSession>>;

    /// Replaces the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn save(&mut self, session: &StoredSession) -> Result<()>;

    /// Removes any stored session. Clearing an empty store succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal fails.
    fn clear(&mut self) -> Result<()>;
}
