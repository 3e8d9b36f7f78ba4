//! Process-local credential store.

use crate::domain::error::Result;
use crate::storage::backend::CredentialStore;
use crate::storage::models::StoredSession;

/// Keeps the session in memory only; nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryCredentialStore {
    data: Option<StoredSession>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `session` already stored.
    #[must_use]
    pub const fn seeded(session: StoredSession) -> Self {
        Self {
            data: Some(session),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<StoredSession>> {
        Ok(self.data.clone())
    }

    fn save(&mut self, session: &StoredSession) -> Result<()> {
        self.data = Some(session.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.data = None;
        Ok(())
    }
}
