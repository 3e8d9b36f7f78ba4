//! JSON file-based credential store.
//!
//! Keeps the token and last-known user in a small human-readable JSON file. It
//! uses atomic file writes (write-to-temp + rename) so a crash mid-write never
//! leaves a half-written token behind.

use crate::domain::error::{PortalError, Result};
use crate::storage::backend::CredentialStore;
use crate::storage::models::StoredSession;
use std::path::{Path, PathBuf};

/// JSON file credential store.
///
/// The file content is cached in memory on creation and rewritten on every
/// change.
///
/// # File Format
///
/// ```json
/// {
///   "version": 1,
///   "token": "eyJhbGciOi...",
///   "user": {
///     "id": "64f0c2",
///     "first_name": "Ada",
///     "last_name": "Lovelace",
///     "email": "ada@example.edu",
///     "erp": 18151,
///     "roles": ["User"],
///     "profile_picture": null
///   }
/// }
/// ```
pub struct JsonCredentialStore {
    /// Path to the JSON file on disk.
    file_path: PathBuf,

    /// Cached file content, `None` when nothing is stored.
    data: Option<StoredSession>,
}

impl JsonCredentialStore {
    /// Creates or opens a JSON credential store.
    ///
    /// Parent directories are created automatically. A file that exists but does
    /// not parse is treated as empty; the next save overwrites it.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the file
    /// exists but cannot be read.
    pub fn new(file_path: PathBuf) -> Result<Self> {
        tracing::debug!(path = ?file_path, "initializing JSON credential store");

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let data = if file_path.exists() {
            Self::load_from_file(&file_path)?
        } else {
            None
        };

        tracing::debug!(has_session = data.is_some(), "credential store initialized");

        Ok(Self { file_path, data })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn load_from_file(path: &Path) -> Result<Option<StoredSession>> {
        let contents = std::fs::read_to_string(path)?;
        match serde_json::from_str::<StoredSession>(&contents) {
            Ok(data) => {
                tracing::debug!(version = data.version, "loaded stored session");
                Ok(Some(data))
            }
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    fn write_atomically(&self, session: &StoredSession) -> Result<()> {
        let json = serde_json::to_string_pretty(session)
            .map_err(|e| PortalError::Storage(format!("failed to serialize session: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");
        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.file_path)?;
        Ok(())
    }
}

impl CredentialStore for JsonCredentialStore {
    fn load(&self) -> Result<Option<StoredSession>> {
        Ok(self.data.clone())
    }

    fn save(&mut self, session: &StoredSession) -> Result<()> {
        let _span = tracing::debug_span!("json_save_session", path = ?self.file_path).entered();

        self.write_atomically(session)?;
        self.data = Some(session.clone());

        tracing::debug!("session saved");
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        let _span = tracing::debug_span!("json_clear_session", path = ?self.file_path).entered();

        match std::fs::remove_file(&self.file_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.data = None;

        tracing::debug!("session cleared");
        Ok(())
    }
}
