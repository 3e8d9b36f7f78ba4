//! Error types for the campus portal client.
//!
//! This module defines the centralized error type [`PortalError`] and a type alias
//! [`Result`] for convenient error handling throughout the crate. All errors are
//! implemented using the `thiserror` crate for automatic `Error` trait implementation.

use thiserror::Error;

/// The main error type for campus portal operations.
///
/// Every failure is scoped to the single operation that caused it. The reducer
/// converts these into a rejected slot status plus a notification; nothing in
/// this crate treats a `PortalError` as fatal to the process.
///
/// # Examples
///
/// ```
/// use campus_portal::PortalError;
///
/// fn check_title(title: &str) -> Result<(), PortalError> {
///     if title.trim().is_empty() {
///         return Err(PortalError::validation("title", "Title is required"));
///     }
///     Ok(())
/// }
///
/// assert!(check_title("").is_err());
/// ```
#[derive(Debug, Error)]
pub enum PortalError {
    /// A form field failed local validation.
    ///
    /// Recovered locally; the field name lets the front-end attach the message
    /// to the right input.
    #[error("{field}: {message}")]
    Validation {
        /// Name of the offending field.
        field: String,
        /// Human-readable reason.
        message: String,
    },

    /// Login or profile lookup was refused by the backend.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The backend answered 401 to an authenticated call.
    #[error("Session is no longer valid: {0}")]
    Unauthorized(String),

    /// The backend answered 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request never produced a usable HTTP response, or the backend
    /// answered with a non-success status other than 401/404.
    #[error("Network error: {0}")]
    Network(String),

    /// A response body could not be decoded into the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Reading or writing the durable credential store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PortalError {
    /// Builds a [`PortalError::Validation`] for `field`.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether this error means the bearer token was rejected.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Message suitable for an inline error banner or a toast.
    ///
    /// Drops the variant prefix so the user sees only the backend's or the
    /// validator's own wording.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message, .. } => message.clone(),
            Self::Auth(message)
            | Self::Unauthorized(message)
            | Self::NotFound(message)
            | Self::Network(message)
            | Self::Decode(message)
            | Self::Storage(message)
            | Self::Config(message) => message.clone(),
            Self::Io(e) => e.to_string(),
        }
    }
}

/// A specialized `Result` type for campus portal operations.
pub type Result<T> = std::result::Result<T, PortalError>;
