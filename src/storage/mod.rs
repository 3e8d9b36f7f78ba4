//! Storage layer for the durable session copy.
//!
//! The token and last-known user are kept across restarts so the session can be
//! seeded at start-up, the way a browser client seeds from local storage.
//!
//! # Modules
//!
//! - `backend`: [`CredentialStore`] trait
//! - `json`: JSON file implementation with atomic writes
//! - `memory`: in-process implementation
//! - `models`: on-disk record types

pub mod backend;
pub mod json;
pub mod memory;
pub mod models;

pub use backend::CredentialStore;
pub use json::JsonCredentialStore;
pub use memory::MemoryCredentialStore;
pub use models::{StoredSession, STORED_SESSION_VERSION};
