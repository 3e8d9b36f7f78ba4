//! Infrastructure layer for filesystem and environment interactions.
//!
//! Resolves where the client keeps its durable files (the stored session and
//! the trace export) from the process environment.

pub mod paths;

pub use paths::{expand_tilde, get_data_dir, session_file, trace_file};
