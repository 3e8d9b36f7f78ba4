//! Remote collection fetcher.
//!
//! Requests leave the reducer as [`RemoteCall`]s, run on spawned tasks against
//! a [`Backend`], and come back as [`RemoteReply`]s tagged with the ticket they
//! were issued under.
//!
//! # Architecture
//!
//! - `backend`: the [`Backend`] port, one method per REST endpoint
//! - `http`: reqwest adapter
//! - `dto`: wire shapes and their normalization into domain types
//! - `messages`: call/reply protocol with trace context propagation
//! - `handler`: executes one call and packages the reply

pub mod backend;
pub mod dto;
pub mod handler;
pub mod http;
pub mod messages;

pub use backend::Backend;
pub use handler::execute;
pub use http::HttpBackend;
pub use messages::{
    Failure, FailureKind, RemoteCall, RemoteData, RemoteReply, RemoteRequest, TraceContext,
};
