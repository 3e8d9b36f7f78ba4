//! OpenTelemetry tracing with file-based OTLP export.
//!
//! ```text
//! tracing macros → tracing-opentelemetry → SDK tracer → FileSpanExporter → JSON lines
//! ```
//!
//! Spans land in `<data dir>/campus-portal-otlp.json`, one OTLP JSON document
//! per line. The file rotates at 10 MB and three rotated copies are kept.
//!
//! Reducer events run inside a `handle_event` span and every remote call gets
//! a `remote_call` span parented to the event that issued it, so a search
//! keystroke and the request it eventually caused share one trace.
//!
//! # Configuration
//!
//! Filter directive, highest priority first:
//! 1. `RUST_LOG`
//! 2. `trace_level` in [`Config`](crate::Config)
//! 3. `"info"`

mod file_writer;
mod init;
mod span_formatter;
mod tracer;

pub use init::{init_tracing, SERVICE_NAME};
