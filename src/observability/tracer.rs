//! Tracer provider backed by a file exporter.
//!
//! Spans are exported synchronously as they end, one OTLP JSON line per batch.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::future::{self, BoxFuture};
use opentelemetry::trace::TraceError;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;

use super::file_writer::{RotatingFile, RotationPolicy};
use super::span_formatter::SpanFormatter;

/// Writes finished spans to a rotating OTLP JSON file.
#[derive(Debug)]
struct FileSpanExporter {
    file: RotatingFile,
    formatter: SpanFormatter,
    shut_down: AtomicBool,
}

impl SpanExporter for FileSpanExporter {
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        if self.shut_down.load(Ordering::SeqCst) {
            return Box::pin(future::ready(Err(TraceError::from("exporter is shut down"))));
        }

        let result = self
            .formatter
            .format_batch(&batch)
            .map_err(|e| TraceError::from(e.to_string()))
            .and_then(|line| {
                self.file
                    .write_line(&line)
                    .map_err(|e| TraceError::from(e.to_string()))
            });
        Box::pin(future::ready(result))
    }

    fn shutdown(&mut self) {
        self.shut_down.store(true, Ordering::SeqCst);
    }
}

/// Builds a provider whose spans end up in `file_path`.
pub fn file_tracer_provider(
    file_path: PathBuf,
    policy: RotationPolicy,
    resource: Resource,
    scope: &str,
) -> TracerProvider {
    let exporter = FileSpanExporter {
        file: RotatingFile::new(file_path, policy),
        formatter: SpanFormatter::new(&resource, scope),
        shut_down: AtomicBool::new(false),
    };

    TracerProvider::builder()
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .with_simple_exporter(exporter)
        .build()
}
