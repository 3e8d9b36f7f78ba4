//! OTLP JSON encoding of finished spans.
//!
//! Each exported batch becomes one `resourceSpans` document, written as a
//! single line so the file can be replayed into any OTLP/JSON collector.

use std::time::{Duration, SystemTime};

use opentelemetry::trace::{Event, Link, SpanId, SpanKind, Status};
use opentelemetry::{KeyValue, Value};
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::resource::Resource;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OtlpDocument {
    resource_spans: Vec<ResourceSpans>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResourceSpans {
    resource: OtlpResource,
    scope_spans: Vec<ScopeSpans>,
}

#[derive(Debug, Serialize)]
struct OtlpResource {
    attributes: Vec<Attribute>,
}

#[derive(Debug, Serialize)]
struct ScopeSpans {
    scope: Scope,
    spans: Vec<OtlpSpan>,
}

#[derive(Debug, Serialize)]
struct Scope {
    name: String,
    version: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OtlpSpan {
    trace_id: String,
    span_id: String,
    parent_span_id: String,
    name: String,
    kind: u8,
    start_time_unix_nano: String,
    end_time_unix_nano: String,
    attributes: Vec<Attribute>,
    events: Vec<OtlpEvent>,
    links: Vec<OtlpLink>,
    status: OtlpStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OtlpEvent {
    time_unix_nano: String,
    name: String,
    attributes: Vec<Attribute>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OtlpLink {
    trace_id: String,
    span_id: String,
    attributes: Vec<Attribute>,
}

#[derive(Debug, Serialize)]
struct OtlpStatus {
    code: u8,
    message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Attribute {
    key: String,
    value: AnyValue,
}

/// OTLP `AnyValue`; integers are strings per the JSON mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
enum AnyValue {
    BoolValue(bool),
    IntValue(String),
    DoubleValue(f64),
    StringValue(String),
}

/// Encodes span batches for one service.
pub struct SpanFormatter {
    resource: Vec<Attribute>,
    scope: String,
}

impl SpanFormatter {
    pub fn new(resource: &Resource, scope: impl Into<String>) -> Self {
        Self {
            resource: resource
                .iter()
                .map(|(key, value)| Attribute {
                    key: key.to_string(),
                    value: any_value(value),
                })
                .collect(),
            scope: scope.into(),
        }
    }

    /// Encodes `batch` as one OTLP JSON line.
    ///
    /// # Errors
    ///
    /// Returns an error only if serialization fails.
    pub fn format_batch(&self, batch: &[SpanData]) -> serde_json::Result<String> {
        let document = OtlpDocument {
            resource_spans: vec![ResourceSpans {
                resource: OtlpResource {
                    attributes: self.resource.clone(),
                },
                scope_spans: vec![ScopeSpans {
                    scope: Scope {
                        name: self.scope.clone(),
                        version: env!("CARGO_PKG_VERSION").to_string(),
                    },
                    spans: batch.iter().map(encode_span).collect(),
                }],
            }],
        };
        serde_json::to_string(&document)
    }
}

fn encode_span(span: &SpanData) -> OtlpSpan {
    let (code, message) = status(&span.status);
    OtlpSpan {
        trace_id: format!("{:032x}", span.span_context.trace_id()),
        span_id: format!("{:016x}", span.span_context.span_id()),
        parent_span_id: if span.parent_span_id == SpanId::INVALID {
            String::new()
        } else {
            format!("{:016x}", span.parent_span_id)
        },
        name: span.name.to_string(),
        kind: kind_code(&span.span_kind),
        start_time_unix_nano: unix_nanos(span.start_time),
        end_time_unix_nano: unix_nanos(span.end_time),
        attributes: attributes(&span.attributes),
        events: span.events.iter().map(encode_event).collect(),
        links: span.links.iter().map(encode_link).collect(),
        status: OtlpStatus { code, message },
    }
}

fn encode_event(event: &Event) -> OtlpEvent {
    OtlpEvent {
        time_unix_nano: unix_nanos(event.timestamp),
        name: event.name.to_string(),
        attributes: attributes(&event.attributes),
    }
}

fn encode_link(link: &Link) -> OtlpLink {
    OtlpLink {
        trace_id: format!("{:032x}", link.span_context.trace_id()),
        span_id: format!("{:016x}", link.span_context.span_id()),
        attributes: attributes(&link.attributes),
    }
}

fn attributes(values: &[KeyValue]) -> Vec<Attribute> {
    values
        .iter()
        .map(|kv| Attribute {
            key: kv.key.to_string(),
            value: any_value(&kv.value),
        })
        .collect()
}

fn any_value(value: &Value) -> AnyValue {
    match value {
        Value::Bool(b) => AnyValue::BoolValue(*b),
        Value::I64(i) => AnyValue::IntValue(i.to_string()),
        Value::F64(f) => AnyValue::DoubleValue(*f),
        Value::String(s) => AnyValue::StringValue(s.to_string()),
        Value::Array(_) => AnyValue::StringValue(value.to_string()),
    }
}

fn unix_nanos(time: SystemTime) -> String {
    time.duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_nanos()
        .to_string()
}

const fn kind_code(kind: &SpanKind) -> u8 {
    match kind {
        SpanKind::Internal => 1,
        SpanKind::Server => 2,
        SpanKind::Client => 3,
        SpanKind::Producer => 4,
        SpanKind::Consumer => 5,
    }
}

fn status(status: &Status) -> (u8, String) {
    match status {
        Status::Unset => (0, String::new()),
        Status::Ok => (1, String::new()),
        Status::Error { description } => (2, description.to_string()),
    }
}

impl std::fmt::Debug for SpanFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpanFormatter")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_encoded_as_strings() {
        let json = serde_json::to_value(any_value(&Value::I64(42))).unwrap();
        assert_eq!(json, serde_json::json!({ "intValue": "42" }));
    }

    #[test]
    fn strings_and_bools_keep_their_type() {
        assert_eq!(
            serde_json::to_value(any_value(&Value::from("courses"))).unwrap(),
            serde_json::json!({ "stringValue": "courses" })
        );
        assert_eq!(
            serde_json::to_value(any_value(&Value::Bool(true))).unwrap(),
            serde_json::json!({ "boolValue": true })
        );
    }

    #[test]
    fn error_status_carries_description() {
        assert_eq!(status(&Status::error("boom")), (2, "boom".to_string()));
        assert_eq!(status(&Status::Unset), (0, String::new()));
    }

    #[test]
    fn empty_batch_still_names_service() {
        let resource = Resource::new(vec![KeyValue::new("service.name", "campus-portal")]);
        let line = SpanFormatter::new(&resource, "campus-portal")
            .format_batch(&[])
            .unwrap();

        let json: serde_json::Value = serde_json::from_str(&line).unwrap();
        let resource_spans = &json["resourceSpans"][0];
        assert!(resource_spans["resource"]["attributes"]
            .as_array()
            .unwrap()
            .iter()
            .any(|a| a["key"] == "service.name" && a["value"]["stringValue"] == "campus-portal"));
        assert_eq!(resource_spans["scopeSpans"][0]["scope"]["name"], "campus-portal");
        assert!(!line.contains('\n'));
    }

    #[test]
    fn timestamps_before_epoch_are_zero() {
        let before = SystemTime::UNIX_EPOCH - Duration::from_secs(1);
        assert_eq!(unix_nanos(before), "0");
    }
}
