//! W3C Trace Context propagation for gRPC.
//!
//! Carriers that let an OpenTelemetry propagator write trace context into
//! outgoing gRPC metadata and read it back from incoming metadata.

use opentelemetry::propagation::{Extractor, Injector, TextMapPropagator};
use opentelemetry::Context;
use tonic::metadata::{KeyRef, MetadataKey, MetadataMap, MetadataValue};

const TRACEPARENT_HEADER: &str = "traceparent";

/// Injects the span active in `cx` into outgoing gRPC request metadata.
pub fn inject_context(propagator: &dyn TextMapPropagator, cx: &Context, metadata: &mut MetadataMap) {
    propagator.inject_context(cx, &mut MetadataInjector(metadata));
}

/// Extracts trace context from incoming gRPC request metadata.
///
/// The result is rooted at an empty context, so it carries no active span
/// when the metadata has no valid `traceparent`.
pub fn extract_context(propagator: &dyn TextMapPropagator, metadata: &MetadataMap) -> Context {
    propagator.extract_with_context(&Context::new(), &MetadataExtractor(metadata))
}

/// Injector for writing headers to gRPC MetadataMap.
struct MetadataInjector<'a>(&'a mut MetadataMap);

impl Injector for MetadataInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        // an empty tracestate carries nothing
        if value.is_empty() {
            return;
        }
        if !key.is_ascii() || !value.is_ascii() {
            tracing::debug!("Skipping non-ASCII trace header {:?}", key);
            return;
        }
        let name = match MetadataKey::from_bytes(key.as_bytes()) {
            Ok(name) => name,
            Err(e) => {
                tracing::debug!("Failed to create metadata key for trace injection: {:?}", e);
                return;
            }
        };
        let val = match MetadataValue::try_from(value.as_str()) {
            Ok(val) => val,
            Err(e) => {
                tracing::debug!(
                    "Failed to create metadata value for trace injection: {:?}",
                    e
                );
                return;
            }
        };
        self.0.insert(name, val);
    }
}

/// Extractor for reading headers from gRPC MetadataMap.
struct MetadataExtractor<'a>(&'a MetadataMap);

impl Extractor for MetadataExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        let value = self.0.get(key).and_then(|v| v.to_str().ok())?;
        if key == TRACEPARENT_HEADER && !is_lower_hex_fields(value.trim()) {
            tracing::debug!("Ignoring malformed traceparent {:?}", value);
            return None;
        }
        Some(value)
    }

    fn keys(&self) -> Vec<&str> {
        self.0
            .keys()
            .filter_map(|key| match key {
                KeyRef::Ascii(k) => Some(k.as_str()),
                KeyRef::Binary(_) => None,
            })
            .collect()
    }
}

/// `traceparent` is dash-separated lower-case hex; numeric parsing alone
/// would also admit signs such as `+0`.
fn is_lower_hex_fields(value: &str) -> bool {
    value
        .split('-')
        .all(|field| !field.is_empty() && field.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')))
}
