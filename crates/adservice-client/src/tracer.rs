use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider, TracerProviderBuilder, SpanExporter};
use opentelemetry_sdk::Resource;
use std::sync::Arc;

use crate::span_builder::SpanBuilder;

/// Instrumentation scope recorded on every span
const INSTRUMENTATION_SCOPE: &str = env!("CARGO_PKG_NAME");

/// Main entry point for recording spans
///
/// Cheap to clone; all clones share the same provider.
#[derive(Clone)]
pub struct Tracer {
    inner: Arc<TracerInner>,
}

struct TracerInner {
    service_name: String,
    /// `None` when tracing is disabled
    sdk: Option<SdkTracer>,
}

impl Tracer {
    pub fn builder(service_name: impl Into<String>) -> TracerBuilder {
        TracerBuilder {
            service_name: service_name.into(),
            provider: SdkTracerProvider::builder(),
        }
    }

    /// A tracer that records nothing. Spans it creates carry no trace
    /// context, so nothing is propagated either.
    pub fn disabled(service_name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(TracerInner {
                service_name: service_name.into(),
                sdk: None,
            }),
        }
    }

    /// Start building a new span
    pub fn span(&self, name: impl Into<String>) -> SpanBuilder {
        SpanBuilder::new(name.into(), self.clone())
    }

    pub fn service_name(&self) -> &str {
        &self.inner.service_name
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.sdk.is_some()
    }

    pub(crate) fn sdk(&self) -> Option<&SdkTracer> {
        self.inner.sdk.as_ref()
    }
}

impl std::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer")
            .field("service_name", &self.inner.service_name)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

pub struct TracerBuilder {
    service_name: String,
    provider: TracerProviderBuilder,
}

impl TracerBuilder {
    /// Export every ended span synchronously through `exporter`
    pub fn with_simple_exporter(mut self, exporter: impl SpanExporter + 'static) -> Self {
        self.provider = self.provider.with_simple_exporter(exporter);
        self
    }

    pub fn build(self) -> Tracer {
        let provider = self
            .provider
            .with_resource(
                Resource::builder()
                    .with_service_name(self.service_name.clone())
                    .build(),
            )
            .build();

        Tracer {
            inner: Arc::new(TracerInner {
                sdk: Some(provider.tracer(INSTRUMENTATION_SCOPE)),
                service_name: self.service_name,
            }),
        }
    }
}
