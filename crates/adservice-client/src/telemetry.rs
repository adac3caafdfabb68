//! Process-wide tracing configuration.
//!
//! Built once at startup and shared by reference with every client, so all
//! calls in the process use the same tracer and propagator.

use opentelemetry::propagation::{TextMapCompositePropagator, TextMapPropagator};
use opentelemetry_sdk::propagation::TraceContextPropagator;
use std::sync::Arc;

use crate::config::{ExporterKind, TelemetryConfig};
use crate::tracer::Tracer;

pub type SharedPropagator = Arc<dyn TextMapPropagator + Send + Sync>;

pub struct Telemetry {
    tracer: Tracer,
    propagator: SharedPropagator,
}

impl Telemetry {
    pub fn new(tracer: Tracer, propagator: SharedPropagator) -> Self {
        Self { tracer, propagator }
    }

    /// W3C trace context propagation with the given tracer
    pub fn with_tracer(tracer: Tracer) -> Self {
        Self::new(tracer, default_propagator())
    }

    pub fn from_config(config: &TelemetryConfig) -> Self {
        if !config.enabled {
            tracing::info!("Tracing disabled.");
            return Self::with_tracer(Tracer::disabled(config.service_name.clone()));
        }

        let builder = Tracer::builder(config.service_name.clone());
        let tracer = match config.exporter {
            ExporterKind::Stdout => {
                builder.with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            }
            ExporterKind::None => builder,
        }
        .build();

        tracing::info!(
            service.name = %config.service_name,
            exporter = %config.exporter,
            "Tracing enabled."
        );

        Self::with_tracer(tracer)
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    pub fn propagator(&self) -> SharedPropagator {
        self.propagator.clone()
    }
}

impl std::fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Telemetry")
            .field("tracer", &self.tracer)
            .field("fields", &self.propagator.fields().collect::<Vec<_>>())
            .finish()
    }
}

fn default_propagator() -> SharedPropagator {
    Arc::new(TextMapCompositePropagator::new(vec![Box::new(
        TraceContextPropagator::new(),
    )]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_config_yields_disabled_tracer() {
        let telemetry = Telemetry::from_config(&TelemetryConfig {
            enabled: false,
            ..TelemetryConfig::default()
        });
        assert!(!telemetry.tracer().is_enabled());
        assert_eq!(telemetry.tracer().service_name(), "adservice-client");
    }

    #[test]
    fn default_propagator_writes_w3c_fields() {
        let telemetry = Telemetry::from_config(&TelemetryConfig {
            exporter: ExporterKind::None,
            ..TelemetryConfig::default()
        });
        assert!(telemetry.tracer().is_enabled());
        let propagator = telemetry.propagator();
        let mut fields: Vec<&str> = propagator.fields().collect();
        fields.sort_unstable();
        assert_eq!(fields, ["traceparent", "tracestate"]);
    }
}
