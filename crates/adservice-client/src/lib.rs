//! Traced blocking client for the Ad Service.
//!
//! # Example
//!
//! ```no_run
//! use adservice_client::{AdServiceClient, Telemetry, TelemetryConfig};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let telemetry = Arc::new(Telemetry::from_config(&TelemetryConfig::from_env()));
//!     let client = AdServiceClient::new("localhost", 9555, telemetry)?;
//!
//!     for ad in client.get_ads("camera")? {
//!         println!("{}", ad.text);
//!     }
//!
//!     client.shutdown();
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod executor;
mod gate;
mod interceptor;
mod propagation;
mod span_builder;
mod telemetry;
mod tracer;
mod transport;

pub use adservice_protocol::*;
pub use client::AdServiceClient;
pub use config::*;
pub use error::{describe_status, status_code_name, CallError, ClientError};
pub use executor::{
    CallOutcome, TracedCallExecutor, CALL_SPAN_NAME, ISSUING_REQUEST_EVENT, RECEIVED_RESPONSE_EVENT,
};
pub use interceptor::TraceContextInterceptor;
pub use propagation::{extract_context, inject_context};
pub use span_builder::{ActiveSpan, SpanBuilder};
pub use telemetry::{SharedPropagator, Telemetry};
pub use tracer::{Tracer, TracerBuilder};
pub use transport::{GrpcTransport, Intercepted, Transport};
