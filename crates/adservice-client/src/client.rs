use adservice_protocol::*;
use opentelemetry::Context;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::ClientConfig;
use crate::error::{describe_status, CallError, ClientError};
use crate::executor::{CallOutcome, TracedCallExecutor};
use crate::gate::CallGate;
use crate::interceptor::TraceContextInterceptor;
use crate::telemetry::Telemetry;
use crate::transport::{shutdown_status, GrpcTransport, Intercepted, Transport};

/// Blocking client for the Ad Service
///
/// Owns one channel for its whole lifetime. Every call goes through the
/// trace-context interceptor and is recorded as a client span.
///
/// `get_ads` is best effort: RPC failures are logged and yield no ads
/// instead of an error, so a failed lookup never aborts the caller.
pub struct AdServiceClient {
    executor: TracedCallExecutor,
    transport: Box<dyn Transport>,
    gate: CallGate,
    shutdown_grace: Duration,
}

impl AdServiceClient {
    /// Construct client connecting to Ad Service at `host:port`.
    ///
    /// Does not wait for the server; only a malformed address fails here.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        telemetry: Arc<Telemetry>,
    ) -> Result<Self, ClientError> {
        Self::from_config(&ClientConfig::new(host, port), telemetry)
    }

    pub fn from_config(config: &ClientConfig, telemetry: Arc<Telemetry>) -> Result<Self, ClientError> {
        let transport = GrpcTransport::connect_lazy(config)?;
        Ok(Self::with_transport(transport, config, telemetry))
    }

    /// Build a client over an arbitrary transport. `config` supplies the
    /// peer attributes recorded on spans and the shutdown grace period.
    pub fn with_transport<T>(transport: T, config: &ClientConfig, telemetry: Arc<Telemetry>) -> Self
    where
        T: Transport + 'static,
    {
        let interceptor = TraceContextInterceptor::new(telemetry.propagator());
        Self {
            executor: TracedCallExecutor::new(
                telemetry.tracer().clone(),
                config.host.clone(),
                config.port,
            ),
            transport: Box::new(Intercepted::new(transport, interceptor)),
            gate: CallGate::default(),
            shutdown_grace: config.shutdown_grace,
        }
    }

    /// Get ads for `context_key`, in a new trace.
    pub fn get_ads(&self, context_key: &str) -> Result<Vec<Ad>, ClientError> {
        self.fetch(context_key, None)
    }

    /// Get ads for `context_key`, continuing the trace of the span active
    /// in `parent`.
    pub fn get_ads_with_parent(
        &self,
        context_key: &str,
        parent: &Context,
    ) -> Result<Vec<Ad>, ClientError> {
        self.fetch(context_key, Some(parent))
    }

    fn fetch(&self, context_key: &str, parent: Option<&Context>) -> Result<Vec<Ad>, ClientError> {
        tracing::info!("Get Ads with context {} ...", context_key);
        let request = AdRequest::for_context_key(context_key);

        let outcome = self.executor.execute(request, parent, |request| {
            let Some(_permit) = self.gate.enter() else {
                return Err(CallError::Status(shutdown_status()));
            };
            self.transport.get_ads(request)
        })?;

        match outcome {
            CallOutcome::Succeeded(response) => {
                for ad in &response.ads {
                    tracing::info!("Ads: {}", ad.text);
                }
                Ok(response.ads)
            }
            CallOutcome::Failed(status) => {
                tracing::warn!("RPC failed: {}", describe_status(&status));
                Ok(Vec::new())
            }
        }
    }

    /// Shut the channel down, waiting up to the grace period for in-flight
    /// calls. Calls still running after that are abandoned. Only the first
    /// invocation does anything.
    pub fn shutdown(&self) {
        if !self.gate.close() {
            tracing::debug!("Ad service client already shut down");
            return;
        }

        let started = Instant::now();
        if !self.gate.wait_idle(self.shutdown_grace) {
            tracing::warn!(
                in_flight = self.gate.in_flight(),
                "Grace period of {:?} elapsed, abandoning in-flight calls",
                self.shutdown_grace
            );
        }
        self.transport
            .shutdown(self.shutdown_grace.saturating_sub(started.elapsed()));
    }

    pub fn is_shut_down(&self) -> bool {
        self.gate.is_closed()
    }
}

impl Drop for AdServiceClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}
