//! Wraps one outbound call in a client span.
//!
//! Lifecycle of a call: the span is started with the transport attributes,
//! a "Getting Ads" event is recorded and the request is dispatched with the
//! span's context attached. A reply records a second event; an RPC status
//! marks the span as failed. Whatever happens, the span is ended exactly
//! once before control returns (or unwinds) to the caller.

use adservice_protocol::*;
use opentelemetry::trace::{SpanKind, Status as SpanStatus};
use opentelemetry::Context;
use tonic::{Request, Response, Status};

use crate::error::{describe_status, CallError};
use crate::tracer::Tracer;

pub const CALL_SPAN_NAME: &str = "AdsClient";
pub const ISSUING_REQUEST_EVENT: &str = "Getting Ads";
pub const RECEIVED_RESPONSE_EVENT: &str = "Received response from Ads Service.";

/// Expected result of a call. Unexpected failures are returned as `Err`.
#[derive(Debug)]
pub enum CallOutcome {
    Succeeded(AdResponse),
    Failed(Status),
}

pub struct TracedCallExecutor {
    tracer: Tracer,
    peer_host: String,
    peer_port: u16,
}

impl TracedCallExecutor {
    pub fn new(tracer: Tracer, peer_host: impl Into<String>, peer_port: u16) -> Self {
        Self {
            tracer,
            peer_host: peer_host.into(),
            peer_port,
        }
    }

    /// Run `dispatch` for `request` inside a new client span.
    ///
    /// RPC status failures are recorded on the span and returned as
    /// [`CallOutcome::Failed`]; anything else ends the span and is
    /// returned as `Err`.
    pub fn execute<F>(
        &self,
        request: AdRequest,
        parent: Option<&Context>,
        dispatch: F,
    ) -> anyhow::Result<CallOutcome>
    where
        F: FnOnce(Request<AdRequest>) -> Result<Response<AdResponse>, CallError>,
    {
        let mut builder = self
            .tracer
            .span(CALL_SPAN_NAME)
            .with_kind(SpanKind::Client)
            .with_attribute("component", "grpc")
            .with_attribute("rpc.service", AD_SERVICE_SHORT_NAME)
            .with_attribute("net.peer.ip", self.peer_host.clone())
            .with_attribute("net.peer.port", i64::from(self.peer_port));
        if let Some(parent) = parent {
            builder = builder.with_parent(parent);
        }
        let mut span = builder.start();

        span.add_event(ISSUING_REQUEST_EVENT);
        let mut request = Request::new(request);
        if let Some(span_context) = span.span_context() {
            request.extensions_mut().insert(span_context);
        }

        let result = match dispatch(request) {
            Ok(response) => {
                span.add_event(RECEIVED_RESPONSE_EVENT);
                Ok(CallOutcome::Succeeded(response.into_inner()))
            }
            Err(CallError::Status(status)) => {
                span.set_status(SpanStatus::error(format!(
                    "gRPC status: {}",
                    describe_status(&status)
                )));
                Ok(CallOutcome::Failed(status))
            }
            Err(CallError::Unexpected(err)) => {
                span.set_status(SpanStatus::error(format!("unexpected failure: {err:#}")));
                Err(err)
            }
        };

        span.end();
        result
    }
}
