use opentelemetry::propagation::TextMapPropagator;
use opentelemetry::trace::{SpanContext, TraceContextExt};
use opentelemetry::Context;
use std::sync::Arc;
use tonic::service::Interceptor;
use tonic::{Request, Status};

use crate::propagation::inject_context;

/// Injects trace context headers into every outbound call
///
/// The context is not looked up ambiently: the caller attaches the
/// [`SpanContext`] of its span to the request extensions, and this
/// interceptor copies it into the metadata. Requests without one are
/// passed through untouched.
#[derive(Clone)]
pub struct TraceContextInterceptor {
    propagator: Arc<dyn TextMapPropagator + Send + Sync>,
}

impl TraceContextInterceptor {
    pub fn new(propagator: Arc<dyn TextMapPropagator + Send + Sync>) -> Self {
        Self { propagator }
    }
}

impl Interceptor for TraceContextInterceptor {
    fn call(&mut self, request: Request<()>) -> Result<Request<()>, Status> {
        let (mut metadata, extensions, ()) = request.into_parts();
        if let Some(span_context) = extensions.get::<SpanContext>() {
            let cx = Context::new().with_remote_span_context(span_context.clone());
            inject_context(self.propagator.as_ref(), &cx, &mut metadata);
        }
        Ok(Request::from_parts(metadata, extensions, ()))
    }
}
