#![allow(dead_code)]

use adservice_client::*;
use opentelemetry::trace::Status;
use opentelemetry::Value;
use opentelemetry_sdk::trace::{InMemorySpanExporter, SpanData};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tonic::metadata::MetadataMap;
use tonic::{Request, Response};

type Handler = dyn Fn(&AdRequest) -> Result<Response<AdResponse>, CallError> + Send + Sync;

/// What the fake transport saw for one call
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub metadata: MetadataMap,
    pub request: AdRequest,
}

/// In-process stand-in for the gRPC channel
#[derive(Clone)]
pub struct FakeTransport {
    handler: Arc<Handler>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    shutdowns: Arc<AtomicUsize>,
}

impl FakeTransport {
    pub fn new(
        handler: impl Fn(&AdRequest) -> Result<Response<AdResponse>, CallError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Arc::new(handler),
            calls: Arc::new(Mutex::new(Vec::new())),
            shutdowns: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always answers with ads carrying `texts`, in order
    pub fn returning(texts: &[&str]) -> Self {
        let ads: Vec<Ad> = texts
            .iter()
            .map(|text| Ad {
                redirect_url: "/product/OLJCESPC7Z".to_string(),
                text: text.to_string(),
            })
            .collect();
        Self::new(move |_| Ok(Response::new(AdResponse { ads: ads.clone() })))
    }

    pub fn failing(code: tonic::Code, message: &str) -> Self {
        let message = message.to_string();
        Self::new(move |_| Err(CallError::Status(tonic::Status::new(code, message.clone()))))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

impl Transport for FakeTransport {
    fn get_ads(&self, request: Request<AdRequest>) -> Result<Response<AdResponse>, CallError> {
        let (metadata, _extensions, message) = request.into_parts();
        self.calls.lock().push(RecordedCall {
            metadata,
            request: message.clone(),
        });
        (self.handler)(&message)
    }

    fn shutdown(&self, _grace: Duration) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct Harness {
    pub telemetry: Arc<Telemetry>,
    pub exporter: InMemorySpanExporter,
}

impl Harness {
    pub fn new() -> Self {
        let exporter = InMemorySpanExporter::default();
        let tracer = Tracer::builder("adservice-client-test")
            .with_simple_exporter(exporter.clone())
            .build();
        Self {
            telemetry: Arc::new(Telemetry::with_tracer(tracer)),
            exporter,
        }
    }

    pub fn client(&self, transport: FakeTransport) -> AdServiceClient {
        AdServiceClient::with_transport(transport, &ClientConfig::default(), self.telemetry.clone())
    }

    pub fn finished_spans(&self) -> Vec<SpanData> {
        self.exporter.get_finished_spans().unwrap()
    }
}

pub fn attribute(span: &SpanData, key: &str) -> Option<Value> {
    span.attributes
        .iter()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| kv.value.clone())
}

pub fn is_error(span: &SpanData) -> bool {
    matches!(span.status, Status::Error { .. })
}

pub fn traceparent(call: &RecordedCall) -> Option<String> {
    call.metadata
        .get("traceparent")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
