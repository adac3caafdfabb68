use opentelemetry::trace::{SpanContext, SpanKind, Status, TraceContextExt, Tracer as _};
use opentelemetry::{Context, Key, KeyValue, Value};
use std::borrow::Cow;

use crate::tracer::Tracer;

/// Builder for a span that has not started yet
pub struct SpanBuilder {
    tracer: Tracer,
    name: String,
    kind: SpanKind,
    parent: Option<Context>,
    attributes: Vec<KeyValue>,
}

impl SpanBuilder {
    pub(crate) fn new(name: String, tracer: Tracer) -> Self {
        Self {
            tracer,
            name,
            kind: SpanKind::Internal,
            parent: None,
            attributes: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: SpanKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_attribute(mut self, key: impl Into<Key>, value: impl Into<Value>) -> Self {
        self.attributes.push(KeyValue::new(key, value));
        self
    }

    /// Make the span a child of the span active in `parent`
    pub fn with_parent(mut self, parent: &Context) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Start the span. Without a parent it opens a new trace; the ambient
    /// context of the calling thread is never consulted.
    pub fn start(self) -> ActiveSpan {
        let Some(sdk) = self.tracer.sdk() else {
            return ActiveSpan { cx: None };
        };

        let parent = self.parent.unwrap_or_else(Context::new);
        let span = sdk
            .span_builder(self.name)
            .with_kind(self.kind)
            .with_attributes(self.attributes)
            .start_with_context(sdk, &parent);

        ActiveSpan {
            cx: Some(parent.with_span(span)),
        }
    }
}

/// A started span. Ends exactly once: on [`ActiveSpan::end`], or on drop
/// if it was never ended explicitly (including while unwinding).
pub struct ActiveSpan {
    cx: Option<Context>,
}

impl ActiveSpan {
    /// Propagation context of this span; `None` for non-recording spans
    pub fn span_context(&self) -> Option<SpanContext> {
        self.cx.as_ref().map(|cx| cx.span().span_context().clone())
    }

    pub fn is_recording(&self) -> bool {
        self.cx.as_ref().is_some_and(|cx| cx.span().is_recording())
    }

    pub fn add_event(&mut self, name: impl Into<Cow<'static, str>>) {
        if let Some(cx) = &self.cx {
            cx.span().add_event(name, Vec::new());
        }
    }

    pub fn set_status(&mut self, status: Status) {
        if let Some(cx) = &self.cx {
            cx.span().set_status(status);
        }
    }

    pub fn end(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if let Some(cx) = self.cx.take() {
            cx.span().end();
        }
    }
}

impl Drop for ActiveSpan {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::{SpanId, TraceFlags, TraceId, TraceState};
    use opentelemetry_sdk::trace::{InMemorySpanExporter, SpanData};

    fn tracer_with_exporter() -> (Tracer, InMemorySpanExporter) {
        let exporter = InMemorySpanExporter::default();
        let tracer = Tracer::builder("test")
            .with_simple_exporter(exporter.clone())
            .build();
        (tracer, exporter)
    }

    fn finished(exporter: &InMemorySpanExporter) -> Vec<SpanData> {
        exporter.get_finished_spans().unwrap()
    }

    #[test]
    fn drop_ends_span_once() {
        let (tracer, exporter) = tracer_with_exporter();
        {
            let mut span = tracer.span("dropped").start();
            span.add_event("something");
        }
        let spans = finished(&exporter);
        assert_eq!(spans.len(), 1);
        assert!(spans[0].end_time >= spans[0].start_time);
        assert_eq!(spans[0].events.events[0].name, "something");
    }

    #[test]
    fn explicit_end_does_not_export_twice() {
        let (tracer, exporter) = tracer_with_exporter();
        tracer.span("ended").start().end();
        assert_eq!(finished(&exporter).len(), 1);
    }

    #[test]
    fn root_spans_get_fresh_ids() {
        let (tracer, _exporter) = tracer_with_exporter();
        let a = tracer.span("a").start().span_context().unwrap();
        let b = tracer.span("b").start().span_context().unwrap();

        assert!(a.is_valid());
        assert!(b.is_valid());
        assert!(a.is_sampled());
        assert_ne!(a.trace_id(), b.trace_id());
        assert_ne!(a.span_id(), b.span_id());
    }

    #[test]
    fn child_span_links_to_parent() {
        let (tracer, exporter) = tracer_with_exporter();
        let parent_sc = SpanContext::new(
            TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap(),
            SpanId::from_hex("00f067aa0ba902b7").unwrap(),
            TraceFlags::SAMPLED,
            true,
            TraceState::default(),
        );
        let parent = Context::new().with_remote_span_context(parent_sc.clone());

        let span = tracer.span("child").with_parent(&parent).start();
        let child_sc = span.span_context().unwrap();
        span.end();

        assert_eq!(child_sc.trace_id(), parent_sc.trace_id());
        let finished = &finished(&exporter)[0];
        assert_eq!(finished.parent_span_id, parent_sc.span_id());
        assert_eq!(finished.span_context.span_id(), child_sc.span_id());
    }

    #[test]
    fn disabled_tracer_records_nothing() {
        let tracer = Tracer::disabled("test");
        let mut span = tracer.span("noop").with_attribute("k", 1i64).start();
        span.add_event("ignored");
        assert!(span.span_context().is_none());
        assert!(!span.is_recording());
        span.end();
    }

    #[test]
    fn attributes_are_recorded() {
        let (tracer, exporter) = tracer_with_exporter();
        tracer
            .span("attrs")
            .with_kind(SpanKind::Client)
            .with_attribute("port", 9555i64)
            .with_attribute("host", "localhost")
            .start()
            .end();
        let span = &finished(&exporter)[0];
        assert_eq!(span.span_kind, SpanKind::Client);
        assert!(span.attributes.contains(&KeyValue::new("port", 9555i64)));
        assert!(span.attributes.contains(&KeyValue::new("host", "localhost")));
    }
}
