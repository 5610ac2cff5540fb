//! Tracing layer feeding the log handler

use crate::context::Context as RequestContext;
use crate::logging::{LogHandler, LogRecord};
use std::fmt;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::Context;
use webmods_domain::value_objects::{Attr, AttrValue};

/// Tracing layer that hands every event to a [`LogHandler`]
///
/// The request context is taken from the running task, so events logged
/// inside [`RequestContext::scope`] carry that request's attributes.
pub struct ContextLayer<W = fn() -> std::io::Stdout> {
    handler: LogHandler<W>,
}

impl<W> ContextLayer<W> {
    /// Wrap a handler
    pub fn new(handler: LogHandler<W>) -> Self {
        Self { handler }
    }

    /// The wrapped handler
    pub fn handler(&self) -> &LogHandler<W> {
        &self.handler
    }
}

impl<S, W> Layer<S> for ContextLayer<W>
where
    S: Subscriber,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = *metadata.level();
        if !self.handler.enabled(level) {
            return;
        }

        let mut record = LogRecord::new(level, String::new()).with_target(metadata.target());
        record.file = metadata.file().map(str::to_string);
        record.line = metadata.line();

        event.record(&mut FieldVisitor {
            message: &mut record.message,
            attrs: &mut record.attrs,
        });

        self.handler.handle(&RequestContext::current(), record);
    }
}

/// Visitor turning event fields into typed attributes
struct FieldVisitor<'a> {
    message: &'a mut String,
    attrs: &'a mut Vec<Attr>,
}

impl FieldVisitor<'_> {
    fn push(&mut self, field: &Field, value: AttrValue) {
        // tracing-log bridge metadata
        if field.name().starts_with("log.") {
            return;
        }
        self.attrs.push(Attr::new(field.name(), value));
    }
}

impl Visit for FieldVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            *self.message = format!("{value:?}");
        } else {
            self.push(field, AttrValue::String(format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = value.to_string();
        } else {
            self.push(field, AttrValue::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, AttrValue::Int(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, AttrValue::Uint(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, AttrValue::Float(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, AttrValue::Bool(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push(field, AttrValue::String(value.to_string()));
    }
}
