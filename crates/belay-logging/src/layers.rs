//! Custom tracing layers
//!
//! [`CallerContextLayer`] tags spans with the active caller, and
//! [`jsonl_layer`] builds the JSON formatter used for both console and
//! file output.

use tracing::{Subscriber, span};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{
    layer::{Context, Layer},
    registry::LookupSpan,
};

use crate::config::JsonlConfig;
use crate::context::{CallerContextData, CallerContextGuard};

/// Layer that attaches the active caller context to new spans
#[derive(Debug, Default)]
pub struct CallerContextLayer;

impl CallerContextLayer {
    pub fn new() -> Self {
        Self
    }
}

/// Extension data stored on spans
#[derive(Debug, Clone)]
pub struct CallerContextExtension {
    pub data: CallerContextData,
}

impl<S> Layer<S> for CallerContextLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(&self, _attrs: &span::Attributes<'_>, id: &span::Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(id)
            && let Some(caller_ctx) = CallerContextGuard::current()
        {
            span.extensions_mut()
                .insert(CallerContextExtension { data: caller_ctx });
        }
    }
}

/// JSONL formatting layer writing to `writer`
pub fn jsonl_layer<S, W>(config: &JsonlConfig, writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(config.include_current_span)
        .with_span_list(config.include_spans)
        .flatten_event(config.flatten_events)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_thread_ids(config.include_thread_info)
        .with_thread_names(config.include_thread_info)
        .with_writer(writer)
        .boxed()
}

/// Human readable console layer
pub fn pretty_layer<S>(ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    tracing_subscriber::fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .boxed()
}
