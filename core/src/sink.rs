//! Caller-supplied logging sink.
//!
//! The executor reports each outgoing request and each parsed response to an
//! optional `LogSink` at debug level. This is separate from the crate's own
//! `tracing` diagnostics: a sink is a collaborator the caller owns, and when
//! none is configured nothing is written to it.

/// Receives debug-level messages about requests and responses.
pub trait LogSink: Send + Sync {
    fn debug(&self, message: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn debug(&self, message: &str) {
        self(message)
    }
}

/// Forwards sink messages to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "api_executor", "{message}");
    }
}

/// Optional sink for one attempt; messages are only formatted when a sink
/// is present.
#[derive(Clone, Copy)]
pub(crate) struct RequestLog<'a> {
    sink: Option<&'a dyn LogSink>,
}

impl<'a> RequestLog<'a> {
    pub(crate) fn new(sink: Option<&'a dyn LogSink>) -> Self {
        Self { sink }
    }

    pub(crate) fn debug(&self, message: impl FnOnce() -> String) {
        if let Some(sink) = self.sink {
            sink.debug(&message());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn closures_are_sinks() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let captured = lines.clone();
        let sink = move |m: &str| captured.lock().unwrap().push(m.to_string());

        RequestLog::new(Some(&sink)).debug(|| "hello".to_string());
        assert_eq!(*lines.lock().unwrap(), vec!["hello".to_string()]);
    }

    #[test]
    fn tracing_sink_accepts_messages_without_a_subscriber() {
        RequestLog::new(Some(&TracingSink)).debug(|| "API request | method = GET".to_string());
    }

    #[test]
    fn absent_sink_never_formats() {
        RequestLog::new(None).debug(|| panic!("formatted without a sink"));
    }
}
