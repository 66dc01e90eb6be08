use std::{sync::Arc, time::Instant};

use crate::clock::{self, round_to, Clock};
use crate::errors::StreamError;
use crate::inspect::Inspect;
use crate::operator::{Emitter, Handler, Operator};
use crate::sink::{default_sink, FieldValue, Level, LogRecord, LogSink};

/// Emits structured records carrying a fixed context.
///
/// Each record has the configured context fields followed by `event`, `count`,
/// `elapsed_sec` and either `value_type` or `error_type`.
///
/// `elapsed_sec` is measured from the moment the logger was created (or given
/// its clock), with millisecond precision. Every subscription shares that start;
/// `count` restarts per subscription.
#[derive(Clone)]
pub struct ContextualLogger {
    name: String,
    context: Vec<(String, FieldValue)>,
    clock: Arc<dyn Clock>,
    started: Instant,
    sink: Arc<dyn LogSink>,
}

impl ContextualLogger {
    pub fn new(name: impl Into<String>) -> Self {
        let clock = clock::system();
        ContextualLogger {
            name: name.into(),
            context: Vec::new(),
            started: clock.now(),
            clock,
            sink: default_sink(),
        }
    }

    /// Adds a context field. A key given twice keeps both entries; the later
    /// one wins on lookup.
    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.context.push((key.into(), value.into()));
        self
    }

    /// Reads time from `clock`, restarting the elapsed time at its current
    /// reading.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.started = clock.now();
        self.clock = Arc::new(clock);
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }
}

pub struct ContextualHandler {
    config: ContextualLogger,
    count: u64,
}

impl ContextualHandler {
    fn record(&self, level: Level, event: &str, message: String) -> LogRecord {
        let elapsed = self
            .config
            .clock
            .now()
            .saturating_duration_since(self.config.started);
        LogRecord::new(level, &*self.config.name, message)
            .with_fields(self.config.context.iter().cloned())
            .with_field("event", event)
            .with_field("count", self.count)
            .with_field("elapsed_sec", round_to(elapsed.as_secs_f64(), 3))
    }
}

impl<T: Inspect + 'static> Handler<T> for ContextualHandler {
    type Output = T;

    fn on_next(&mut self, value: T, downstream: &mut Emitter<'_, T>) {
        self.count += 1;
        let record = self
            .record(Level::Info, "on_next", format!("Value: {}", value.render()))
            .with_field("value_type", value.type_name());
        self.config.sink.emit(record);
        downstream.next(value);
    }

    fn on_error(&mut self, error: &StreamError) {
        let record = self
            .record(Level::Error, "on_error", format!("Error: {error}"))
            .with_field("error_type", error.kind());
        self.config.sink.emit(record);
    }

    fn on_completed(&mut self) {
        let record = self.record(Level::Info, "on_completed", "Completed".to_string());
        self.config.sink.emit(record);
    }
}

impl<T: Inspect + 'static> Operator<T> for ContextualLogger {
    type Output = T;
    type Handler = ContextualHandler;

    fn handler(&self) -> Self::Handler {
        ContextualHandler {
            config: self.clone(),
            count: 0,
        }
    }
}
