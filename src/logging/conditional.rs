use std::sync::Arc;

use crate::errors::StreamError;
use crate::inspect::Inspect;
use crate::operator::{Emitter, Handler, Operator};
use crate::sink::{contained, default_sink, Level, LogRecord, LogSink};

type ValuePredicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
type ErrorPredicate = Arc<dyn Fn(&StreamError) -> bool + Send + Sync>;

/// Logs only the values (and errors) that match a predicate.
///
/// Every value is counted and forwarded; a value is logged when there is no
/// value predicate or the predicate returns `true`. Each value line carries the
/// running `logged/total` ratio. On completion a summary with the final ratio is
/// logged, unless disabled or no value was seen.
///
/// A predicate that panics counts as `false` and is reported at debug level.
pub struct ConditionalLogger<T> {
    name: String,
    value_predicate: Option<ValuePredicate<T>>,
    error_predicate: Option<ErrorPredicate>,
    level: Level,
    summarize: bool,
    sink: Arc<dyn LogSink>,
}

impl<T> ConditionalLogger<T> {
    pub fn new(name: impl Into<String>) -> Self {
        ConditionalLogger {
            name: name.into(),
            value_predicate: None,
            error_predicate: None,
            level: Level::Info,
            summarize: true,
            sink: default_sink(),
        }
    }

    #[must_use]
    pub fn when(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.value_predicate = Some(Arc::new(predicate));
        self
    }

    #[must_use]
    pub fn when_error(
        mut self,
        predicate: impl Fn(&StreamError) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.error_predicate = Some(Arc::new(predicate));
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn summarize(mut self, enabled: bool) -> Self {
        self.summarize = enabled;
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }
}

impl<T> Clone for ConditionalLogger<T> {
    fn clone(&self) -> Self {
        ConditionalLogger {
            name: self.name.clone(),
            value_predicate: self.value_predicate.clone(),
            error_predicate: self.error_predicate.clone(),
            level: self.level,
            summarize: self.summarize,
            sink: Arc::clone(&self.sink),
        }
    }
}

pub struct ConditionalHandler<T> {
    config: ConditionalLogger<T>,
    total: u64,
    logged: u64,
}

impl<T> ConditionalHandler<T> {
    fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.logged as f64 / self.total as f64
        }
    }

    fn emit(&self, level: Level, message: String) {
        self.config.sink.emit(
            LogRecord::new(level, &*self.config.name, message)
                .with_field("mode", "conditional")
                .with_field("logged", self.logged)
                .with_field("total", self.total)
                .with_field("ratio", self.ratio()),
        );
    }

    fn allows<V: ?Sized>(
        &self,
        predicate: Option<&Arc<dyn Fn(&V) -> bool + Send + Sync>>,
        value: &V,
        what: &str,
    ) -> bool {
        let Some(p) = predicate else {
            return true;
        };
        contained(self.config.sink.as_ref(), &self.config.name, what, || p(value)).unwrap_or(false)
    }
}

impl<T: Inspect + 'static> Handler<T> for ConditionalHandler<T> {
    type Output = T;

    fn on_next(&mut self, value: T, downstream: &mut Emitter<'_, T>) {
        self.total += 1;
        if self.allows(self.config.value_predicate.as_ref(), &value, "value predicate") {
            self.logged += 1;
            self.emit(
                self.config.level,
                format!(
                    "Value: {} (logged {}/{}, {:.1}%)",
                    value.render(),
                    self.logged,
                    self.total,
                    self.ratio() * 100.0
                ),
            );
        }
        downstream.next(value);
    }

    fn on_error(&mut self, error: &StreamError) {
        if self.allows(self.config.error_predicate.as_ref(), error, "error predicate") {
            self.emit(
                Level::Error,
                format!("Error: {}: {}", error.kind(), error.message()),
            );
        }
    }

    fn on_completed(&mut self) {
        if self.config.summarize && self.total > 0 {
            self.emit(
                Level::Info,
                format!(
                    "Completed. Logged {}/{} values ({:.1}%)",
                    self.logged,
                    self.total,
                    self.ratio() * 100.0
                ),
            );
        }
    }
}

impl<T: Inspect + 'static> Operator<T> for ConditionalLogger<T> {
    type Output = T;
    type Handler = ConditionalHandler<T>;

    fn handler(&self) -> Self::Handler {
        ConditionalHandler {
            config: self.clone(),
            total: 0,
            logged: 0,
        }
    }
}
