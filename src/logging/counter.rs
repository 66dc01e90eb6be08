use std::sync::Arc;

use crate::errors::{BoxError, StreamError};
use crate::inspect::Inspect;
use crate::operator::{Emitter, Handler, Operator};
use crate::sink::{default_sink, Level, LogRecord, LogSink};

use super::format::format_value;
use super::Formatter;

/// Logs every notification with a running value count.
///
/// Values are logged as `[prefix] [count] Value: <formatted>` at the configured
/// level, errors as `[prefix] Error: <kind>: <message>` at `Error`, and
/// completion as `[prefix] Completed after <count> values` at `Info`. Every
/// notification is forwarded unchanged.
///
/// A custom formatter that fails is reported at debug level; the value is still
/// counted and forwarded.
///
/// ```
/// use rxr_opkit::logging::log;
/// use rxr_opkit::sink::MemorySink;
/// use rxr_opkit::subscribe::Subscriber;
/// use rxr_opkit::{Observable, ObservableExt, Subscribeable};
///
/// let sink = MemorySink::new();
/// Observable::from_iter(vec!["a", "b"])
///     .pipe(log("letters").with_sink(sink.clone()))
///     .subscribe(Subscriber::on_next(|_| {}));
///
/// assert_eq!(
///     sink.messages(),
///     vec![
///         "[letters] [1] Value: a",
///         "[letters] [2] Value: b",
///         "[letters] Completed after 2 values",
///     ]
/// );
/// ```
pub struct CounterLogger<T> {
    prefix: String,
    log_values: bool,
    log_errors: bool,
    log_completion: bool,
    level: Level,
    formatter: Option<Formatter<T>>,
    sink: Arc<dyn LogSink>,
}

impl<T> CounterLogger<T> {
    pub fn new(prefix: impl Into<String>) -> Self {
        CounterLogger {
            prefix: prefix.into(),
            log_values: true,
            log_errors: true,
            log_completion: true,
            level: Level::Info,
            formatter: None,
            sink: default_sink(),
        }
    }

    #[must_use]
    pub fn log_values(mut self, enabled: bool) -> Self {
        self.log_values = enabled;
        self
    }

    #[must_use]
    pub fn log_errors(mut self, enabled: bool) -> Self {
        self.log_errors = enabled;
        self
    }

    #[must_use]
    pub fn log_completion(mut self, enabled: bool) -> Self {
        self.log_completion = enabled;
        self
    }

    /// Level of the value lines. Errors and completion keep their own levels.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Replaces the default formatter.
    #[must_use]
    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(&T) -> Result<String, BoxError> + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }
}

impl<T> Clone for CounterLogger<T> {
    fn clone(&self) -> Self {
        CounterLogger {
            prefix: self.prefix.clone(),
            log_values: self.log_values,
            log_errors: self.log_errors,
            log_completion: self.log_completion,
            level: self.level,
            formatter: self.formatter.clone(),
            sink: Arc::clone(&self.sink),
        }
    }
}

pub struct CounterHandler<T> {
    config: CounterLogger<T>,
    count: u64,
}

impl<T> CounterHandler<T> {
    fn emit(&self, level: Level, message: String) {
        self.config.sink.emit(
            LogRecord::new(level, &*self.config.prefix, message).with_field("count", self.count),
        );
    }
}

impl<T: Inspect + 'static> Handler<T> for CounterHandler<T> {
    type Output = T;

    fn on_next(&mut self, value: T, downstream: &mut Emitter<'_, T>) {
        self.count += 1;
        if self.config.log_values {
            let formatted = format_value(
                self.config.formatter.as_ref(),
                &value,
                self.config.sink.as_ref(),
                &self.config.prefix,
            );
            if let Some(text) = formatted {
                self.emit(
                    self.config.level,
                    format!("[{}] [{}] Value: {}", self.config.prefix, self.count, text),
                );
            }
        }
        downstream.next(value);
    }

    fn on_error(&mut self, error: &StreamError) {
        if self.config.log_errors {
            self.emit(
                Level::Error,
                format!(
                    "[{}] Error: {}: {}",
                    self.config.prefix,
                    error.kind(),
                    error.message()
                ),
            );
        }
    }

    fn on_completed(&mut self) {
        if self.config.log_completion {
            self.emit(
                Level::Info,
                format!(
                    "[{}] Completed after {} values",
                    self.config.prefix, self.count
                ),
            );
        }
    }
}

impl<T: Inspect + 'static> Operator<T> for CounterLogger<T> {
    type Output = T;
    type Handler = CounterHandler<T>;

    fn handler(&self) -> Self::Handler {
        CounterHandler {
            config: self.clone(),
            count: 0,
        }
    }
}
