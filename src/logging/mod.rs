//! Logging operators.
//!
//! Every operator here is a pure observer: values, errors and completion are
//! forwarded exactly as they arrive, and the logging happens inline before each
//! notification is passed on. A logging failure, such as a formatter returning
//! an error or a predicate panicking, is reported at debug level and never
//! changes what downstream receives.
//!
//! | operator                | factory             | what is logged                              |
//! |-------------------------|---------------------|---------------------------------------------|
//! | [`CounterLogger`]       | [`log`]             | each value with its running count           |
//! | [`MarbleLogger`]        | [`marble_log`]      | an ASCII marble diagram of the stream        |
//! | [`ContextualLogger`]    | [`context_log`]     | structured records with fixed context        |
//! | [`RichLogger`]          | [`rich_log`]        | values formatted by shape, with colors       |
//! | [`PerformanceLogger`]   | [`perf_log`]        | throughput and inter-arrival statistics      |
//! | [`ConditionalLogger`]   | [`conditional_log`] | values and errors matching a predicate       |
//!
//! Records go to the operator's [`LogSink`](crate::sink::LogSink), by default
//! [`TracingSink`](crate::sink::TracingSink).
//!
//! ```
//! use rxr_opkit::logging::{log, marble_log, perf_log};
//! use rxr_opkit::sink::MemorySink;
//! use rxr_opkit::subscribe::Subscriber;
//! use rxr_opkit::{Observable, ObservableExt, Subscribeable};
//!
//! # fn main() -> Result<(), rxr_opkit::ConfigError> {
//! let sink = MemorySink::new();
//!
//! Observable::from_iter(1..=5)
//!     .pipe(log("source").with_sink(sink.clone()))
//!     .map(|v| v * 2)
//!     .pipe(marble_log("doubled", 10)?.with_sink(sink.clone()))
//!     .pipe(perf_log("timing", None)?.with_sink(sink.clone()))
//!     .subscribe(Subscriber::on_next(|_| {}));
//!
//! assert!(sink.messages().contains(&"[source] Completed after 5 values".to_string()));
//! # Ok(())
//! # }
//! ```

mod conditional;
mod contextual;
mod counter;
mod format;
mod helpers;
mod marble;
mod performance;
mod rich;

pub use conditional::*;
pub use contextual::*;
pub use counter::*;
pub use format::{default_format, MAX_TEXT_LEN};
pub use helpers::*;
pub use marble::*;
pub use performance::*;
pub use rich::*;

use std::sync::Arc;

use crate::errors::{BoxError, ConfigError};
use crate::sink::FieldValue;

/// A fallible value formatter.
pub type Formatter<T> = Arc<dyn Fn(&T) -> Result<String, BoxError> + Send + Sync>;

/// Creates a [`CounterLogger`] with default settings.
pub fn log<T>(prefix: impl Into<String>) -> CounterLogger<T> {
    CounterLogger::new(prefix)
}

/// Creates a [`MarbleLogger`] with a timeline of `width` columns.
///
/// # Errors
///
/// Returns [`ConfigError::ZeroWidth`] if `width` is zero.
pub fn marble_log(name: impl Into<String>, width: usize) -> Result<MarbleLogger, ConfigError> {
    MarbleLogger::new(name).with_width(width)
}

/// Creates a [`ContextualLogger`] with the given context fields.
pub fn context_log<I, K, V>(name: impl Into<String>, context: I) -> ContextualLogger
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<FieldValue>,
{
    context
        .into_iter()
        .fold(ContextualLogger::new(name), |logger, (k, v)| {
            logger.with_context(k, v)
        })
}

/// Creates a [`RichLogger`] with colors and type names enabled.
pub fn rich_log(name: impl Into<String>) -> RichLogger {
    RichLogger::new(name)
}

/// Creates a [`PerformanceLogger`], logging progress every `log_interval`
/// values when set.
///
/// # Errors
///
/// Returns [`ConfigError::ZeroInterval`] for `Some(0)`.
pub fn perf_log(
    name: impl Into<String>,
    log_interval: Option<usize>,
) -> Result<PerformanceLogger, ConfigError> {
    let logger = PerformanceLogger::new(name);
    match log_interval {
        Some(every) => logger.with_interval(every),
        None => Ok(logger),
    }
}

/// Creates a [`ConditionalLogger`] that, until given predicates, logs every
/// value and error.
pub fn conditional_log<T>(name: impl Into<String>) -> ConditionalLogger<T> {
    ConditionalLogger::new(name)
}
