//! Where logging operators send their output.
//!
//! Every operator in [`logging`](crate::logging) builds a [`LogRecord`] per event
//! and hands it to a [`LogSink`]. The sink is chosen per operator with
//! `with_sink`; when none is given, records go to [`TracingSink`], which forwards
//! them to the `tracing` ecosystem. Installing a `tracing` subscriber (format,
//! filtering, destination) is left to the application.
//!
//! [`MemorySink`] keeps records in memory, which is what tests assert against.

use std::{
    fmt,
    panic::{catch_unwind, AssertUnwindSafe},
    str::FromStr,
    sync::Arc,
};

use parking_lot::Mutex;

use crate::errors::ConfigError;

/// Tracing target used by [`TracingSink`].
pub const TARGET: &str = "rxr_opkit";

/// Severity of a log record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Trace,
    Debug,
    #[default]
    Info,
    /// Positive outcome, reported at `INFO` by [`TracingSink`].
    Success,
    Warning,
    Error,
    /// Reported at `ERROR` by [`TracingSink`].
    Critical,
}

impl Level {
    /// Upper-case name, as printed in log lines.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Success => "SUCCESS",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "success" => Ok(Level::Success),
            "warn" | "warning" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            "critical" => Ok(Level::Critical),
            _ => Err(ConfigError::UnknownLevel(s.to_string())),
        }
    }
}

/// A structured field value.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl FieldValue {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            FieldValue::UInt(v) => Some(v),
            FieldValue::Int(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            FieldValue::Float(v) => Some(v),
            FieldValue::Int(v) => Some(v as f64),
            FieldValue::UInt(v) => Some(v as f64),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => f.write_str(s),
            FieldValue::Int(v) => write!(f, "{v}"),
            FieldValue::UInt(v) => write!(f, "{v}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Str(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Str(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(i64::from(v))
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<u32> for FieldValue {
    fn from(v: u32) -> Self {
        FieldValue::UInt(u64::from(v))
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::UInt(v)
    }
}

impl From<usize> for FieldValue {
    fn from(v: usize) -> Self {
        FieldValue::UInt(v as u64)
    }
}

/// One log line produced by an operator.
#[derive(Clone, Debug, PartialEq)]
pub struct LogRecord {
    pub level: Level,
    /// Label of the operator that produced the record.
    pub operator: String,
    pub message: String,
    /// Structured fields, in insertion order.
    pub fields: Vec<(String, FieldValue)>,
}

impl LogRecord {
    pub fn new(level: Level, operator: impl Into<String>, message: impl Into<String>) -> Self {
        LogRecord {
            level,
            operator: operator.into(),
            message: message.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_fields<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (String, FieldValue)>,
    {
        self.fields.extend(fields);
        self
    }

    /// Looks up the last field stored under `key`.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

struct Fields<'a>(&'a [(String, FieldValue)]);

impl fmt::Display for Fields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

/// Destination for operator log records.
pub trait LogSink: Send + Sync {
    fn emit(&self, record: LogRecord);
}

/// Forwards records to `tracing` under the [`TARGET`] target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, record: LogRecord) {
        let fields = Fields(&record.fields);

        macro_rules! event {
            ($lvl:expr) => {
                tracing::event!(
                    target: TARGET,
                    $lvl,
                    operator = %record.operator,
                    severity = record.level.as_str(),
                    fields = %fields,
                    "{}",
                    record.message
                )
            };
        }

        match record.level {
            Level::Trace => event!(tracing::Level::TRACE),
            Level::Debug => event!(tracing::Level::DEBUG),
            Level::Info | Level::Success => event!(tracing::Level::INFO),
            Level::Warning => event!(tracing::Level::WARN),
            Level::Error | Level::Critical => event!(tracing::Level::ERROR),
        }
    }
}

/// The sink used by operators that were not given one.
#[must_use]
pub fn default_sink() -> Arc<dyn LogSink> {
    Arc::new(TracingSink)
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn emit(&self, record: LogRecord) {
        (**self).emit(record);
    }
}

/// Runs a side effect, turning a panic into a debug record on `sink`.
pub(crate) fn contained<R>(
    sink: &dyn LogSink,
    operator: &str,
    what: &str,
    f: impl FnOnce() -> R,
) -> Option<R> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(r) => Some(r),
        Err(_) => {
            sink.emit(
                LogRecord::new(Level::Debug, operator, format!("{what} panicked"))
                    .with_field("side_effect", what),
            );
            None
        }
    }
}

/// Keeps every record in memory. Clones share the same buffer.
#[derive(Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the records captured so far.
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Messages of the captured records, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.records.lock().iter().map(|r| r.message.clone()).collect()
    }

    /// Records at or above `level`.
    #[must_use]
    pub fn at_least(&self, level: Level) -> Vec<LogRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.level >= level)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn emit(&self, record: LogRecord) {
        self.records.lock().push(record);
    }
}

impl fmt::Debug for MemorySink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySink")
            .field("records", &self.len())
            .finish()
    }
}
