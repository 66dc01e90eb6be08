use std::{
    fmt,
    num::NonZeroUsize,
    sync::Arc,
    time::{Duration, Instant},
};

use crate::clock::{self, round_to, Clock};
use crate::errors::{ConfigError, StreamError};
use crate::operator::{Emitter, Handler, Operator, Stateful, StatefulHandler};
use crate::sink::{default_sink, Level, LogRecord, LogSink};

/// Which point of the stream a [`PerfStats`] snapshot was taken at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PerfStatus {
    Progress,
    Error,
    Completed,
}

impl PerfStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            PerfStatus::Progress => "PROGRESS",
            PerfStatus::Error => "ERROR",
            PerfStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for PerfStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Throughput and inter-arrival statistics.
///
/// Times are rounded the way they are logged: `total_time_sec` to 3 decimals,
/// `events_per_sec` to 1, the interval figures (milliseconds) to 2. Interval
/// figures are zero until a second value has arrived.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerfStats {
    pub status: PerfStatus,
    pub events: u64,
    pub total_time_sec: f64,
    pub events_per_sec: f64,
    pub avg_interval_ms: f64,
    pub min_interval_ms: f64,
    pub max_interval_ms: f64,
}

impl PerfStats {
    fn compute(
        status: PerfStatus,
        events: u64,
        total: Duration,
        intervals: &[Duration],
    ) -> PerfStats {
        let total_sec = total.as_secs_f64();
        let events_per_sec = if total_sec > 0.0 {
            events as f64 / total_sec
        } else {
            0.0
        };

        let (avg_ms, min_ms, max_ms) = if intervals.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            let ms: Vec<f64> = intervals.iter().map(|d| d.as_secs_f64() * 1000.0).collect();
            let sum: f64 = ms.iter().sum();
            let min = ms.iter().copied().fold(f64::INFINITY, f64::min);
            let max = ms.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (sum / ms.len() as f64, min, max)
        };

        PerfStats {
            status,
            events,
            total_time_sec: round_to(total_sec, 3),
            events_per_sec: round_to(events_per_sec, 1),
            avg_interval_ms: round_to(avg_ms, 2),
            min_interval_ms: round_to(min_ms, 2),
            max_interval_ms: round_to(max_ms, 2),
        }
    }
}

impl fmt::Display for PerfStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PERF [{}]: {} events in {:.3}s ({:.1}/sec) | interval: avg={:.2}ms, min={:.2}ms, max={:.2}ms",
            self.status,
            self.events,
            self.total_time_sec,
            self.events_per_sec,
            self.avg_interval_ms,
            self.min_interval_ms,
            self.max_interval_ms
        )
    }
}

/// Measures throughput and the time between values.
///
/// Timing starts with the first value. With a log interval of `n`, running
/// statistics are logged after every `n`th value; final statistics are always
/// logged when the stream ends, tagged `COMPLETED` or `ERROR`. Nothing is logged
/// for a stream that ended before its first value.
///
/// Records carry `component=performance`, `name` and every [`PerfStats`] field.
#[derive(Clone)]
pub struct PerformanceLogger {
    name: String,
    log_interval: Option<NonZeroUsize>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn LogSink>,
}

impl PerformanceLogger {
    pub fn new(name: impl Into<String>) -> Self {
        PerformanceLogger {
            name: name.into(),
            log_interval: None,
            clock: clock::system(),
            sink: default_sink(),
        }
    }

    /// Logs progress statistics every `every` values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroInterval`] if `every` is zero.
    pub fn with_interval(mut self, every: usize) -> Result<Self, ConfigError> {
        self.log_interval = Some(NonZeroUsize::new(every).ok_or(ConfigError::ZeroInterval)?);
        Ok(self)
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }
}

pub struct PerfHandler {
    config: PerformanceLogger,
    started: Option<Instant>,
    last: Option<Instant>,
    intervals: Vec<Duration>,
    count: u64,
}

impl PerfHandler {
    /// Number of values seen since the last reset.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Recorded inter-arrival times, oldest first.
    #[must_use]
    pub fn intervals(&self) -> &[Duration] {
        &self.intervals
    }

    /// Statistics as of now, or `None` before the first value.
    #[must_use]
    pub fn stats(&self, status: PerfStatus) -> Option<PerfStats> {
        let started = self.started?;
        if self.count == 0 {
            return None;
        }
        let total = self.config.clock.now().saturating_duration_since(started);
        Some(PerfStats::compute(
            status,
            self.count,
            total,
            &self.intervals,
        ))
    }

    fn log_stats(&self, status: PerfStatus) {
        let Some(stats) = self.stats(status) else {
            return;
        };
        self.config.sink.emit(
            LogRecord::new(Level::Info, &*self.config.name, stats.to_string())
                .with_field("component", "performance")
                .with_field("name", &*self.config.name)
                .with_field("status", stats.status.as_str())
                .with_field("events", stats.events)
                .with_field("total_time_sec", stats.total_time_sec)
                .with_field("events_per_sec", stats.events_per_sec)
                .with_field("avg_interval_ms", stats.avg_interval_ms)
                .with_field("min_interval_ms", stats.min_interval_ms)
                .with_field("max_interval_ms", stats.max_interval_ms),
        );
    }
}

impl<T: 'static> Handler<T> for PerfHandler {
    type Output = T;

    fn on_next(&mut self, value: T, downstream: &mut Emitter<'_, T>) {
        let now = self.config.clock.now();
        match self.last {
            None => self.started = Some(now),
            Some(last) => self.intervals.push(now.saturating_duration_since(last)),
        }
        self.last = Some(now);
        self.count += 1;

        if let Some(every) = self.config.log_interval {
            if self.count % every.get() as u64 == 0 {
                self.log_stats(PerfStatus::Progress);
            }
        }
        downstream.next(value);
    }

    fn on_error(&mut self, _error: &StreamError) {
        self.log_stats(PerfStatus::Error);
    }

    fn on_completed(&mut self) {
        self.log_stats(PerfStatus::Completed);
    }
}

impl<T: 'static> StatefulHandler<T> for PerfHandler {
    fn reset_state(&mut self) {
        self.started = None;
        self.last = None;
        self.intervals.clear();
        self.count = 0;
    }
}

impl<T: 'static> Operator<T> for PerformanceLogger {
    type Output = T;
    type Handler = Stateful<PerfHandler>;

    fn handler(&self) -> Self::Handler {
        Stateful::new(PerfHandler {
            config: self.clone(),
            started: None,
            last: None,
            intervals: Vec::new(),
            count: 0,
        })
    }
}
