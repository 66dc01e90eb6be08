use std::sync::Arc;

use crate::clock::{self, Clock};
use crate::inspect::{render_item, Inspect};
use crate::operator::Tap;
use crate::sink::{default_sink, Level, LogRecord, LogSink};

/// Quick debugging tap: logs `Next: <value>` at `Debug`, `Error: <kind>: <message>`
/// at `Error` and `Completed` at `Info`.
///
/// ```
/// use rxr_opkit::logging::debug_stream;
/// use rxr_opkit::subscribe::Subscriber;
/// use rxr_opkit::{Observable, ObservableExt, Subscribeable};
///
/// Observable::from_iter(vec![1, 2, 3])
///     .pipe(debug_stream("before"))
///     .map(|v| v * 2)
///     .pipe(debug_stream("after"))
///     .subscribe(Subscriber::on_next(|_| {}));
/// ```
pub fn debug_stream<T: Inspect + 'static>(name: impl Into<String>) -> Tap<T> {
    debug_stream_with(name, default_sink())
}

/// [`debug_stream`] writing to `sink`.
pub fn debug_stream_with<T: Inspect + 'static>(
    name: impl Into<String>,
    sink: Arc<dyn LogSink>,
) -> Tap<T> {
    let name: Arc<str> = Arc::from(name.into());
    let tap = Tap::new().with_name(&*name).with_sink(Arc::clone(&sink));
    let (n_next, n_error, n_done) = (name.clone(), name.clone(), name);
    let (s_next, s_error, s_done) = (sink.clone(), sink.clone(), sink);

    tap.on_next(move |v: &T| {
        s_next.emit(LogRecord::new(
            Level::Debug,
            &*n_next,
            format!("Next: {}", render_item(v)),
        ));
    })
    .on_error(move |e| {
        s_error.emit(LogRecord::new(
            Level::Error,
            &*n_error,
            format!("Error: {}: {}", e.kind(), e.message()),
        ));
    })
    .on_complete(move || {
        s_done.emit(LogRecord::new(Level::Info, &*n_done, "Completed"));
    })
}

/// Tap that prefixes every line with the seconds elapsed since it was created:
/// `[0.012s] Next: <type>`, `[0.015s] Error: <kind>`, `[0.015s] Completed`.
pub fn timestamp_stream<T: Inspect + 'static>(name: impl Into<String>) -> Tap<T> {
    timestamp_stream_with(name, default_sink(), clock::system())
}

/// [`timestamp_stream`] writing to `sink` and reading time from `clock`.
pub fn timestamp_stream_with<T: Inspect + 'static>(
    name: impl Into<String>,
    sink: Arc<dyn LogSink>,
    clock: Arc<dyn Clock>,
) -> Tap<T> {
    let started = clock.now();
    let stamp = Arc::new(move || {
        let elapsed = clock.now().saturating_duration_since(started);
        format!("[{:.3}s]", elapsed.as_secs_f64())
    });
    let name: Arc<str> = Arc::from(name.into());
    let tap = Tap::new().with_name(&*name).with_sink(Arc::clone(&sink));
    let (n_next, n_error, n_done) = (name.clone(), name.clone(), name);
    let (s_next, s_error, s_done) = (sink.clone(), sink.clone(), sink);
    let (t_next, t_error, t_done) = (stamp.clone(), stamp.clone(), stamp);

    tap.on_next(move |v: &T| {
        s_next.emit(LogRecord::new(
            Level::Info,
            &*n_next,
            format!("{} Next: {}", t_next(), v.type_name()),
        ));
    })
    .on_error(move |e| {
        s_error.emit(LogRecord::new(
            Level::Error,
            &*n_error,
            format!("{} Error: {}", t_error(), e.kind()),
        ));
    })
    .on_complete(move || {
        s_done.emit(LogRecord::new(
            Level::Success,
            &*n_done,
            format!("{} Completed", t_done()),
        ));
    })
}
