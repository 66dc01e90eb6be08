use std::sync::Arc;

use crate::errors::StreamError;
use crate::sink::{contained, default_sink, LogSink};

use super::{Emitter, Handler, Operator};

type NextTap<T> = Arc<dyn Fn(&T) + Send + Sync>;
type ErrorTap = Arc<dyn Fn(&StreamError) + Send + Sync>;
type CompleteTap = Arc<dyn Fn() + Send + Sync>;

/// Runs side effects for each notification and forwards everything unchanged.
///
/// A callback that panics is contained: the panic is reported to the tap's sink
/// at debug level, under the tap's name, and the notification still reaches
/// downstream.
pub struct Tap<T> {
    name: Arc<str>,
    sink: Arc<dyn LogSink>,
    on_next: Option<NextTap<T>>,
    on_error: Option<ErrorTap>,
    on_complete: Option<CompleteTap>,
}

impl<T> Tap<T> {
    pub fn new() -> Self {
        Tap {
            name: Arc::from("tap"),
            sink: default_sink(),
            on_next: None,
            on_error: None,
            on_complete: None,
        }
    }

    /// Name panicking callbacks are reported under. Defaults to `tap`.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Arc::from(name.into());
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    #[must_use]
    pub fn on_next(mut self, f: impl Fn(&T) + Send + Sync + 'static) -> Self {
        self.on_next = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_error(mut self, f: impl Fn(&StreamError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(f));
        self
    }

    #[must_use]
    pub fn on_complete(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Arc::new(f));
        self
    }
}

impl<T> Default for Tap<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TapHandler<T> {
    name: Arc<str>,
    sink: Arc<dyn LogSink>,
    on_next: Option<NextTap<T>>,
    on_error: Option<ErrorTap>,
    on_complete: Option<CompleteTap>,
}

impl<T> TapHandler<T> {
    fn run(&self, what: &str, f: impl FnOnce()) {
        contained(self.sink.as_ref(), &self.name, what, f);
    }
}

impl<T: 'static> Handler<T> for TapHandler<T> {
    type Output = T;

    fn on_next(&mut self, value: T, downstream: &mut Emitter<'_, T>) {
        if let Some(f) = &self.on_next {
            self.run("on_next", || f(&value));
        }
        downstream.next(value);
    }

    fn on_error(&mut self, error: &StreamError) {
        if let Some(f) = &self.on_error {
            self.run("on_error", || f(error));
        }
    }

    fn on_completed(&mut self) {
        if let Some(f) = &self.on_complete {
            self.run("on_complete", || f());
        }
    }
}

impl<T: 'static> Operator<T> for Tap<T> {
    type Output = T;
    type Handler = TapHandler<T>;

    fn handler(&self) -> Self::Handler {
        TapHandler {
            name: Arc::clone(&self.name),
            sink: Arc::clone(&self.sink),
            on_next: self.on_next.clone(),
            on_error: self.on_error.clone(),
            on_complete: self.on_complete.clone(),
        }
    }
}
