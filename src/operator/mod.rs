//! The operator framework.
//!
//! An operator is split in two phases:
//!
//! - an [`Operator`] is pure configuration. It is built once and never changes.
//! - a [`Handler`] is the live, stateful part. A fresh one is created by
//!   [`Operator::handler`] every time the attached observable is subscribed, and
//!   it is bound to that subscription's downstream subscriber.
//!
//! ```text
//!   upstream ──next/error/complete──► Link ──► Handler hook ──► downstream
//!                                      │
//!                              Attached │ Terminated
//! ```
//!
//! A handler only decides what happens to values (`on_next`). Errors and
//! completion are observed through `on_error` / `on_completed`, but forwarding
//! them is done by the framework after the hook returns, so no handler can
//! swallow a terminal notification. After forwarding it, the link drops the
//! handler and the downstream subscriber and ignores anything that still
//! arrives from upstream.
//!
//! Termination also travels upstream. When a handler fails the stream, or the
//! downstream subscriber has already terminated, the link marks the subscriber
//! it gave to its upstream as terminated. Sources see that through
//! [`Subscriber::is_terminated`] and stop emitting.

mod simple;
mod stateful;
mod tap;

pub use simple::*;
pub use stateful::*;
pub use tap::*;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use parking_lot::Mutex;

use crate::errors::StreamError;
use crate::observable::Observable;
use crate::observer::Observer;
use crate::subscription::subscribe::{Subscribeable, Subscriber};

/// The per-subscription half of an operator.
pub trait Handler<T>: Send + 'static {
    /// Type of the values forwarded downstream.
    type Output;

    /// Handles a value from upstream. Use `downstream` to forward values or to
    /// turn this notification into the stream's terminal error.
    fn on_next(&mut self, value: T, downstream: &mut Emitter<'_, Self::Output>);

    /// Observes an upstream error. The error is forwarded once this returns.
    fn on_error(&mut self, _error: &StreamError) {}

    /// Observes upstream completion. Completion is forwarded once this returns.
    fn on_completed(&mut self) {}

    /// Runs once, after the terminal notification has been forwarded.
    fn on_terminated(&mut self) {}
}

/// The configuration half of an operator.
pub trait Operator<T: 'static>: Send + Sync + 'static {
    type Output: 'static;
    type Handler: Handler<T, Output = Self::Output>;

    /// Builds the live handler for one subscription.
    fn handler(&self) -> Self::Handler;

    /// Returns an observable that runs this operator over `upstream`.
    ///
    /// Nothing happens until the returned observable is subscribed. Each
    /// subscription gets its own handler and subscribes to `upstream` once.
    fn attach<S>(self, upstream: S) -> Observable<Self::Output>
    where
        Self: Sized,
        S: Subscribeable<ObsType = T> + Send + Sync + 'static,
    {
        attach(self, upstream)
    }
}

/// Forwarding handle passed to [`Handler::on_next`].
pub struct Emitter<'a, R> {
    downstream: &'a mut Subscriber<R>,
    failure: Option<StreamError>,
}

impl<'a, R> Emitter<'a, R> {
    /// Wraps `downstream`. The framework builds one per value; building one by
    /// hand is useful for driving a handler directly.
    pub fn new(downstream: &'a mut Subscriber<R>) -> Self {
        Emitter {
            downstream,
            failure: None,
        }
    }

    /// Forwards `value` downstream. Ignored once [`fail`](Self::fail) was called.
    pub fn next(&mut self, value: R) {
        if self.failure.is_none() {
            self.downstream.next(value);
        }
    }

    /// Ends the stream with `error` once the current `on_next` returns. Only the
    /// first failure is kept.
    pub fn fail(&mut self, error: StreamError) {
        if self.failure.is_none() {
            self.failure = Some(error);
        }
    }

    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.failure.is_some()
    }

    fn into_failure(self) -> Option<StreamError> {
        self.failure
    }
}

enum Terminal {
    Error(StreamError),
    Completed,
    /// Downstream stopped listening; nothing is forwarded.
    Detached,
}

/// Binding between one upstream subscription and its downstream subscriber.
enum Link<H, R> {
    Attached {
        handler: H,
        downstream: Subscriber<R>,
        /// Termination flag of the subscriber handed to upstream.
        upstream: Arc<AtomicBool>,
    },
    Terminated,
}

impl<H, R> Link<H, R> {
    fn next<T>(&mut self, value: T)
    where
        H: Handler<T, Output = R>,
    {
        let terminal = match self {
            Link::Attached {
                handler,
                downstream,
                ..
            } => {
                if downstream.is_terminated() {
                    Some(Terminal::Detached)
                } else {
                    let mut emitter = Emitter::new(downstream);
                    handler.on_next(value, &mut emitter);
                    match emitter.into_failure() {
                        Some(error) => Some(Terminal::Error(error)),
                        None if downstream.is_terminated() => Some(Terminal::Detached),
                        None => None,
                    }
                }
            }
            Link::Terminated => {
                tracing::trace!("value dropped after terminal notification");
                return;
            }
        };
        if let Some(terminal) = terminal {
            self.terminate::<T>(terminal);
        }
    }

    fn error<T>(&mut self, error: StreamError)
    where
        H: Handler<T, Output = R>,
    {
        if let Link::Attached { handler, .. } = self {
            handler.on_error(&error);
            self.terminate::<T>(Terminal::Error(error));
        }
    }

    fn complete<T>(&mut self)
    where
        H: Handler<T, Output = R>,
    {
        if let Link::Attached { handler, .. } = self {
            handler.on_completed();
            self.terminate::<T>(Terminal::Completed);
        }
    }

    fn terminate<T>(&mut self, terminal: Terminal)
    where
        H: Handler<T, Output = R>,
    {
        if let Link::Attached {
            mut handler,
            mut downstream,
            upstream,
        } = std::mem::replace(self, Link::Terminated)
        {
            upstream.store(true, Ordering::Release);
            match terminal {
                Terminal::Error(error) => downstream.error(error),
                Terminal::Completed => downstream.complete(),
                Terminal::Detached => {
                    tracing::trace!("downstream terminated, detaching from upstream");
                }
            }
            handler.on_terminated();
        }
    }
}

/// Attaches `operator` to `upstream`. See [`Operator::attach`].
pub fn attach<T, O, S>(operator: O, mut upstream: S) -> Observable<O::Output>
where
    T: 'static,
    O: Operator<T>,
    S: Subscribeable<ObsType = T> + Send + Sync + 'static,
{
    let operator = Arc::new(operator);

    Observable::new(move |downstream: Subscriber<O::Output>| {
        tracing::trace!(
            operator = std::any::type_name::<O>(),
            "subscribing to upstream"
        );
        let upstream_done = Arc::new(AtomicBool::new(false));
        let link = Arc::new(Mutex::new(Link::Attached {
            handler: operator.handler(),
            downstream,
            upstream: Arc::clone(&upstream_done),
        }));
        let link_e = Arc::clone(&link);
        let link_c = Arc::clone(&link);

        let observer = Subscriber::new(
            move |v: T| {
                link.lock().next(v);
            },
            move |stream_error| {
                link_e.lock().error::<T>(stream_error);
            },
            move || {
                link_c.lock().complete::<T>();
            },
        )
        .sharing_termination(upstream_done);
        upstream.subscribe(observer)
    })
}
