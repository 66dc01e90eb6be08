//! Logging and debugging operators for observable streams.
//!
//! The crate carries a small cold-observable runtime ([`Observable`],
//! [`Subscriber`](subscribe::Subscriber), [`Subscription`](subscribe::Subscription))
//! and an operator framework on top of it. An operator is an immutable
//! configuration ([`Operator`](operator::Operator)) that builds a fresh, stateful
//! [`Handler`](operator::Handler) for every subscription. Terminal notifications
//! are always forwarded by the framework, so a handler can observe an error or
//! completion but never swallow it.
//!
//! The [`logging`] module builds six observe-only operators on that framework:
//! a counting logger, an ASCII marble diagram, a structured context logger, a
//! shape-aware rich formatter, a performance logger and a conditional logger.
//! They write [`LogRecord`](sink::LogRecord)s to a [`LogSink`](sink::LogSink),
//! which forwards to `tracing` by default.
//!
//! # Example
//!
//! ```no_run
//! use rxr_opkit::logging::{conditional_log, log};
//! use rxr_opkit::subscribe::Subscriber;
//! use rxr_opkit::{Observable, ObservableExt, Subscribeable};
//!
//! tracing_subscriber::fmt().init();
//!
//! Observable::from_iter(1..=5)
//!     .pipe(log("numbers"))
//!     .map(|v| v * 2)
//!     .filter(|v| *v > 5)
//!     .pipe(conditional_log("large").when(|v: &i32| *v > 8))
//!     .subscribe(Subscriber::on_next(|v| println!("{v}")));
//! ```

mod errors;
mod observer;
mod subscription;

pub mod clock;
pub mod inspect;
pub mod logging;
pub mod observable;
pub mod operator;
pub mod sink;

pub use errors::*;
pub use observable::{Observable, ObservableExt};
pub use observer::Observer;
pub use subscription::subscribe;
pub use subscription::subscribe::{Subscribeable, Unsubscribeable};
