//! Error types shared by the runtime and the operators.
//!
//! - [`StreamError`] travels through the error channel of a stream. It keeps the
//!   original error, its kind and its message intact while being cheap to clone.
//! - [`ConfigError`] is returned when an operator is configured with an invalid
//!   value.
//! - [`JoinError`] is returned when awaiting the thread or task behind a
//!   [`Subscription`](crate::subscribe::Subscription) fails.

mod stream_error;

pub use stream_error::*;

use thiserror::Error;

/// Boxed error returned by fallible value formatters.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// # Invalid operator configuration.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A marble timeline needs at least one column.
    #[error("timeline width must be greater than zero")]
    ZeroWidth,

    /// A progress interval of zero would never fire.
    #[error("log interval must be greater than zero")]
    ZeroInterval,

    /// The level name did not match any [`Level`](crate::sink::Level).
    #[error("unknown log level `{0}`")]
    UnknownLevel(String),
}

/// # Failure while waiting for an asynchronous source to finish.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum JoinError {
    /// The OS thread driving the observable panicked.
    #[error("observable thread panicked")]
    ThreadPanicked,

    /// The tokio task driving the observable was cancelled or panicked.
    #[error("observable task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A tokio task handle can only be awaited, not joined from blocking code.
    #[error("observable runs on a tokio task; use `join_concurrent().await` instead")]
    BlockingOnTask,
}
