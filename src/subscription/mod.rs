//! Provides structures and traits related to subscription management.
//!
//! This module includes `Subscriber` for handling observed values, errors and
//! completion, and `Subscription` for cancelling a subscription or awaiting the
//! thread or task that feeds it.
pub mod subscribe;
