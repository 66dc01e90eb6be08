use crate::errors::StreamError;

use super::{Emitter, Handler};

/// A handler that accumulates state over the lifetime of a subscription.
///
/// Wrap it in [`Stateful`] to have [`reset_state`](Self::reset_state) called
/// after the terminal notification has been forwarded, on both the error and the
/// completion path.
pub trait StatefulHandler<T>: Handler<T> {
    /// Returns every accumulator to its initial value.
    fn reset_state(&mut self);
}

/// Adapter that resets a [`StatefulHandler`] once its stream terminates.
pub struct Stateful<H>(H);

impl<H> Stateful<H> {
    pub fn new(handler: H) -> Self {
        Stateful(handler)
    }

    pub fn get_ref(&self) -> &H {
        &self.0
    }

    pub fn into_inner(self) -> H {
        self.0
    }
}

impl<T, H> Handler<T> for Stateful<H>
where
    H: StatefulHandler<T>,
{
    type Output = H::Output;

    fn on_next(&mut self, value: T, downstream: &mut Emitter<'_, Self::Output>) {
        self.0.on_next(value, downstream);
    }

    fn on_error(&mut self, error: &StreamError) {
        self.0.on_error(error);
    }

    fn on_completed(&mut self) {
        self.0.on_completed();
    }

    fn on_terminated(&mut self) {
        self.0.on_terminated();
        self.0.reset_state();
    }
}
