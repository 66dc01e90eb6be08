use crate::errors::StreamError;

/// Receiver of the three notification kinds a stream delivers.
///
/// A well-behaved producer calls `next` zero or more times followed by at most
/// one of `error` or `complete`.
pub trait Observer {
    type NextFnType;

    fn next(&mut self, _: Self::NextFnType);
    fn complete(&mut self);
    fn error(&mut self, _: StreamError);
}
