use std::{error::Error, marker::PhantomData, sync::Arc};

use crate::errors::StreamError;

use super::{Emitter, Handler, Operator};

/// Transform-and-forward: applies a fallible function to every value.
///
/// `Ok` results are forwarded. An `Err` becomes the stream's terminal error,
/// since there is no value to forward in its place.
pub struct Transform<F, U, E> {
    f: Arc<F>,
    _types: PhantomData<fn() -> (U, E)>,
}

impl<F, U, E> Transform<F, U, E> {
    pub fn new<T>(f: F) -> Self
    where
        F: Fn(T) -> Result<U, E>,
    {
        Transform {
            f: Arc::new(f),
            _types: PhantomData,
        }
    }
}

pub struct TransformHandler<F, U, E> {
    f: Arc<F>,
    _types: PhantomData<fn() -> (U, E)>,
}

impl<T, F, U, E> Handler<T> for TransformHandler<F, U, E>
where
    F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
    U: 'static,
    E: Error + Send + Sync + 'static,
{
    type Output = U;

    fn on_next(&mut self, value: T, downstream: &mut Emitter<'_, U>) {
        match (self.f)(value) {
            Ok(mapped) => downstream.next(mapped),
            Err(e) => downstream.fail(StreamError::new(e)),
        }
    }
}

impl<T, F, U, E> Operator<T> for Transform<F, U, E>
where
    T: 'static,
    F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
    U: 'static,
    E: Error + Send + Sync + 'static,
{
    type Output = U;
    type Handler = TransformHandler<F, U, E>;

    fn handler(&self) -> Self::Handler {
        TransformHandler {
            f: Arc::clone(&self.f),
            _types: PhantomData,
        }
    }
}

/// Predicate-and-forward: forwards the values a fallible predicate accepts.
///
/// A predicate error becomes the stream's terminal error.
pub struct Filtering<P, E> {
    predicate: Arc<P>,
    _error: PhantomData<fn() -> E>,
}

impl<P, E> Filtering<P, E> {
    pub fn new<T>(predicate: P) -> Self
    where
        P: Fn(&T) -> Result<bool, E>,
    {
        Filtering {
            predicate: Arc::new(predicate),
            _error: PhantomData,
        }
    }
}

pub struct FilteringHandler<P, E> {
    predicate: Arc<P>,
    _error: PhantomData<fn() -> E>,
}

impl<T, P, E> Handler<T> for FilteringHandler<P, E>
where
    T: 'static,
    P: Fn(&T) -> Result<bool, E> + Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
{
    type Output = T;

    fn on_next(&mut self, value: T, downstream: &mut Emitter<'_, T>) {
        match (self.predicate)(&value) {
            Ok(true) => downstream.next(value),
            Ok(false) => {}
            Err(e) => downstream.fail(StreamError::new(e)),
        }
    }
}

impl<T, P, E> Operator<T> for Filtering<P, E>
where
    T: 'static,
    P: Fn(&T) -> Result<bool, E> + Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
{
    type Output = T;
    type Handler = FilteringHandler<P, E>;

    fn handler(&self) -> Self::Handler {
        FilteringHandler {
            predicate: Arc::clone(&self.predicate),
            _error: PhantomData,
        }
    }
}
