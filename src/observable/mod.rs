//! The `observable` module provides the `Observable` type and the `ObservableExt`
//! extension trait used to chain operators onto it.

use std::convert::Infallible;

use crate::errors::StreamError;
use crate::observer::Observer;
use crate::operator::{Filtering, Operator, Tap, Transform};
use crate::subscription::subscribe::{Subscribeable, Subscriber, Subscription};

/// The `Observable` struct represents a cold source of values.
///
/// Nothing is emitted until the observable is subscribed, and each subscription
/// runs the subscribe function again.
///
/// # Example: synchronous `Observable`
///
/// ```
/// use rxr_opkit::subscribe::{Subscriber, Subscription};
/// use rxr_opkit::{Observable, ObservableExt, Observer, Subscribeable};
///
/// let mut observable = Observable::new(|mut subscriber| {
///     for i in 1..=3 {
///         subscriber.next(i);
///     }
///     subscriber.complete();
///     Subscription::empty()
/// })
/// .map(|v| v * 10);
///
/// observable.subscribe(Subscriber::on_next(|v| println!("Emitted {}", v)));
/// ```
///
/// # Example: asynchronous `Observable` on an OS thread
///
/// ```no_run
/// use std::time::Duration;
///
/// use rxr_opkit::subscribe::{Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic};
/// use rxr_opkit::{Observable, Observer, Subscribeable};
///
/// let mut observable = Observable::new(|mut o| {
///     let join_handle = std::thread::spawn(move || {
///         for i in 0..=15 {
///             o.next(i);
///             std::thread::sleep(Duration::from_millis(1));
///         }
///         o.complete();
///     });
///     Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::JoinThread(join_handle))
/// });
///
/// let subscription = observable.subscribe(Subscriber::on_next(|v: i32| println!("{}", v)));
/// if subscription.join().is_err() {
///     // Handle error
/// }
/// ```
pub struct Observable<T> {
    subscribe_fn: Box<dyn FnMut(Subscriber<T>) -> Subscription + Send + Sync>,
}

impl<T> Observable<T> {
    /// Creates a new `Observable` with the provided subscribe function.
    ///
    /// The subscribe function drives the `Subscriber` it receives and returns a
    /// `Subscription` that can cancel the emission or be used to await it.
    pub fn new(sf: impl FnMut(Subscriber<T>) -> Subscription + Send + Sync + 'static) -> Self {
        Observable {
            subscribe_fn: Box::new(sf),
        }
    }

    /// Emits every item of `items` synchronously, then completes.
    ///
    /// The iterable is cloned for each subscription. Emission stops early once
    /// the subscriber is terminated, so an endless iterator is fine as long as
    /// something downstream ends the stream.
    pub fn from_iter<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T> + Clone + Send + Sync + 'static,
    {
        Observable::new(move |mut o| {
            for item in items.clone() {
                if o.is_terminated() {
                    break;
                }
                o.next(item);
            }
            o.complete();
            Subscription::empty()
        })
    }

    /// Completes immediately without emitting.
    pub fn empty() -> Self {
        Observable::new(|mut o| {
            o.complete();
            Subscription::empty()
        })
    }

    /// Emits every `Ok` item, then terminates with the first `Err` or, if there
    /// is none, completes.
    pub fn from_results<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Result<T, StreamError>> + Clone + Send + Sync + 'static,
    {
        Observable::new(move |mut o| {
            for item in items.clone() {
                if o.is_terminated() {
                    break;
                }
                match item {
                    Ok(v) => o.next(v),
                    Err(e) => {
                        o.error(e);
                        return Subscription::empty();
                    }
                }
            }
            o.complete();
            Subscription::empty()
        })
    }
}

/// The `ObservableExt` trait provides extension methods for chaining operators
/// onto anything that can be subscribed to.
pub trait ObservableExt<T: 'static>: Subscribeable<ObsType = T> {
    /// Attaches `operator` to this observable.
    fn pipe<O>(self, operator: O) -> Observable<O::Output>
    where
        Self: Sized + Send + Sync + 'static,
        O: Operator<T>,
    {
        operator.attach(self)
    }

    /// Transforms the items emitted by the observable using a transformation
    /// function.
    fn map<U, F>(self, f: F) -> Observable<U>
    where
        Self: Sized + Send + Sync + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
        U: 'static,
    {
        self.pipe(Transform::new(move |v: T| Ok::<U, Infallible>(f(v))))
    }

    /// Like [`map`](Self::map), but an `Err` ends the stream with that error.
    fn try_map<U, E, F>(self, f: F) -> Observable<U>
    where
        Self: Sized + Send + Sync + 'static,
        F: Fn(T) -> Result<U, E> + Send + Sync + 'static,
        U: 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        self.pipe(Transform::new(f))
    }

    /// Only items for which the predicate returns `true` are emitted.
    fn filter<P>(self, predicate: P) -> Observable<T>
    where
        Self: Sized + Send + Sync + 'static,
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.pipe(Filtering::new(move |v: &T| Ok::<bool, Infallible>(predicate(v))))
    }

    /// Like [`filter`](Self::filter), but an `Err` ends the stream with that error.
    fn try_filter<P, E>(self, predicate: P) -> Observable<T>
    where
        Self: Sized + Send + Sync + 'static,
        P: Fn(&T) -> Result<bool, E> + Send + Sync + 'static,
        E: std::error::Error + Send + Sync + 'static,
    {
        self.pipe(Filtering::new(predicate))
    }

    /// Calls `f` with a reference to every item, forwarding items unchanged.
    fn tap<F>(self, f: F) -> Observable<T>
    where
        Self: Sized + Send + Sync + 'static,
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.pipe(Tap::new().on_next(f))
    }
}

impl<T: 'static> Subscribeable for Observable<T> {
    type ObsType = T;

    fn subscribe(&mut self, v: Subscriber<Self::ObsType>) -> Subscription {
        (self.subscribe_fn)(v)
    }
}

impl<O, T: 'static> ObservableExt<T> for O where O: Subscribeable<ObsType = T> {}
