#![allow(dead_code)]

use std::{
    error::Error,
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use parking_lot::Mutex;
use rxr_opkit::{
    clock::ManualClock,
    subscribe::{Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic},
    Observable, Observer, StreamError,
};

#[derive(Debug)]
pub struct InjectedError(pub String);

impl fmt::Display for InjectedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for InjectedError {}

#[derive(Debug, Clone, PartialEq)]
pub enum Notification<T> {
    Next(T),
    Error { kind: String, message: String },
    Completed,
}

/// Records every notification a subscriber receives, in order.
pub struct Recorder<T> {
    log: Arc<Mutex<Vec<Notification<T>>>>,
}

impl<T: Clone + Send + 'static> Recorder<T> {
    pub fn new() -> Self {
        Recorder {
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn subscriber(&self) -> Subscriber<T> {
        let (n, e, c) = (self.log.clone(), self.log.clone(), self.log.clone());
        Subscriber::new(
            move |v| n.lock().push(Notification::Next(v)),
            move |err: StreamError| {
                e.lock().push(Notification::Error {
                    kind: err.kind().to_string(),
                    message: err.message(),
                })
            },
            move || c.lock().push(Notification::Completed),
        )
    }

    pub fn notifications(&self) -> Vec<Notification<T>> {
        self.log.lock().clone()
    }

    pub fn values(&self) -> Vec<T> {
        self.log
            .lock()
            .iter()
            .filter_map(|n| match n {
                Notification::Next(v) => Some(v.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn terminals(&self) -> usize {
        self.log
            .lock()
            .iter()
            .filter(|n| !matches!(n, Notification::Next(_)))
            .count()
    }
}

/// Emits `1..=total`, failing with an [`InjectedError`] in place of value
/// `fail_at`.
pub fn failing_at(fail_at: i32, total: i32) -> Observable<i32> {
    Observable::new(move |mut o| {
        for i in 1..=total {
            if i == fail_at {
                o.error(StreamError::new(InjectedError(format!("value {i} rejected"))));
                return Subscription::empty();
            }
            o.next(i);
        }
        o.complete();
        Subscription::empty()
    })
}

/// Emits `0..=end` from an OS thread, 1ms apart. Unsubscribing, or a
/// downstream that ended the stream, stops emission.
pub fn generate_u32_observable(end: u32) -> Observable<u32> {
    Observable::new(move |mut o: Subscriber<_>| {
        let done = Arc::new(AtomicBool::new(false));
        let done_c = Arc::clone(&done);

        let jh = std::thread::spawn(move || {
            for i in 0..=end {
                if done.load(Ordering::SeqCst) || o.is_terminated() {
                    break;
                }
                o.next(i);
                std::thread::sleep(Duration::from_millis(1));
            }
            o.complete();
        });

        Subscription::new(
            UnsubscribeLogic::Logic(Box::new(move || done_c.store(true, Ordering::SeqCst))),
            SubscriptionHandle::JoinThread(jh),
        )
    })
}

/// Emits `0..count`, advancing `clock` by `gap` before every value but the
/// first.
pub fn spaced_on(clock: &ManualClock, count: u32, gap: Duration) -> Observable<u32> {
    let clock = clock.clone();
    Observable::new(move |mut o| {
        for i in 0..count {
            if i > 0 {
                clock.advance(gap);
            }
            o.next(i);
        }
        o.complete();
        Subscription::empty()
    })
}
