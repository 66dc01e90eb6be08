mod common;

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use common::{failing_at, generate_u32_observable, InjectedError, Notification, Recorder};
use parking_lot::Mutex;
use rxr_opkit::{
    operator::{Filtering, Tap, Transform},
    subscribe::{Subscriber, Subscription},
    Observable, ObservableExt, Observer, StreamError, Subscribeable, Unsubscribeable,
};

#[test]
fn map_then_filter() {
    let rec = Recorder::new();
    Observable::from_iter(vec![1, 2, 3, 4])
        .map(|v| format!("#{v}"))
        .filter(|s| s != "#3")
        .subscribe(rec.subscriber());

    assert_eq!(rec.values(), vec!["#1", "#2", "#4"]);
    assert_eq!(rec.terminals(), 1);
}

#[test]
fn transform_and_filtering_through_pipe() {
    let rec = Recorder::new();
    Observable::from_iter(vec![10u32, 15, 20])
        .pipe(Transform::new(|v: u32| u8::try_from(v)))
        .pipe(Filtering::new(|v: &u8| {
            Ok::<_, std::convert::Infallible>(v % 10 == 0)
        }))
        .subscribe(rec.subscriber());

    assert_eq!(
        rec.notifications(),
        vec![
            Notification::Next(10u8),
            Notification::Next(20),
            Notification::Completed
        ]
    );
}

#[test]
fn transform_failure_keeps_kind_and_message() {
    let rec = Recorder::new();
    Observable::from_iter(vec![100u32, 300, 5])
        .try_map(u8::try_from)
        .subscribe(rec.subscriber());

    assert_eq!(
        rec.notifications(),
        vec![
            Notification::Next(100u8),
            Notification::Error {
                kind: "TryFromIntError".to_string(),
                message: "out of range integral type conversion attempted".to_string(),
            },
        ]
    );
}

#[test]
fn upstream_error_passes_through_every_stage() {
    let rec = Recorder::new();
    failing_at(2, 4)
        .map(|v| v + 1)
        .filter(|_| true)
        .tap(|_| {})
        .subscribe(rec.subscriber());

    assert_eq!(
        rec.notifications(),
        vec![
            Notification::Next(2),
            Notification::Error {
                kind: "InjectedError".to_string(),
                message: "value 2 rejected".to_string(),
            },
        ]
    );
}

#[test]
fn failing_stage_stops_a_synchronous_source() {
    let pulled = Arc::new(AtomicUsize::new(0));
    let pulled_c = Arc::clone(&pulled);
    let rec = Recorder::new();

    Observable::from_iter(0u32..200_000)
        .tap(move |_| {
            pulled_c.fetch_add(1, Ordering::SeqCst);
        })
        .try_map(|v: u32| {
            if v < 3 {
                Ok(v)
            } else {
                Err(InjectedError(format!("{v} is too large")))
            }
        })
        .subscribe(rec.subscriber());

    assert_eq!(pulled.load(Ordering::SeqCst), 4);
    assert_eq!(
        rec.notifications(),
        vec![
            Notification::Next(0),
            Notification::Next(1),
            Notification::Next(2),
            Notification::Error {
                kind: "InjectedError".to_string(),
                message: "3 is too large".to_string(),
            },
        ]
    );
}

#[test]
fn endless_source_ends_with_the_stream() {
    let rec = Recorder::new();

    Observable::from_iter(0u64..)
        .map(|v| v * 2)
        .filter(|v| v % 3 != 0)
        .try_filter(|v: &u64| {
            if *v < 20 {
                Ok(true)
            } else {
                Err(InjectedError(format!("stopped at {v}")))
            }
        })
        .subscribe(rec.subscriber());

    assert_eq!(rec.values(), vec![2, 4, 8, 10, 14, 16]);
    assert_eq!(rec.terminals(), 1);
}

#[test]
fn failing_stage_stops_a_thread_source() {
    let pulled = Arc::new(AtomicUsize::new(0));
    let pulled_c = Arc::clone(&pulled);
    let rec = Recorder::new();

    let subscription = generate_u32_observable(10_000)
        .tap(move |_| {
            pulled_c.fetch_add(1, Ordering::SeqCst);
        })
        .try_map(|v: u32| {
            if v < 5 {
                Ok(v)
            } else {
                Err(InjectedError("enough".to_string()))
            }
        })
        .subscribe(rec.subscriber());

    assert!(subscription.join().is_ok());
    assert_eq!(pulled.load(Ordering::SeqCst), 6);
    assert_eq!(rec.values(), vec![0, 1, 2, 3, 4]);
    assert_eq!(rec.terminals(), 1);
}

#[test]
fn tap_observes_all_three_notifications() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let (s_next, s_err) = (seen.clone(), seen.clone());
    let rec = Recorder::new();

    failing_at(3, 5)
        .pipe(
            Tap::new()
                .on_next(move |v: &i32| s_next.lock().push(format!("next {v}")))
                .on_error(move |e: &StreamError| s_err.lock().push(format!("error {}", e.kind())))
                .on_complete(|| unreachable!("stream fails before completing")),
        )
        .subscribe(rec.subscriber());

    assert_eq!(
        *seen.lock(),
        vec!["next 1", "next 2", "error InjectedError"]
    );
    assert_eq!(rec.values(), vec![1, 2]);
}

#[test]
fn chain_over_thread_source() {
    let rec = Recorder::new();
    let subscription = generate_u32_observable(50)
        .filter(|v| v % 10 == 0)
        .map(|v| v / 10)
        .subscribe(rec.subscriber());

    assert!(subscription.join().is_ok());
    assert_eq!(rec.values(), vec![0, 1, 2, 3, 4, 5]);
    assert_eq!(rec.notifications().last(), Some(&Notification::Completed));
}

#[test]
fn unsubscribe_reaches_the_source() {
    let rec = Recorder::new();
    let subscription = generate_u32_observable(5_000)
        .map(|v| v * 2)
        .subscribe(rec.subscriber());

    std::thread::sleep(Duration::from_millis(20));
    subscription.unsubscribe();
    std::thread::sleep(Duration::from_millis(50));

    assert!(rec.values().len() < 5_001);
    assert_eq!(rec.terminals(), 1);
}

#[tokio::test]
async fn task_source_through_operators() {
    let observable = Observable::new(|mut o: Subscriber<u64>| {
        let handle = tokio::spawn(async move {
            for i in 1..=6 {
                o.next(i);
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
            o.complete();
        });
        Subscription::new(
            rxr_opkit::subscribe::UnsubscribeLogic::Nil,
            rxr_opkit::subscribe::SubscriptionHandle::JoinTask(handle),
        )
    });

    let rec = Recorder::new();
    let subscription = observable
        .filter(|v| v % 2 == 1)
        .map(|v| v * v)
        .subscribe(rec.subscriber());

    assert!(subscription.join_concurrent().await.is_ok());
    assert_eq!(rec.values(), vec![1, 9, 25]);
}
