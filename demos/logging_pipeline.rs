//! Runs a few pipelines through every logging operator.
//!
//! ```text
//! RUST_LOG=rxr_opkit=debug cargo run --example logging_pipeline
//! ```

use std::{collections::BTreeMap, time::Duration};

use rxr_opkit::{
    logging::{
        conditional_log, context_log, debug_stream, log, marble_log, perf_log, rich_log,
        timestamp_stream,
    },
    subscribe::{Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic},
    Observable, ObservableExt, Observer, Subscribeable,
};
use tracing_subscriber::EnvFilter;

fn ticker(count: u32, every: Duration) -> Observable<u32> {
    Observable::new(move |mut o: Subscriber<u32>| {
        let jh = std::thread::spawn(move || {
            for i in 0..count {
                if o.is_terminated() {
                    break;
                }
                o.next(i);
                std::thread::sleep(every);
            }
            o.complete();
        });
        Subscription::new(UnsubscribeLogic::Nil, SubscriptionHandle::JoinThread(jh))
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Counter logger, then ordinary operators.
    Observable::from_iter(1..=5)
        .pipe(log("numbers"))
        .map(|v| v * 2)
        .filter(|v| *v > 5)
        .subscribe(Subscriber::on_next(|v| println!("received {v}")));

    // Marble diagram of a stream that fails.
    Observable::from_iter(vec!["3", "1", "4", "x", "5"])
        .try_map(|s: &str| s.parse::<i32>())
        .pipe(marble_log("digits", 20)?)
        .subscribe(Subscriber::on_next(|_| {}));

    // Structured context and shape-aware formatting.
    let inventory: Vec<BTreeMap<&str, u32>> = vec![
        BTreeMap::from([("apples", 3), ("pears", 0)]),
        BTreeMap::from([("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 5), ("f", 6)]),
    ];
    Observable::from_iter(inventory)
        .pipe(context_log("inventory", [("store", "north")]))
        .pipe(rich_log("inventory"))
        .subscribe(Subscriber::on_next(|_| {}));

    // Timing of a threaded source, with conditional logging of large values.
    let subscription = ticker(30, Duration::from_millis(5))
        .pipe(timestamp_stream("ticker"))
        .pipe(perf_log("ticker", Some(10))?)
        .pipe(conditional_log("ticker").when(|v: &u32| v % 7 == 0))
        .pipe(debug_stream("ticker"))
        .subscribe(Subscriber::on_next(|_| {}));
    subscription.join()?;

    if let Err(e) = marble_log("invalid", 0) {
        println!("rejected: {e}");
    }
    Ok(())
}
