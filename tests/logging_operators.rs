mod common;

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use common::{failing_at, spaced_on, InjectedError, Notification, Recorder};
use rxr_opkit::{
    clock::ManualClock,
    logging::{
        conditional_log, context_log, debug_stream_with, log, marble_log, perf_log, rich_log,
        timestamp_stream_with, PerfStatus,
    },
    operator::{Emitter, Handler, Operator},
    sink::{FieldValue, Level, LogSink, MemorySink},
    subscribe::Subscriber,
    BoxError, Observable, ObservableExt, Subscribeable,
};

fn sink_arc(sink: &MemorySink) -> Arc<dyn LogSink> {
    Arc::new(sink.clone())
}

/// Every logger forwards values, in order and unchanged, and then exactly one
/// terminal notification.
#[test]
fn every_logger_is_an_identity() {
    let sink = MemorySink::new();
    let input: Vec<i64> = vec![4, -2, 0, 17, 9, -30];

    let rec = Recorder::new();
    Observable::from_iter(input.clone())
        .pipe(log("counter").with_sink(sink.clone()))
        .pipe(marble_log("marble", 4).expect("width").with_sink(sink.clone()))
        .pipe(context_log("ctx", [("k", "v")]).with_sink(sink.clone()))
        .pipe(rich_log("rich").with_sink(sink.clone()))
        .pipe(perf_log("perf", Some(2)).expect("interval").with_sink(sink.clone()))
        .pipe(conditional_log("cond").when(|v: &i64| *v > 0).with_sink(sink.clone()))
        .pipe(debug_stream_with("dbg", sink_arc(&sink)))
        .pipe(timestamp_stream_with(
            "ts",
            sink_arc(&sink),
            Arc::new(ManualClock::new()),
        ))
        .subscribe(rec.subscriber());

    let mut expected: Vec<_> = input.into_iter().map(Notification::Next).collect();
    expected.push(Notification::Completed);
    assert_eq!(rec.notifications(), expected);
    assert!(!sink.is_empty());
}

#[test]
fn every_logger_forwards_the_original_error_once() {
    let sink = MemorySink::new();
    let rec = Recorder::new();

    failing_at(3, 5)
        .pipe(log("counter").with_sink(sink.clone()))
        .pipe(marble_log("marble", 8).expect("width").with_sink(sink.clone()))
        .pipe(context_log("ctx", Vec::<(String, i64)>::new()).with_sink(sink.clone()))
        .pipe(rich_log("rich").colorize(false).with_sink(sink.clone()))
        .pipe(perf_log("perf", None).expect("no interval").with_sink(sink.clone()))
        .pipe(conditional_log("cond").with_sink(sink.clone()))
        .subscribe(rec.subscriber());

    assert_eq!(
        rec.notifications(),
        vec![
            Notification::Next(1),
            Notification::Next(2),
            Notification::Error {
                kind: "InjectedError".to_string(),
                message: "value 3 rejected".to_string(),
            },
        ]
    );

    let error_lines: Vec<String> = sink
        .at_least(Level::Error)
        .into_iter()
        .map(|r| r.message)
        .collect();
    assert_eq!(
        error_lines,
        vec![
            "[counter] Error: InjectedError: value 3 rejected",
            "Error: value 3 rejected",
            "[rich] ERROR: InjectedError: value 3 rejected",
            "Error: InjectedError: value 3 rejected",
        ]
    );
    assert!(sink.messages().iter().any(|m| m.starts_with("PERF [ERROR]: 2 events")));
}

#[test]
fn loggers_before_a_failing_stage_stop_with_the_source() {
    let sink = MemorySink::new();
    let rec = Recorder::new();

    Observable::from_iter(0u32..200_000)
        .pipe(log("up").with_sink(sink.clone()))
        .try_map(|v: u32| {
            if v < 3 {
                Ok(v)
            } else {
                Err(InjectedError(format!("{v} is too large")))
            }
        })
        .subscribe(rec.subscriber());

    assert_eq!(
        sink.messages(),
        vec![
            "[up] [1] Value: 0",
            "[up] [2] Value: 1",
            "[up] [3] Value: 2",
            "[up] [4] Value: 3",
        ]
    );
    assert_eq!(rec.values(), vec![0, 1, 2]);
    assert_eq!(rec.terminals(), 1);
}

#[test]
fn counter_reports_the_number_of_values() {
    let sink = MemorySink::new();
    Observable::from_iter(0..42u16)
        .pipe(log("n").log_values(false).with_sink(sink.clone()))
        .subscribe(Subscriber::on_next(|_| {}));

    assert_eq!(sink.messages(), vec!["[n] Completed after 42 values"]);
}

#[test]
fn failing_formatter_does_not_touch_the_stream() {
    let sink = MemorySink::new();
    let rec = Recorder::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_c = Arc::clone(&calls);

    Observable::from_iter(vec![1, 2, 3, 4])
        .pipe(
            log("fmt")
                .with_formatter(move |v: &i32| -> Result<String, BoxError> {
                    calls_c.fetch_add(1, Ordering::SeqCst);
                    match v {
                        2 => Err("two is not printable".into()),
                        3 => panic!("formatter bug"),
                        _ => Ok(format!("<{v}>")),
                    }
                })
                .with_sink(sink.clone()),
        )
        .subscribe(rec.subscriber());

    assert_eq!(rec.values(), vec![1, 2, 3, 4]);
    assert_eq!(rec.notifications().last(), Some(&Notification::Completed));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert_eq!(
        sink.at_least(Level::Info)
            .into_iter()
            .map(|r| r.message)
            .collect::<Vec<_>>(),
        vec![
            "[fmt] [1] Value: <1>",
            "[fmt] [4] Value: <4>",
            "[fmt] Completed after 4 values",
        ]
    );
    assert_eq!(sink.records().iter().filter(|r| r.level == Level::Debug).count(), 2);
}

#[test]
fn default_formatter_summarizes_collections() {
    let sink = MemorySink::new();
    let big: BTreeMap<u32, u32> = (0..9).map(|i| (i, i * i)).collect();
    Observable::from_iter(vec![big])
        .pipe(log("maps").with_sink(sink.clone()))
        .subscribe(Subscriber::on_next(|_| {}));

    assert_eq!(
        sink.messages()[0],
        "[maps] [1] Value: {0: 0, 1: 1, 2: 4, 3: 9, 4: 16} ... (4 more, 9 items)"
    );
}

/// After `K >= W` events the timeline is exactly `W` wide and the latest event
/// sits at column `(K - 1) % W`.
#[test]
fn marble_timeline_wraps_at_its_width() {
    const WIDTH: usize = 7;
    let sink = MemorySink::new();
    let input: Vec<i32> = (0..20).map(|i| i % 10).collect();

    Observable::from_iter(input.clone())
        .pipe(marble_log("wrap", WIDTH).expect("width").with_sink(sink.clone()))
        .subscribe(Subscriber::on_next(|_| {}));

    let lines = sink.messages();
    // START line, one line per value, completion line.
    assert_eq!(lines.len(), input.len() + 2);

    for (k, line) in lines.iter().enumerate().skip(1) {
        let timeline: Vec<char> = line
            .split_once(": ")
            .map(|(_, rest)| rest.chars().take(WIDTH).collect())
            .expect("label separator");
        assert_eq!(timeline.len(), WIDTH);

        let latest = if k <= input.len() {
            char::from_digit(input[k - 1] as u32, 10).expect("single digit")
        } else {
            '|'
        };
        assert_eq!(timeline[(k - 1) % WIDTH], latest, "line {k}: {line}");
        if k >= WIDTH {
            assert!(!timeline.contains(&'-'), "line {k} should be full: {line}");
        }
    }
    assert!(lines[lines.len() - 1].ends_with(" (COMPLETED)"));
}

#[test]
fn marble_renders_text_and_other_values() {
    let sink = MemorySink::new();
    Observable::from_iter(vec!["alpha", "", "beta"])
        .pipe(marble_log("txt", 5).expect("width").with_sink(sink.clone()))
        .subscribe(Subscriber::on_next(|_| {}));

    assert_eq!(
        sink.messages().last().map(String::as_str),
        Some("            txt: A•B|- (COMPLETED)")
    );
}

#[test]
fn performance_mean_interval_matches_the_delay() {
    let sink = MemorySink::new();
    let clock = ManualClock::new();

    spaced_on(&clock, 11, Duration::from_millis(25))
        .pipe(
            perf_log("perf", None)
                .expect("no interval")
                .with_clock(clock.clone())
                .with_sink(sink.clone()),
        )
        .subscribe(Subscriber::on_next(|_| {}));

    let records = sink.records();
    assert_eq!(records.len(), 1);
    let final_stats = &records[0];
    let field = |k: &str| final_stats.field(k).and_then(FieldValue::as_f64);

    assert_eq!(final_stats.field("status"), Some(&FieldValue::from("COMPLETED")));
    assert_eq!(final_stats.field("events").and_then(FieldValue::as_u64), Some(11));
    assert_eq!(field("avg_interval_ms"), Some(25.0));
    assert_eq!(field("min_interval_ms"), Some(25.0));
    assert_eq!(field("max_interval_ms"), Some(25.0));
    assert_eq!(field("total_time_sec"), Some(0.25));
    assert_eq!(field("events_per_sec"), Some(44.0));
}

#[test]
fn performance_state_resets_after_terminal() {
    let clock = ManualClock::new();
    let logger = perf_log("perf", None)
        .expect("no interval")
        .with_clock(clock.clone())
        .with_sink(MemorySink::new());
    let mut handler = Operator::<u8>::handler(&logger);
    let mut downstream = Subscriber::on_next(|_: u8| {});

    let mut emitter = Emitter::new(&mut downstream);
    for v in 0..3 {
        clock.advance(Duration::from_millis(10));
        Handler::<u8>::on_next(&mut handler, v, &mut emitter);
    }
    assert_eq!(handler.get_ref().count(), 3);
    assert_eq!(handler.get_ref().intervals().len(), 2);

    Handler::<u8>::on_completed(&mut handler);
    Handler::<u8>::on_terminated(&mut handler);

    assert_eq!(handler.get_ref().count(), 0);
    assert!(handler.get_ref().intervals().is_empty());
    assert_eq!(handler.get_ref().stats(PerfStatus::Completed), None);
}

#[test]
fn conditional_counts_values_above_threshold() {
    let threshold = 10;
    let input = vec![3, 14, 10, 27, 8, 11, 2, 30];
    let expected_logged = input.iter().filter(|v| **v > threshold).count();

    let sink = MemorySink::new();
    let rec = Recorder::new();
    Observable::from_iter(input.clone())
        .pipe(
            conditional_log("threshold")
                .when(move |v: &i32| *v > threshold)
                .with_sink(sink.clone()),
        )
        .subscribe(rec.subscriber());

    assert_eq!(rec.values(), input);

    let records = sink.records();
    let value_lines = records.iter().filter(|r| r.message.starts_with("Value: ")).count();
    assert_eq!(value_lines, expected_logged);

    let summary = records.last().expect("summary record");
    assert_eq!(summary.message, "Completed. Logged 4/8 values (50.0%)");
    assert_eq!(
        summary.field("logged").and_then(FieldValue::as_u64),
        Some(expected_logged as u64)
    );
    assert_eq!(summary.field("total").and_then(FieldValue::as_u64), Some(8));
    assert_eq!(
        summary.field("ratio").and_then(FieldValue::as_f64),
        Some(expected_logged as f64 / input.len() as f64)
    );
}

#[test]
fn each_subscription_starts_from_zero() {
    let sink = MemorySink::new();
    let mut observable =
        Observable::from_iter(vec!['a', 'b']).pipe(log("twice").with_sink(sink.clone()));

    observable.subscribe(Subscriber::on_next(|_| {}));
    observable.subscribe(Subscriber::on_next(|_| {}));

    assert_eq!(
        sink.messages(),
        vec![
            "[twice] [1] Value: a",
            "[twice] [2] Value: b",
            "[twice] Completed after 2 values",
            "[twice] [1] Value: a",
            "[twice] [2] Value: b",
            "[twice] Completed after 2 values",
        ]
    );
}
