//! End-to-end choreography tests.
//!
//! These exercise the full promise lifecycle through nested parallel and
//! sequential batches: completion ordering, join semantics, outcome caching,
//! and failure isolation between siblings. Timing-sensitive assertions keep
//! generous gaps between the sleep durations involved.

use choreo::test_utils::init_test_logging;
use choreo::{Error, ErrorKind, Outcome, Promise};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

type CompletionLog = Arc<Mutex<Vec<&'static str>>>;

/// A unit that sleeps, appends its label to the shared log, and completes
/// with its label as the value.
fn sleepy(label: &'static str, delay_ms: u64, log: CompletionLog) -> Promise {
    Promise::builder().label(label).unit(move |p, _args| {
        thread::sleep(Duration::from_millis(delay_ms));
        log.lock().push(label);
        p.done(Outcome::from_value(Arc::new(label)));
    })
}

fn joined(log: &CompletionLog) -> String {
    log.lock().join(",")
}

#[test]
fn nested_choreography_completes_in_expected_order() {
    init_test_logging();
    choreo::test_phase!("nested_choreography");

    let log: CompletionLog = Arc::new(Mutex::new(Vec::new()));

    // Outer parallel batch: two slow units, a pipeline, and an inner
    // parallel pair. Completion times: G ~0, F ~30, C ~120, D ~180, E ~200,
    // B ~250, A ~350.
    let choreography = Promise::parallel(vec![
        sleepy("A", 350, Arc::clone(&log)),
        sleepy("B", 250, Arc::clone(&log)),
        Promise::sequential(vec![
            sleepy("C", 120, Arc::clone(&log)),
            sleepy("D", 60, Arc::clone(&log)),
            sleepy("E", 20, Arc::clone(&log)),
        ])
        .expect("pipeline batch"),
        Promise::parallel(vec![
            sleepy("F", 30, Arc::clone(&log)),
            sleepy("G", 0, Arc::clone(&log)),
        ])
        .expect("inner parallel batch"),
    ])
    .expect("outer batch");

    assert!(choreography.is_not_started());
    choreography.wait();
    assert!(choreography.is_finished());

    let children = choreography.children().expect("outer batch has children");
    assert_eq!(children.len(), 4);
    for child in &children {
        assert!(child.is_finished());
    }

    assert_eq!(joined(&log), "G,F,C,D,E,B,A");
    choreo::test_complete!("nested_choreography");
}

#[test]
fn sequential_batch_follows_construction_order_not_duration_order() {
    init_test_logging();
    let log: CompletionLog = Arc::new(Mutex::new(Vec::new()));

    let batch = Promise::sequential(vec![
        sleepy("A", 120, Arc::clone(&log)),
        sleepy("B", 60, Arc::clone(&log)),
        sleepy("C", 10, Arc::clone(&log)),
    ])
    .expect("three children");

    batch.wait();
    assert_eq!(joined(&log), "A,B,C");
}

#[test]
fn parallel_batch_joins_every_child() {
    init_test_logging();
    let log: CompletionLog = Arc::new(Mutex::new(Vec::new()));

    let batch = Promise::parallel(vec![
        sleepy("slow", 300, Arc::clone(&log)),
        sleepy("fast", 0, Arc::clone(&log)),
    ])
    .expect("two children");

    batch.wait();

    // Both children appended before the batch's wait returned, the fast one
    // first.
    assert_eq!(joined(&log), "fast,slow");
}

#[test]
fn wait_returns_the_cached_outcome_without_rerunning() {
    init_test_logging();
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);

    let p = Promise::new(move |p, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        p.done(Outcome::from_value(Arc::new("once")));
    });

    let first = p.wait();
    let second = p.wait();

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    let read = |o: &Outcome| {
        o.value()
            .and_then(|v| v.downcast_ref::<&str>())
            .copied()
    };
    assert_eq!(read(&first), Some("once"));
    assert_eq!(read(&second), Some("once"));
}

#[test]
fn children_are_returned_in_construction_order() {
    init_test_logging();
    let log: CompletionLog = Arc::new(Mutex::new(Vec::new()));

    let a = sleepy("a", 0, Arc::clone(&log));
    let b = sleepy("b", 0, Arc::clone(&log));
    let ids = [a.id(), b.id()];

    let batch = Promise::parallel(vec![a, b]).expect("two children");
    let children = batch.children().expect("batch children");

    assert_eq!(children.len(), 2);
    assert_eq!([children[0].id(), children[1].id()], ids);

    batch.wait();
}

#[test]
fn child_results_are_read_off_the_children() {
    init_test_logging();
    let log: CompletionLog = Arc::new(Mutex::new(Vec::new()));

    let batch = Promise::parallel(vec![
        sleepy("left", 10, Arc::clone(&log)),
        sleepy("right", 0, Arc::clone(&log)),
    ])
    .expect("two children");

    let outcome = batch.wait();
    assert!(outcome.value().is_none(), "batches aggregate nothing");

    let labels: Vec<&str> = batch
        .children()
        .expect("batch children")
        .iter()
        .filter_map(|child| {
            child
                .result()
                .and_then(|v| v.downcast_ref::<&str>().copied())
        })
        .collect();
    assert_eq!(labels, vec!["left", "right"]);
}

#[test]
fn failing_child_does_not_disturb_its_siblings() {
    init_test_logging();
    let log: CompletionLog = Arc::new(Mutex::new(Vec::new()));

    let ok = sleepy("ok", 20, Arc::clone(&log));
    let failing = Promise::builder().label("failing").unit(|p, _| {
        p.done(Outcome::from_error(Error::user("flaky dependency")));
    });
    let failing_probe = failing.clone();

    let batch = Promise::parallel(vec![failing, ok]).expect("two children");
    let outcome = batch.wait();

    // The batch itself completes empty; the failure stays on the child.
    assert!(outcome.error().is_none());
    assert_eq!(joined(&log), "ok");

    let err = failing_probe.error().expect("child error recorded");
    assert_eq!(err.kind(), ErrorKind::User);
    assert_eq!(err.message(), Some("flaky dependency"));
}

#[test]
fn deep_nesting_keeps_pipeline_order() {
    init_test_logging();
    let log: CompletionLog = Arc::new(Mutex::new(Vec::new()));

    // A pipeline whose middle stage is itself a parallel pair.
    let batch = Promise::sequential(vec![
        sleepy("first", 10, Arc::clone(&log)),
        Promise::parallel(vec![
            sleepy("mid-slow", 60, Arc::clone(&log)),
            sleepy("mid-fast", 0, Arc::clone(&log)),
        ])
        .expect("middle stage"),
        sleepy("last", 0, Arc::clone(&log)),
    ])
    .expect("pipeline");

    batch.wait();

    // The middle pair may finish in either order internally, but the stage
    // boundaries must hold.
    let order = log.lock().clone();
    assert_eq!(order.first(), Some(&"first"));
    assert_eq!(order.last(), Some(&"last"));
    assert_eq!(order.len(), 4);
}

#[test]
fn then_observes_the_completion_of_a_choreography() {
    init_test_logging();
    let log: CompletionLog = Arc::new(Mutex::new(Vec::new()));
    let observed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&observed);

    let batch = Promise::sequential(vec![sleepy("only", 10, Arc::clone(&log))])
        .expect("one child");
    batch.then(move |outcome| {
        assert!(outcome.is_ok());
        counter.fetch_add(1, Ordering::SeqCst);
    });

    batch.wait();
    assert_eq!(observed.load(Ordering::SeqCst), 1);
}
