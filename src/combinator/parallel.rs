//! Parallel driver: run every child concurrently, join on all of them.
//!
//! Each child gets a completion callback that counts down a shared latch;
//! the children are then started and the driver blocks until the latch
//! trips. A child that is already finished fires its callback during
//! registration, so it counts immediately; a child started elsewhere in the
//! meantime is harmless — `start` is idempotent and the join counts
//! completions, not starts.
//!
//! Each child's completion happens-before the batch's own completion.

use std::sync::Arc;

use crate::promise::Promise;
use crate::sync::Latch;
use crate::types::Outcome;

/// Drives `children` to completion concurrently, then completes `batch`.
pub(crate) fn run(batch: &Promise, children: &[Promise]) {
    let join = Arc::new(Latch::new(children.len()));

    for child in children {
        let arrivals = Arc::clone(&join);
        child.then(move |_| arrivals.count_down());
        child.start();
    }

    tracing::debug!(
        batch = batch.id(),
        children = children.len(),
        "parallel batch waiting for children"
    );
    join.wait();

    tracing::debug!(batch = batch.id(), "parallel batch joined");
    batch.done(Outcome::empty());
}

#[cfg(test)]
mod tests {
    use crate::test_utils::init_test_logging;
    use crate::{Outcome, Promise};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn sleepy(label: &'static str, delay: Duration, log: Arc<Mutex<Vec<&'static str>>>) -> Promise {
        Promise::new(move |p, _| {
            thread::sleep(delay);
            log.lock().push(label);
            p.done(Outcome::empty());
        })
    }

    #[test]
    fn children_complete_in_duration_order() {
        init_test_logging();
        let log = Arc::new(Mutex::new(Vec::new()));

        let batch = Promise::parallel(vec![
            sleepy("slow", Duration::from_millis(150), Arc::clone(&log)),
            sleepy("fast", Duration::from_millis(0), Arc::clone(&log)),
        ])
        .expect("two children");

        batch.wait();

        let order = log.lock().clone();
        assert_eq!(order, vec!["fast", "slow"]);
    }

    #[test]
    fn batch_does_not_finish_before_every_child() {
        init_test_logging();
        let log = Arc::new(Mutex::new(Vec::new()));

        let children = vec![
            sleepy("a", Duration::from_millis(60), Arc::clone(&log)),
            sleepy("b", Duration::from_millis(20), Arc::clone(&log)),
            sleepy("c", Duration::from_millis(40), Arc::clone(&log)),
        ];
        let batch = Promise::parallel(children).expect("three children");

        batch.wait();

        assert_eq!(log.lock().len(), 3);
        for child in batch.children().expect("batch has children") {
            assert!(child.is_finished());
        }
    }

    #[test]
    fn batch_completes_empty() {
        init_test_logging();
        let child = Promise::new(|p, _| p.done(Outcome::from_value(Arc::new(1_i32))));
        let batch = Promise::parallel(vec![child]).expect("one child");

        let outcome = batch.wait();
        assert!(outcome.value().is_none());
        assert!(outcome.error().is_none());
    }
}
