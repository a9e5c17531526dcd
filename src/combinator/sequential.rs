//! Sequential driver: a strict pipeline over the children.
//!
//! The driver waits on each child in construction order. `wait` starts a
//! not-started child and blocks until it finishes, so child *i+1* cannot
//! begin before child *i* is fully finished — a total order, independent of
//! the children's individual durations.

use crate::promise::Promise;
use crate::types::Outcome;

/// Drives `children` to completion one after another, then completes `batch`.
pub(crate) fn run(batch: &Promise, children: &[Promise]) {
    for (index, child) in children.iter().enumerate() {
        tracing::trace!(
            batch = batch.id(),
            child = child.id(),
            index,
            "pipeline waiting for child"
        );
        child.wait();
    }

    tracing::debug!(
        batch = batch.id(),
        children = children.len(),
        "pipeline drained"
    );
    batch.done(Outcome::empty());
}
