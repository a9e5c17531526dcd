//! Batch drivers: parallel fan-out/join and sequential pipelines.
//!
//! A batch promise drives its children under one of two disciplines:
//!
//! - [`BatchMode::Parallel`]: start every child, wait for all of them —
//!   completion order is whatever the children's durations dictate
//! - [`BatchMode::Sequential`]: wait on each child in construction order —
//!   child *i+1* never starts before child *i* has fully finished
//!
//! Batches nest freely: a child of a parallel batch may itself be a
//! sequential batch, and so on. Either way the batch completes with an
//! empty outcome; results live on the children, reachable through
//! [`crate::Promise::children`].
//!
//! # Failure isolation
//!
//! A child that completes with an error stays an ordinary completion:
//! siblings keep running and the batch still finishes empty. Nothing stops
//! or propagates — failure is per-promise.
//!
//! # Scalability
//!
//! Every started child occupies its own OS thread, so a parallel batch with
//! thousands of children means thousands of threads. There is no worker
//! pool; that is a known limit of the thread-per-promise model, not
//! something these drivers mitigate.

pub(crate) mod parallel;
pub(crate) mod sequential;

use core::fmt;

/// The discipline a batch drives its children under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchMode {
    /// Fan-out/join: all children run concurrently; the batch finishes when
    /// every child has finished.
    Parallel,
    /// Pipeline: children run strictly one after another, in construction
    /// order.
    Sequential,
}

impl BatchMode {
    /// Returns a human-readable name for the mode.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Parallel => "parallel",
            Self::Sequential => "sequential",
        }
    }
}

impl fmt::Display for BatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
