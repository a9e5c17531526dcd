//! Cancellable, optionally deadline-bearing context layer.

use core::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use super::Context;

/// A context layer that can be cancelled and may carry a deadline.
///
/// Queries combine this layer's state with the parent's: the context is
/// cancelled once *any* layer is, and the effective deadline is the
/// earliest one in the chain.
///
/// ```
/// use choreo::context::{background, CancelContext, Context};
///
/// let ctx = CancelContext::new(background());
/// assert!(!ctx.is_cancelled());
/// ctx.cancel();
/// assert!(ctx.is_cancelled());
/// ```
pub struct CancelContext {
    parent: Arc<dyn Context>,
    cancelled: AtomicBool,
    deadline: Option<Instant>,
}

impl CancelContext {
    /// Creates a cancellable layer over `parent`, with no deadline of its
    /// own.
    #[must_use]
    pub fn new(parent: Arc<dyn Context>) -> Self {
        Self {
            parent,
            cancelled: AtomicBool::new(false),
            deadline: None,
        }
    }

    /// Creates a cancellable layer over `parent` that also expires at
    /// `deadline`.
    #[must_use]
    pub fn with_deadline(parent: Arc<dyn Context>, deadline: Instant) -> Self {
        Self {
            parent,
            cancelled: AtomicBool::new(false),
            deadline: Some(deadline),
        }
    }

    /// Cancels this layer (and thereby everything scoped under it).
    /// Idempotent.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::AcqRel) {
            tracing::debug!("context cancelled");
        }
    }
}

impl Context for CancelContext {
    fn deadline(&self) -> Option<Instant> {
        match (self.deadline, self.parent.deadline()) {
            (Some(own), Some(inherited)) => Some(own.min(inherited)),
            (own, inherited) => own.or(inherited),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
            || self.parent.is_cancelled()
    }
}

impl fmt::Debug for CancelContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelContext")
            .field("cancelled", &self.cancelled.load(Ordering::Acquire))
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}
