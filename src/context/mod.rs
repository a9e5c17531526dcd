//! Contexts: ambient data and cancellation state for chains of work.
//!
//! A [`Context`] answers two questions — is this work cancelled, and by
//! when must it finish. Contexts compose explicitly: each layer holds an
//! `Arc` to its parent and forwards the queries, combining them with its
//! own state. There is no implicit embedding, and there is no nil parent —
//! every context is rooted, by construction, in [`Background`].
//!
//! - [`Background`]: the root; never cancelled, no deadline
//! - [`CancelContext`]: adds a cancel flag and an optional deadline
//! - [`ScopedContext`]: adds a thread-safe string-keyed value store
//!
//! Cancellation here is advisory: units of work observe it by querying the
//! context, nothing interrupts a running unit.

pub mod cancel;
pub mod scoped;

pub use cancel::CancelContext;
pub use scoped::ScopedContext;

use std::sync::Arc;
use std::time::Instant;

/// The queries every context layer answers, usually by forwarding to its
/// parent and combining the answer with its own state.
pub trait Context: Send + Sync {
    /// The earliest deadline in effect, if any layer carries one.
    fn deadline(&self) -> Option<Instant> {
        None
    }

    /// True once any layer has been cancelled or has passed its deadline.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// The root context: never cancelled, no deadline.
#[derive(Debug, Clone, Copy, Default)]
pub struct Background;

impl Context for Background {}

/// Returns the shared root context that every chain hangs off.
#[must_use]
pub fn background() -> Arc<dyn Context> {
    Arc::new(Background)
}
