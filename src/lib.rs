//! Choreo: deferred-execution promises with parallel and sequential choreography.
//!
//! # Overview
//!
//! Choreo is built around a single one-shot primitive, the [`Promise`]: a unit
//! of work that runs on its own worker thread and completes exactly once.
//! Callers can block on the outcome, register completion callbacks, or compose
//! promises into batches that run their children in parallel (fan-out/join) or
//! in strict sequence (pipeline). A thread-safe [`ScopedContext`] carries
//! string-keyed values through a chain of units of work, layered over a
//! cancellable parent context.
//!
//! # Core Guarantees
//!
//! - **One-shot completion**: a promise finishes exactly once; the outcome is
//!   immutable afterwards and every observer sees the same value
//! - **No double starts**: the not-started → pending transition is a single
//!   atomic compare-and-swap; exactly one thread runs the unit body
//! - **Ordered pipelines**: in a sequential batch, child *i+1* never starts
//!   before child *i* has fully finished
//! - **Complete joins**: a parallel batch finishes only after every child has
//!   finished, regardless of the order in which they do
//! - **Misuse is an error, not an abort**: malformed batches are rejected at
//!   construction with a usage-category [`Error`]
//!
//! # Module Structure
//!
//! - [`promise`]: The one-shot deferred-execution primitive
//! - [`combinator`]: Parallel and sequential batch drivers
//! - [`context`]: Scoped key/value store over a cancellable parent context
//! - [`sync`]: Blocking gate and latch primitives under the promise
//! - [`types`]: Payload, status, and completion-record types
//! - [`error`]: Error types
//!
//! # Example
//!
//! ```
//! use choreo::{Outcome, Promise};
//! use std::sync::Arc;
//!
//! let p = Promise::new(|p, _args| {
//!     p.done(Outcome::from_value(Arc::new(6 * 7)));
//! });
//!
//! let outcome = p.wait();
//! let answer = outcome.value().and_then(|v| v.downcast_ref::<i32>().copied());
//! assert_eq!(answer, Some(42));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

pub mod combinator;
pub mod context;
pub mod error;
pub mod promise;
pub mod sync;
pub mod test_utils;
pub mod types;

pub use combinator::BatchMode;
pub use context::{background, Background, CancelContext, Context, ScopedContext};
pub use error::{Error, ErrorCategory, ErrorKind, Result};
pub use promise::{Promise, PromiseBuilder};
pub use types::{Outcome, Status, Value};
