//! Move-based builder for promises.
//!
//! Each setter takes `self` by value and returns `Self`, so configuration
//! chains naturally and partial state never escapes:
//!
//! ```
//! use choreo::{Outcome, Promise};
//! use std::sync::Arc;
//!
//! let p = Promise::builder()
//!     .label("fetch-user")
//!     .thread_name("fetch-worker")
//!     .arg(Arc::new(42_u64))
//!     .unit(|p, args| {
//!         let user_id = args[0].downcast_ref::<u64>().copied();
//!         p.done(Outcome::from_value(Arc::new(user_id)));
//!     });
//! p.wait();
//! ```

use super::Promise;
use crate::combinator::BatchMode;
use crate::error::Result;
use crate::types::Value;

/// Configures and constructs a [`Promise`].
///
/// Obtained from [`Promise::builder`]. Unit promises are built with
/// [`unit`](Self::unit); batches with [`batch`](Self::batch), which performs
/// the same construction-time validation as [`Promise::batch`].
#[derive(Default)]
pub struct PromiseBuilder {
    label: Option<String>,
    thread_name: Option<String>,
    args: Vec<Value>,
}

impl PromiseBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a diagnostic label, carried in log events and `Debug` output.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Names the worker thread. Defaults to `choreo-<id>`.
    #[must_use]
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = Some(name.into());
        self
    }

    /// Appends one argument for the unit.
    #[must_use]
    pub fn arg(mut self, value: Value) -> Self {
        self.args.push(value);
        self
    }

    /// Appends arguments for the unit, preserving order.
    #[must_use]
    pub fn args(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.args.extend(values);
        self
    }

    /// Builds a unit promise around `unit`.
    pub fn unit<F>(self, unit: F) -> Promise
    where
        F: FnOnce(&Promise, &[Value]) + Send + 'static,
    {
        Promise::from_parts(
            super::Work::Unit {
                unit: parking_lot::Mutex::new(Some(Box::new(unit))),
                args: self.args,
            },
            self.label,
            self.thread_name,
        )
    }

    /// Builds a batch promise. Any configured args are ignored — batches
    /// carry children, not arguments.
    ///
    /// # Errors
    ///
    /// As for [`Promise::batch`]: empty batches and already-running children
    /// are usage errors.
    pub fn batch(self, mode: BatchMode, children: Vec<Promise>) -> Result<Promise> {
        Promise::batch_with_meta(mode, children, self.label, self.thread_name)
    }
}

impl core::fmt::Debug for PromiseBuilder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PromiseBuilder")
            .field("label", &self.label)
            .field("thread_name", &self.thread_name)
            .field("args", &self.args.len())
            .finish()
    }
}
