//! Scoped key/value store over a parent context.

use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;

use super::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::types::Value;

/// A thread-safe string-keyed [`Value`] store layered over a parent
/// context.
///
/// Units of work in a choreography share ambient data through a scoped
/// context: earlier steps `set` values, later steps `get` them. All access
/// goes through a reader/writer lock, so any number of threads may read and
/// write concurrently. Cancellation and deadline queries forward to the
/// parent.
///
/// A missing key is reported as a [`ErrorKind::KeyNotFound`] error, never a
/// silent placeholder; [`get_or`](Self::get_or) supplies a default instead.
///
/// ```
/// use choreo::context::{background, ScopedContext};
/// use std::sync::Arc;
///
/// let ctx = ScopedContext::new(background());
/// ctx.set("request-id", Arc::new(7_u64));
///
/// let id = ctx.get("request-id").unwrap();
/// assert_eq!(id.downcast_ref::<u64>().copied(), Some(7));
/// assert!(ctx.get("missing").is_err());
/// ```
pub struct ScopedContext {
    parent: Arc<dyn Context>,
    values: RwLock<HashMap<String, Value>>,
}

impl ScopedContext {
    /// Creates an empty scoped store over `parent`.
    #[must_use]
    pub fn new(parent: Arc<dyn Context>) -> Self {
        Self {
            parent,
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.values.write().insert(key.into(), value);
    }

    /// Looks up the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::KeyNotFound`], naming the key, when nothing is
    /// stored under it.
    pub fn get(&self, key: &str) -> Result<Value> {
        self.values
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::with_message(ErrorKind::KeyNotFound, key.to_string()))
    }

    /// Looks up `key`, returning `default` when nothing is stored under it.
    #[must_use]
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.values
            .read()
            .get(key)
            .cloned()
            .unwrap_or(default)
    }

    /// Returns true when a value is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.read().contains_key(key)
    }

    /// The number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// True when no values are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl Context for ScopedContext {
    fn deadline(&self) -> Option<Instant> {
        self.parent.deadline()
    }

    fn is_cancelled(&self) -> bool {
        self.parent.is_cancelled()
    }
}

impl fmt::Debug for ScopedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedContext")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{background, CancelContext};

    #[test]
    fn set_then_get_roundtrips() {
        let ctx = ScopedContext::new(background());
        ctx.set("name", Arc::new("ada".to_string()));

        let value = ctx.get("name").expect("key present");
        assert_eq!(
            value.downcast_ref::<String>().map(String::as_str),
            Some("ada")
        );
        assert!(ctx.contains("name"));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn missing_key_names_itself() {
        let ctx = ScopedContext::new(background());
        let err = ctx.get("request-id").expect_err("nothing stored");
        assert_eq!(err.kind(), ErrorKind::KeyNotFound);
        assert_eq!(err.message(), Some("request-id"));
    }

    #[test]
    fn set_overwrites() {
        let ctx = ScopedContext::new(background());
        ctx.set("attempt", Arc::new(1_u32));
        ctx.set("attempt", Arc::new(2_u32));

        let value = ctx.get("attempt").expect("key present");
        assert_eq!(value.downcast_ref::<u32>().copied(), Some(2));
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn get_or_falls_back_to_the_default() {
        let ctx = ScopedContext::new(background());
        let value = ctx.get_or("retries", Arc::new(3_u32));
        assert_eq!(value.downcast_ref::<u32>().copied(), Some(3));

        ctx.set("retries", Arc::new(5_u32));
        let value = ctx.get_or("retries", Arc::new(3_u32));
        assert_eq!(value.downcast_ref::<u32>().copied(), Some(5));
    }

    #[test]
    fn forwards_cancellation_to_the_parent() {
        let parent = Arc::new(CancelContext::new(background()));
        let ctx = ScopedContext::new(Arc::clone(&parent) as Arc<dyn Context>);

        assert!(!ctx.is_cancelled());
        parent.cancel();
        assert!(ctx.is_cancelled());
    }
}
