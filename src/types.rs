//! Core types: the opaque payload, the promise status, and the completion record.

use core::fmt;
use std::any::Any;
use std::sync::Arc;

use crate::error::Error;

/// The opaque payload carried by promise results and context values.
///
/// Payloads are reference-counted so that one completion can be observed by
/// any number of waiters and callbacks. Downcast with [`Any::downcast_ref`]:
///
/// ```
/// use choreo::types::Value;
/// use std::sync::Arc;
///
/// let v: Value = Arc::new("hello".to_string());
/// assert_eq!(v.downcast_ref::<String>().map(String::as_str), Some("hello"));
/// ```
pub type Value = Arc<dyn Any + Send + Sync>;

/// Execution state of a promise.
///
/// The state advances `NotStarted` → `Pending` → `Finished`, each transition
/// at most once, and never regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Status {
    /// Constructed, not yet scheduled.
    NotStarted = 0,
    /// The unit is running on its worker thread.
    Pending = 1,
    /// The unit reported completion; the outcome is immutable.
    Finished = 2,
}

impl Status {
    /// Decodes a status from its atomic byte representation.
    ///
    /// Unknown bytes decode to `NotStarted`; the status field is only ever
    /// written with the three valid discriminants.
    #[must_use]
    pub(crate) const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Pending,
            2 => Self::Finished,
            _ => Self::NotStarted,
        }
    }

    /// Returns a human-readable name for the status.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::Pending => "pending",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The typed completion record of a promise.
///
/// An outcome holds exactly two possibly-absent slots: a value and an error.
/// A unit reports success with a value, failure with an error, or — for
/// batches, which aggregate nothing — neither. Both slots present is legal
/// (a partial result alongside a failure) but unusual.
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    value: Option<Value>,
    error: Option<Error>,
}

impl Outcome {
    /// An outcome with both slots absent. Batches complete with this.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A successful outcome carrying `value`.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        Self {
            value: Some(value),
            error: None,
        }
    }

    /// A failed outcome carrying `error`.
    #[must_use]
    pub fn from_error(error: Error) -> Self {
        Self {
            value: None,
            error: Some(error),
        }
    }

    /// An outcome with both slots supplied explicitly.
    #[must_use]
    pub const fn new(value: Option<Value>, error: Option<Error>) -> Self {
        Self { value, error }
    }

    /// The value slot.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// The error slot.
    #[must_use]
    pub const fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Returns true when no error was reported.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Converts the record into a `Result`, with the error slot winning when
    /// both are present.
    ///
    /// # Errors
    ///
    /// Returns the error slot when one was reported.
    pub fn into_result(self) -> Result<Option<Value>, Error> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.value),
        }
    }
}
