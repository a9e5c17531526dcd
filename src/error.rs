//! Error types and error handling strategy for Choreo.
//!
//! Errors fall into two tiers:
//!
//! - **Reported errors** are data-level failures that flow through the normal
//!   channels: a unit failing its promise, a context lookup missing a key, a
//!   worker thread that could not be spawned.
//! - **Usage errors** are programmer errors caught at construction time —
//!   an empty batch, a child that is already running. They are returned from
//!   constructors rather than aborting the process, so callers can handle
//!   them like any other error.
//!
//! All errors are explicit and typed; there are no stringly-typed errors.
//! [`ErrorKind::category`] maps each kind to its tier.

use core::fmt;
use std::sync::Arc;

/// Convenience alias for results carrying a Choreo [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// The kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // === Batch composition ===
    /// `children()` was called on a promise that is not a batch.
    NotABatch,
    /// A batch was constructed with zero children.
    EmptyBatch,
    /// A batch was constructed with a child that is already running.
    ChildAlreadyRunning,

    // === Context ===
    /// A context lookup found no value for the key.
    KeyNotFound,

    // === Execution ===
    /// The worker thread for a promise could not be spawned.
    SpawnFailed,

    // === User ===
    /// A failure reported by a unit of work.
    User,
}

impl ErrorKind {
    /// Returns the error category for this kind.
    #[must_use]
    pub const fn category(self) -> ErrorCategory {
        match self {
            Self::NotABatch => ErrorCategory::Batch,
            Self::EmptyBatch | Self::ChildAlreadyRunning => ErrorCategory::Usage,
            Self::KeyNotFound => ErrorCategory::Context,
            Self::SpawnFailed => ErrorCategory::Execution,
            Self::User => ErrorCategory::User,
        }
    }

    /// Returns true for programmer errors surfaced at construction time.
    #[must_use]
    pub const fn is_usage(self) -> bool {
        matches!(self.category(), ErrorCategory::Usage)
    }

    /// Returns a short static description of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotABatch => "not a batch",
            Self::EmptyBatch => "batch has no children",
            Self::ChildAlreadyRunning => "batch child is already running",
            Self::KeyNotFound => "key not found",
            Self::SpawnFailed => "failed to spawn worker thread",
            Self::User => "unit reported an error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// High-level error category for grouping related kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Batch-shape failures reported through the normal channels.
    Batch,
    /// Programmer errors caught at construction time.
    Usage,
    /// Context value-store failures.
    Context,
    /// Failures while scheduling a unit of work.
    Execution,
    /// Failures reported by units of work.
    User,
}

/// The error type used throughout Choreo.
///
/// Errors are cheap to clone; the optional message and source are
/// reference-counted so one error can be observed by every waiter of a
/// promise.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: Option<Arc<str>>,
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Creates an error of the given kind with no message.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Creates an error of the given kind with a message.
    #[must_use]
    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(Arc::from(message.into())),
            source: None,
        }
    }

    /// Creates a user error with a message. This is the usual way for a unit
    /// of work to report failure.
    #[must_use]
    pub fn user(message: impl Into<String>) -> Self {
        Self::with_message(ErrorKind::User, message)
    }

    /// Wraps a foreign error as a user error, preserving it as the source.
    #[must_use]
    pub fn wrap<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            kind: ErrorKind::User,
            message: None,
            source: Some(Arc::new(source)),
        }
    }

    /// The kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The category of this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// The attached message, when one was supplied.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.message, &self.source) {
            (Some(message), _) => write!(f, "{}: {message}", self.kind),
            (None, Some(source)) => write!(f, "{}: {source}", self.kind),
            (None, None) => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn std::error::Error + 'static))
    }
}
