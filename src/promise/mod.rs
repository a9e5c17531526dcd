//! The one-shot deferred-execution primitive.
//!
//! A [`Promise`] wraps a unit of work and runs it on a dedicated worker
//! thread. The unit receives a handle to its own promise and reports
//! completion through [`Promise::done`]; any number of observers can block on
//! [`Promise::wait`] or register callbacks with [`Promise::then`].
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       PROMISE LIFECYCLE                          │
//! │                                                                  │
//! │   NotStarted ── start() ──► Pending ── done() ──► Finished       │
//! │       │        (CAS, one    │  unit runs on its     │            │
//! │       │         winner)     │  worker thread        │            │
//! │       │                     │                       │            │
//! │   wait() starts it      waiters block           gate opens,      │
//! │   and blocks            on the gate             callbacks fire,  │
//! │                                                 outcome cached   │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Completion discipline
//!
//! The outcome is written exactly once, before the completion gate opens;
//! observers read it only after the gate, which establishes the
//! happens-before edge. The first `done` call wins — later calls are no-ops
//! logged at warn level. The not-started → pending edge is a compare-and-
//! swap, so two racing `start` calls launch exactly one worker.
//!
//! # Batches
//!
//! A promise is either a **unit** promise (wrapping a caller-supplied
//! closure and its arguments) or a **batch** promise (wrapping child
//! promises and a [`BatchMode`]). The distinction is fixed at construction;
//! [`Promise::children`] is only valid on batches. Batch drivers live in
//! [`crate::combinator`].

use core::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;

use parking_lot::Mutex;

use crate::combinator::{self, BatchMode};
use crate::error::{Error, ErrorKind, Result};
use crate::sync::Gate;
use crate::types::{Outcome, Status, Value};

mod builder;

pub use builder::PromiseBuilder;

/// A caller-supplied unit of work, boxed for storage inside a promise.
///
/// The unit receives a handle to its own promise and the arguments the
/// promise was constructed with, and must report completion through
/// [`Promise::done`]. A unit that returns without calling `done` leaves its
/// waiters blocked; that contract is the caller's to uphold.
pub type UnitFn = Box<dyn FnOnce(&Promise, &[Value]) + Send + 'static>;

type CompletionFn = Box<dyn FnOnce(&Outcome) + Send + 'static>;

static NEXT_PROMISE_ID: AtomicU64 = AtomicU64::new(1);

/// The work a promise was constructed around.
///
/// The tag is fixed at construction: a unit promise can never be observed as
/// a batch, and vice versa.
enum Work {
    Unit {
        unit: Mutex<Option<UnitFn>>,
        args: Vec<Value>,
    },
    Batch {
        mode: BatchMode,
        children: Vec<Promise>,
    },
}

struct Inner {
    id: u64,
    label: Option<String>,
    thread_name: Option<String>,
    work: Work,
    status: AtomicU8,
    outcome: OnceLock<Outcome>,
    gate: Gate,
    callbacks: Mutex<Vec<CompletionFn>>,
}

/// The one-shot deferred-execution primitive.
///
/// `Promise` is a cheap-to-clone handle; clones share the same underlying
/// state, and a unit of work receives one as its self-handle. See the
/// [module docs](self) for the lifecycle and completion discipline.
#[derive(Clone)]
pub struct Promise {
    inner: Arc<Inner>,
}

impl Promise {
    /// Creates a unit promise with no arguments. Runs nothing until
    /// [`start`](Self::start) or [`wait`](Self::wait).
    pub fn new<F>(unit: F) -> Self
    where
        F: FnOnce(&Self, &[Value]) + Send + 'static,
    {
        Self::with_args(unit, Vec::new())
    }

    /// Creates a unit promise whose unit will receive `args`.
    ///
    /// The arguments are fixed at construction and handed to the unit as a
    /// slice, in order, when the promise starts.
    pub fn with_args<F>(unit: F, args: Vec<Value>) -> Self
    where
        F: FnOnce(&Self, &[Value]) + Send + 'static,
    {
        Self::from_parts(
            Work::Unit {
                unit: Mutex::new(Some(Box::new(unit))),
                args,
            },
            None,
            None,
        )
    }

    /// Returns a builder for promises that need a label, a worker-thread
    /// name, or arguments.
    #[must_use]
    pub fn builder() -> PromiseBuilder {
        PromiseBuilder::new()
    }

    /// Creates a batch promise that drives `children` under `mode`.
    ///
    /// The children are held in construction order; [`children`](Self::children)
    /// returns handles to them. The batch itself completes with an empty
    /// outcome — it aggregates nothing, and callers read results off the
    /// children directly.
    ///
    /// # Errors
    ///
    /// Returns a usage-category error when `children` is empty
    /// ([`ErrorKind::EmptyBatch`]) or when a child is already running
    /// ([`ErrorKind::ChildAlreadyRunning`]). Children that are already
    /// finished are fine: their completion callbacks fire immediately.
    pub fn batch(mode: BatchMode, children: Vec<Self>) -> Result<Self> {
        Self::batch_with_meta(mode, children, None, None)
    }

    /// Creates a parallel (fan-out/join) batch. See [`batch`](Self::batch).
    ///
    /// # Errors
    ///
    /// As for [`batch`](Self::batch).
    pub fn parallel(children: Vec<Self>) -> Result<Self> {
        Self::batch(BatchMode::Parallel, children)
    }

    /// Creates a sequential (pipeline) batch. See [`batch`](Self::batch).
    ///
    /// # Errors
    ///
    /// As for [`batch`](Self::batch).
    pub fn sequential(children: Vec<Self>) -> Result<Self> {
        Self::batch(BatchMode::Sequential, children)
    }

    fn batch_with_meta(
        mode: BatchMode,
        children: Vec<Self>,
        label: Option<String>,
        thread_name: Option<String>,
    ) -> Result<Self> {
        if children.is_empty() {
            return Err(Error::new(ErrorKind::EmptyBatch));
        }
        for child in &children {
            if child.is_pending() {
                return Err(Error::with_message(
                    ErrorKind::ChildAlreadyRunning,
                    format!("child promise {} is already running", child.id()),
                ));
            }
        }
        Ok(Self::from_parts(
            Work::Batch { mode, children },
            label,
            thread_name,
        ))
    }

    fn from_parts(
        work: Work,
        label: Option<String>,
        thread_name: Option<String>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                id: NEXT_PROMISE_ID.fetch_add(1, Ordering::Relaxed),
                label,
                thread_name,
                work,
                status: AtomicU8::new(Status::NotStarted as u8),
                outcome: OnceLock::new(),
                gate: Gate::new(),
                callbacks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Starts the promise on its own worker thread.
    ///
    /// Idempotent: only the first call (across all threads) launches the
    /// unit; the not-started → pending edge is a compare-and-swap and every
    /// loser returns silently.
    ///
    /// If the OS refuses to spawn the worker thread, the promise completes
    /// immediately with a [`ErrorKind::SpawnFailed`] error instead of
    /// wedging its waiters.
    pub fn start(&self) {
        if self
            .inner
            .status
            .compare_exchange(
                Status::NotStarted as u8,
                Status::Pending as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return;
        }

        tracing::trace!(
            promise = self.inner.id,
            label = self.inner.label.as_deref(),
            batch = self.is_batch(),
            "promise started"
        );

        let name = self
            .inner
            .thread_name
            .clone()
            .unwrap_or_else(|| format!("choreo-{}", self.inner.id));
        let worker = self.clone();
        if let Err(spawn_err) = thread::Builder::new().name(name).spawn(move || worker.run()) {
            tracing::error!(
                promise = self.inner.id,
                error = %spawn_err,
                "failed to spawn worker thread"
            );
            self.done(Outcome::from_error(Error::with_message(
                ErrorKind::SpawnFailed,
                spawn_err.to_string(),
            )));
        }
    }

    /// Worker-thread entry point.
    fn run(&self) {
        match &self.inner.work {
            Work::Unit { unit, args } => {
                // The CAS in start() guarantees a single winner, so the slot
                // is only ever taken once.
                let Some(unit) = unit.lock().take() else {
                    return;
                };
                unit(self, args);
            }
            Work::Batch { mode, children } => match mode {
                BatchMode::Parallel => combinator::parallel::run(self, children),
                BatchMode::Sequential => combinator::sequential::run(self, children),
            },
        }
    }

    /// Reports completion. Called by the unit body, at most once.
    ///
    /// Stores the outcome, transitions to finished, opens the completion
    /// gate, then invokes the registered callbacks synchronously, in
    /// registration order, on the calling thread.
    ///
    /// The first call wins. Later calls leave the stored outcome untouched
    /// and are logged at warn level.
    pub fn done(&self, outcome: Outcome) {
        let snapshot = outcome.clone();
        if self.inner.outcome.set(outcome).is_err() {
            tracing::warn!(
                promise = self.inner.id,
                "done called on an already-finished promise; keeping the first outcome"
            );
            return;
        }

        self.inner
            .status
            .store(Status::Finished as u8, Ordering::Release);
        tracing::trace!(
            promise = self.inner.id,
            ok = snapshot.is_ok(),
            "promise finished"
        );
        self.inner.gate.open();

        let callbacks = std::mem::take(&mut *self.inner.callbacks.lock());
        for callback in callbacks {
            callback(&snapshot);
        }
    }

    /// Blocks until the promise is finished and returns the outcome.
    ///
    /// A not-started promise is started first; a finished promise returns
    /// its cached outcome immediately without blocking. Any number of
    /// threads may wait concurrently and all observe the same outcome.
    pub fn wait(&self) -> Outcome {
        if !self.is_finished() {
            self.start();
            tracing::trace!(promise = self.inner.id, "waiting for completion");
            self.inner.gate.wait();
        }
        self.inner
            .outcome
            .get()
            .cloned()
            .unwrap_or_else(Outcome::empty)
    }

    /// Registers a completion callback.
    ///
    /// Callbacks fire synchronously right after the completion gate opens,
    /// in registration order, each at most once. Registering on an
    /// already-finished promise fires the callback immediately on the
    /// calling thread.
    pub fn then<F>(&self, callback: F)
    where
        F: FnOnce(&Outcome) + Send + 'static,
    {
        let mut callbacks = self.inner.callbacks.lock();
        if self.is_finished() {
            drop(callbacks);
            if let Some(outcome) = self.inner.outcome.get() {
                callback(outcome);
            }
            return;
        }
        callbacks.push(Box::new(callback));
    }

    /// The current execution status.
    #[must_use]
    pub fn status(&self) -> Status {
        Status::from_u8(self.inner.status.load(Ordering::Acquire))
    }

    /// True until the first `start` (or `wait`).
    #[must_use]
    pub fn is_not_started(&self) -> bool {
        self.status() == Status::NotStarted
    }

    /// True while the unit is running.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status() == Status::Pending
    }

    /// True once the unit has reported completion.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status() == Status::Finished
    }

    /// The value slot of the outcome, or `None` before completion.
    #[must_use]
    pub fn result(&self) -> Option<Value> {
        self.inner.outcome.get().and_then(|o| o.value().cloned())
    }

    /// The error slot of the outcome, or `None` before completion and on
    /// success.
    #[must_use]
    pub fn error(&self) -> Option<Error> {
        self.inner.outcome.get().and_then(|o| o.error().cloned())
    }

    /// Returns handles to the child promises of a batch, in construction
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NotABatch`] when called on a unit promise.
    pub fn children(&self) -> Result<Vec<Self>> {
        match &self.inner.work {
            Work::Batch { children, .. } => Ok(children.clone()),
            Work::Unit { .. } => Err(Error::new(ErrorKind::NotABatch)),
        }
    }

    /// True when this promise was constructed as a batch.
    #[must_use]
    pub fn is_batch(&self) -> bool {
        matches!(self.inner.work, Work::Batch { .. })
    }

    /// A process-unique identifier, used in log events.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// The diagnostic label, when one was set via the builder.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.inner.label.as_deref()
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("id", &self.inner.id)
            .field("label", &self.inner.label)
            .field("status", &self.status())
            .field("batch", &self.is_batch())
            .finish_non_exhaustive()
    }
}
