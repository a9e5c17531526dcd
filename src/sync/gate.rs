//! One-shot completion gate.
//!
//! A [`Gate`] starts closed and is opened exactly once. Any number of
//! threads can block in [`Gate::wait`]; all of them are released when the
//! gate opens, and every later wait returns immediately. Opening an
//! already-open gate is a no-op, so the one-release discipline holds even
//! under misuse.
//!
//! The mutex acquisition in `wait` pairs with the one in `open` to give
//! waiters a happens-before edge over everything written before the open.

use parking_lot::{Condvar, Mutex};

/// A one-shot open/wait signal.
#[derive(Debug, Default)]
pub struct Gate {
    opened: Mutex<bool>,
    cvar: Condvar,
}

impl Gate {
    /// Creates a closed gate.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            opened: Mutex::new(false),
            cvar: Condvar::new(),
        }
    }

    /// Opens the gate, releasing every current and future waiter.
    ///
    /// Idempotent: later calls have no effect.
    pub fn open(&self) {
        let mut opened = self.opened.lock();
        if !*opened {
            *opened = true;
            self.cvar.notify_all();
        }
    }

    /// Blocks until the gate is open. Returns immediately if it already is.
    pub fn wait(&self) {
        let mut opened = self.opened.lock();
        while !*opened {
            self.cvar.wait(&mut opened);
        }
    }

    /// Returns true once the gate has been opened.
    #[must_use]
    pub fn is_open(&self) -> bool {
        *self.opened.lock()
    }
}
