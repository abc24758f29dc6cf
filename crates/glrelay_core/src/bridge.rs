//! # Blocking Bridge
//!
//! A one-shot slot that lets the issuing thread wait for a value produced
//! by an Op on the execution thread.
//!
//! ```text
//!   issuing thread                      execution thread
//!   ──────────────                      ────────────────
//!   (completer, waiter) = oneshot()
//!   enqueue(op owning completer)
//!   seal + request flush
//!   waiter.wait() ─── blocks ───┐       op runs: completer.complete(v)
//!                               └────── notify ──> returns v
//! ```
//!
//! If the Op is dropped without running (a failed drain, a destroyed
//! context), dropping its [`Completer`] marks the slot abandoned and wakes
//! the waiter, so no caller hangs on an Op that will never execute.

use std::mem;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use thiserror::Error;

/// The completer was dropped before producing a value.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("completer dropped before completing")]
pub struct Abandoned;

enum SlotState<R> {
    Pending,
    Done(R),
    Abandoned,
}

struct Slot<R> {
    state: Mutex<SlotState<R>>,
    ready: Condvar,
}

impl<R> Slot<R> {
    fn settle(&self, outcome: SlotState<R>) {
        let mut state = self.state.lock();
        if matches!(*state, SlotState::Pending) {
            *state = outcome;
        }
        drop(state);
        self.ready.notify_all();
    }
}

/// Execution-side half. Completes the slot exactly once.
pub struct Completer<R> {
    slot: Option<Arc<Slot<R>>>,
}

/// Issuing-side half. Blocks until the slot is settled.
pub struct Waiter<R> {
    slot: Arc<Slot<R>>,
}

/// Creates a connected completer/waiter pair.
#[must_use]
pub fn oneshot<R>() -> (Completer<R>, Waiter<R>) {
    let slot = Arc::new(Slot {
        state: Mutex::new(SlotState::Pending),
        ready: Condvar::new(),
    });
    (
        Completer {
            slot: Some(Arc::clone(&slot)),
        },
        Waiter { slot },
    )
}

impl<R> Completer<R> {
    /// Stores `value` and wakes the waiter.
    pub fn complete(mut self, value: R) {
        if let Some(slot) = self.slot.take() {
            slot.settle(SlotState::Done(value));
        }
    }
}

impl<R> Drop for Completer<R> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            slot.settle(SlotState::Abandoned);
        }
    }
}

impl<R> Waiter<R> {
    /// Blocks until the completer settles the slot.
    ///
    /// # Errors
    ///
    /// Returns [`Abandoned`] if the completer was dropped without a value.
    pub fn wait(self) -> Result<R, Abandoned> {
        let mut state = self.slot.state.lock();
        loop {
            match mem::replace(&mut *state, SlotState::Pending) {
                SlotState::Done(value) => return Ok(value),
                SlotState::Abandoned => return Err(Abandoned),
                SlotState::Pending => self.slot.ready.wait(&mut state),
            }
        }
    }

    /// Returns true once the slot holds a value or was abandoned.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        !matches!(*self.slot.state.lock(), SlotState::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_value_crosses_threads() {
        let (completer, waiter) = oneshot();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            completer.complete(42_u32);
        });
        assert_eq!(waiter.wait(), Ok(42));
        handle.join().unwrap();
    }

    #[test]
    fn test_complete_before_wait() {
        let (completer, waiter) = oneshot();
        completer.complete("ready");
        assert!(waiter.is_settled());
        assert_eq!(waiter.wait(), Ok("ready"));
    }

    #[test]
    fn test_dropped_completer_wakes_waiter() {
        let (completer, waiter) = oneshot::<u32>();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            drop(completer);
        });
        assert_eq!(waiter.wait(), Err(Abandoned));
        handle.join().unwrap();
    }
}
