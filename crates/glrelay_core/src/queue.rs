//! # Issue Queue
//!
//! **Batch on one thread, drain on another.**
//!
//! The issuing thread appends Ops to a private *next batch*. Sealing moves
//! that batch into the shared *backlog* in O(1). The execution thread takes
//! the whole backlog with a single swap under the backlog lock and runs it
//! with no lock held.
//!
//! ```text
//!   issuing thread                       execution thread
//!   ──────────────                       ────────────────
//!   append(op) ─> [next batch]
//!   seal()     ─────────────┐
//!                           v
//!                  [backlog: Vec<Batch>] ──swap──> run batch 0, 1, ... in order
//! ```
//!
//! ## Lock Discipline
//!
//! - `next` is only contended by `discard()`; ordinarily it belongs to the
//!   issuing thread.
//! - `backlog` is held for one `push` (seal) or one `mem::take` (drain).
//! - Locks are always taken `next` before `backlog`.

use std::mem;

use parking_lot::Mutex;

use crate::error::ExecResult;
use crate::state::GlState;

/// A deferred unit of work, run exactly once on the execution thread.
///
/// Everything the Op needs is captured by value at enqueue time.
pub type Op = Box<dyn FnOnce(&mut GlState) -> ExecResult<()> + Send>;

/// Ops issued between two seals, in issue order.
pub type Batch = Vec<Op>;

/// Statistics for an [`IssueQueue`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Ops moved into the backlog.
    pub ops_sealed: u64,
    /// Non-empty batches moved into the backlog.
    pub batches_sealed: u64,
    /// Ops that ran to completion.
    pub ops_executed: u64,
    /// Drain passes, including empty ones.
    pub drains: u64,
    /// Drain passes stopped by a failing Op.
    pub failed_drains: u64,
    /// Ops dropped without running (failed drains and discards).
    pub ops_dropped: u64,
}

/// Outcome of one successful drain pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Batches taken from the backlog.
    pub batches: usize,
    /// Ops executed.
    pub ops: usize,
}

/// The two-stage queue shared by an issuing and an execution thread.
pub struct IssueQueue {
    next: Mutex<Batch>,
    backlog: Mutex<Vec<Batch>>,
    batch_capacity: usize,
    stats: Mutex<QueueStats>,
}

impl IssueQueue {
    /// Creates an empty queue. New batches reserve room for `batch_capacity`
    /// Ops.
    #[must_use]
    pub fn new(batch_capacity: usize) -> Self {
        Self {
            next: Mutex::new(Vec::with_capacity(batch_capacity)),
            backlog: Mutex::new(Vec::new()),
            batch_capacity,
            stats: Mutex::new(QueueStats::default()),
        }
    }

    /// Adds an Op to the next batch. Not visible to the execution thread
    /// until [`seal`](Self::seal).
    #[inline]
    pub fn append(&self, op: Op) {
        self.next.lock().push(op);
    }

    /// Moves the next batch into the backlog. No-op if it is empty.
    pub fn seal(&self) {
        let mut next = self.next.lock();
        if next.is_empty() {
            return;
        }
        let batch = mem::replace(&mut *next, Vec::with_capacity(self.batch_capacity));
        let sealed = batch.len() as u64;
        self.backlog.lock().push(batch);
        drop(next);

        let mut stats = self.stats.lock();
        stats.ops_sealed += sealed;
        stats.batches_sealed += 1;
    }

    /// Takes the whole backlog and runs every Op in order.
    ///
    /// Stops at the first failing Op. The rest of the taken backlog is
    /// dropped and the error is returned. Ops sealed while the drain runs
    /// wait for the next pass.
    ///
    /// # Errors
    ///
    /// Returns the first [`ExecError`](crate::error::ExecError) raised by an
    /// Op.
    pub fn drain(&self, state: &mut GlState) -> ExecResult<DrainReport> {
        let batches = mem::take(&mut *self.backlog.lock());
        let mut report = DrainReport {
            batches: batches.len(),
            ops: 0,
        };
        let total: usize = batches.iter().map(Vec::len).sum();

        for op in batches.into_iter().flatten() {
            if let Err(err) = op(state) {
                let dropped = (total - report.ops - 1) as u64;
                let mut stats = self.stats.lock();
                stats.drains += 1;
                stats.failed_drains += 1;
                stats.ops_executed += report.ops as u64;
                stats.ops_dropped += dropped;
                drop(stats);

                tracing::error!(
                    executed = report.ops,
                    dropped,
                    error = %err,
                    "op failed, dropping rest of backlog"
                );
                return Err(err);
            }
            report.ops += 1;
        }

        let mut stats = self.stats.lock();
        stats.drains += 1;
        stats.ops_executed += report.ops as u64;
        Ok(report)
    }

    /// Drops every pending Op, sealed or not, without running it.
    ///
    /// Returns how many were dropped. Blocking calls waiting on a dropped Op
    /// are woken.
    pub fn discard(&self) -> usize {
        let next = mem::take(&mut *self.next.lock());
        let backlog = mem::take(&mut *self.backlog.lock());
        let dropped = next.len() + backlog.iter().map(Vec::len).sum::<usize>();
        self.stats.lock().ops_dropped += dropped as u64;
        // Ops are dropped here, after both locks are released.
        drop(next);
        drop(backlog);
        dropped
    }

    /// Ops in the next batch (not yet sealed).
    #[must_use]
    pub fn unsealed_len(&self) -> usize {
        self.next.lock().len()
    }

    /// Batches waiting in the backlog.
    #[must_use]
    pub fn backlog_len(&self) -> usize {
        self.backlog.lock().len()
    }

    /// Every Op not yet taken by a drain.
    #[must_use]
    pub fn pending_ops(&self) -> usize {
        let next = self.next.lock();
        let backlog = self.backlog.lock();
        next.len() + backlog.iter().map(Vec::len).sum::<usize>()
    }

    /// Snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> QueueStats {
        self.stats.lock().clone()
    }
}

impl std::fmt::Debug for IssueQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssueQueue")
            .field("unsealed", &self.unsealed_len())
            .field("backlog_batches", &self.backlog_len())
            .finish_non_exhaustive()
    }
}
