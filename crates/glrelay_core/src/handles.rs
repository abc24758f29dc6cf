//! # Virtual Object Handles
//!
//! Handles are reserved on the issuing thread with one atomic increment and
//! bound to native objects later, on the execution thread, when the creation
//! Op runs. The mapping is only ever read or written on the execution
//! thread, so [`HandleTable`] carries no lock of its own.
//!
//! ```text
//!   issuing thread                    execution thread
//!   ──────────────                    ────────────────
//!   id = allocator.allocate()  ──┐
//!   enqueue(create + map id)     │    native = gen(); table.map(id, native)
//!   enqueue(bind id)             └──> table.lookup(id) -> native
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use glrelay_shared::{NativeId, ObjectId};

use crate::error::{ExecError, ExecResult};

/// Process-scoped source of [`ObjectId`]s.
///
/// Ids start at 1 and are never handed out twice, even after the context
/// that allocated them is destroyed. One allocator is shared by every
/// context of a registry.
#[derive(Debug)]
pub struct ObjectIdAllocator {
    next: AtomicU32,
}

impl ObjectIdAllocator {
    /// Creates an allocator whose first id is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU32::new(1),
        }
    }

    /// Reserves the next id. Lock-free, callable from any thread.
    ///
    /// Running out of the `u32` range is not handled: a single process would
    /// need four billion resource creations.
    #[inline]
    pub fn allocate(&self) -> ObjectId {
        ObjectId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the id the next call to [`allocate`](Self::allocate) yields.
    #[inline]
    #[must_use]
    pub fn peek(&self) -> ObjectId {
        ObjectId(self.next.load(Ordering::Relaxed))
    }
}

impl Default for ObjectIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Execution-side mapping from virtual handle to native object name.
#[derive(Debug, Default)]
pub struct HandleTable {
    objects: HashMap<ObjectId, NativeId>,
}

impl HandleTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `id` to `native`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::ObjectAlreadyMapped`] if `id` is already bound.
    pub fn map(&mut self, id: ObjectId, native: NativeId) -> ExecResult<()> {
        if self.objects.contains_key(&id) {
            return Err(ExecError::ObjectAlreadyMapped(id));
        }
        self.objects.insert(id, native);
        Ok(())
    }

    /// Native name for `id`, or `0` if unmapped.
    ///
    /// `0` is the driver's "no object", so Ops simply pass it through and the
    /// call becomes a no-op (or an unbind) against that handle.
    #[inline]
    #[must_use]
    pub fn lookup(&self, id: ObjectId) -> NativeId {
        self.objects.get(&id).copied().unwrap_or(0)
    }

    /// Removes `id`, returning its native name if it was mapped.
    pub fn unmap(&mut self, id: ObjectId) -> Option<NativeId> {
        self.objects.remove(&id)
    }

    /// Finds the handle bound to `native` by scanning the whole table.
    ///
    /// Only used by rare blocking queries. If two handles share a native name
    /// the one returned is unspecified.
    #[must_use]
    pub fn reverse_lookup(&self, native: NativeId) -> Option<ObjectId> {
        if native == 0 {
            return None;
        }
        self.objects
            .iter()
            .find(|(_, n)| **n == native)
            .map(|(id, _)| *id)
    }

    /// Number of mapped handles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if no handle is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocator_is_strictly_increasing() {
        let allocator = ObjectIdAllocator::new();
        let ids: Vec<_> = (0..100).map(|_| allocator.allocate()).collect();
        assert_eq!(ids[0], ObjectId(1));
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(allocator.peek(), ObjectId(101));
    }

    #[test]
    fn test_lookup_unmapped_is_null() {
        let table = HandleTable::new();
        assert_eq!(table.lookup(ObjectId(42)), 0);
    }

    #[test]
    fn test_map_twice_fails() {
        let mut table = HandleTable::new();
        table.map(ObjectId(1), 10).unwrap();
        assert_eq!(
            table.map(ObjectId(1), 11),
            Err(ExecError::ObjectAlreadyMapped(ObjectId(1)))
        );
        assert_eq!(table.lookup(ObjectId(1)), 10);
    }

    #[test]
    fn test_unmap_and_reverse_lookup() {
        let mut table = HandleTable::new();
        table.map(ObjectId(1), 10).unwrap();
        table.map(ObjectId(2), 20).unwrap();

        assert_eq!(table.reverse_lookup(20), Some(ObjectId(2)));
        assert_eq!(table.reverse_lookup(0), None);
        assert_eq!(table.reverse_lookup(99), None);

        assert_eq!(table.unmap(ObjectId(2)), Some(20));
        assert_eq!(table.unmap(ObjectId(2)), None);
        assert_eq!(table.reverse_lookup(20), None);
        assert_eq!(table.len(), 1);
    }
}
