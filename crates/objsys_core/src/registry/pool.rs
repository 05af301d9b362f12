//! Fixed-size record pool with free-list reuse.
//!
//! # Responsibility
//! - Hand out stable slots for registration records.
//! - Recycle released slots before growing the backing storage.
//!
//! # Invariants
//! - A handle refers to at most one live record at a time.
//! - Released slots are reused in LIFO order.

use serde::Serialize;

/// Index of one record slot inside a [`RecordPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordHandle(usize);

impl RecordHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

enum Slot<T> {
    Occupied(T),
    Vacant { next_free: Option<usize> },
}

/// Allocation counters for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Records currently handed out.
    pub live: usize,
    /// Slots ever created (live + free).
    pub capacity: usize,
    /// Slots waiting on the free list.
    pub free: usize,
    /// Total `alloc` calls.
    pub allocations: u64,
    /// `alloc` calls served from the free list.
    pub reuses: u64,
}

pub struct RecordPool<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<usize>,
    stats: PoolStats,
}

impl<T> RecordPool<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            stats: PoolStats::default(),
        }
    }

    /// Stores `record` in a free slot, growing only when the free list is empty.
    pub fn alloc(&mut self, record: T) -> RecordHandle {
        self.stats.allocations += 1;
        self.stats.live += 1;

        if let Some(index) = self.free_head {
            let Slot::Vacant { next_free } = self.slots[index] else {
                // Free list only ever links vacant slots.
                return self.push_slot(record);
            };
            self.free_head = next_free;
            self.slots[index] = Slot::Occupied(record);
            self.stats.free -= 1;
            self.stats.reuses += 1;
            return RecordHandle(index);
        }

        self.push_slot(record)
    }

    fn push_slot(&mut self, record: T) -> RecordHandle {
        self.slots.push(Slot::Occupied(record));
        self.stats.capacity += 1;
        RecordHandle(self.slots.len() - 1)
    }

    /// Releases a slot and returns its record.
    ///
    /// Returns `None` when the handle does not refer to a live record.
    pub fn free(&mut self, handle: RecordHandle) -> Option<T> {
        let slot = self.slots.get_mut(handle.0)?;
        if matches!(slot, Slot::Vacant { .. }) {
            return None;
        }

        let previous = std::mem::replace(
            slot,
            Slot::Vacant {
                next_free: self.free_head,
            },
        );
        self.free_head = Some(handle.0);
        self.stats.live -= 1;
        self.stats.free += 1;

        match previous {
            Slot::Occupied(record) => Some(record),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn get(&self, handle: RecordHandle) -> Option<&T> {
        match self.slots.get(handle.0)? {
            Slot::Occupied(record) => Some(record),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn get_mut(&mut self, handle: RecordHandle) -> Option<&mut T> {
        match self.slots.get_mut(handle.0)? {
            Slot::Occupied(record) => Some(record),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn live(&self) -> usize {
        self.stats.live
    }

    pub fn stats(&self) -> PoolStats {
        self.stats
    }
}

impl<T> Default for RecordPool<T> {
    fn default() -> Self {
        Self::new()
    }
}
