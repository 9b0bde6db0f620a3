// Row-oriented ring buffer
//
// Fixed capacity, FIFO eviction once full. Writers take the write lock for one
// insert (or one batch); readers copy the rows out under the read lock, so a
// reader never sees a slot mid-overwrite.

use std::num::NonZeroUsize;

use parking_lot::RwLock;

/// Capacity-bounded FIFO store of typed rows.
#[derive(Debug)]
pub struct RingBuffer<R> {
    capacity: NonZeroUsize,
    state: RwLock<RingState<R>>,
}

#[derive(Debug)]
struct RingState<R> {
    slots: Vec<R>,
    /// Next slot to overwrite once full; always the oldest surviving row.
    cursor: usize,
}

impl<R> RingState<R> {
    fn push(&mut self, row: R, capacity: usize) {
        if self.slots.len() < capacity {
            self.slots.push(row);
        } else {
            self.slots[self.cursor] = row;
            self.cursor = (self.cursor + 1) % capacity;
        }
    }
}

impl<R: Clone> RingBuffer<R> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            state: RwLock::new(RingState {
                slots: Vec::new(),
                cursor: 0,
            }),
        }
    }

    pub fn insert(&self, row: R) {
        self.state.write().push(row, self.capacity.get());
    }

    /// Insert rows in order under a single lock acquisition.
    pub fn insert_batch<I>(&self, rows: I)
    where
        I: IntoIterator<Item = R>,
    {
        let capacity = self.capacity.get();
        let mut state = self.state.write();
        for row in rows {
            state.push(row, capacity);
        }
    }

    /// Point-in-time copy of every row, oldest first.
    pub fn snapshot(&self) -> Vec<R> {
        let state = self.state.read();
        let (newer, older) = state.slots.split_at(state.cursor);
        let mut rows = Vec::with_capacity(state.slots.len());
        rows.extend_from_slice(older);
        rows.extend_from_slice(newer);
        rows
    }

    /// Alias for [`RingBuffer::snapshot`].
    pub fn read_all(&self) -> Vec<R> {
        self.snapshot()
    }

    pub fn size(&self) -> usize {
        self.state.read().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn clear(&self) {
        let mut state = self.state.write();
        state.slots.clear();
        state.cursor = 0;
    }
}
