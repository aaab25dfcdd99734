//! Fixed-capacity FIFO ring buffer.
//!
//! Used for both execution pipelines and the host instruction FIFO. The
//! buffer owns capacity checking and wrap-around so callers only see
//! oldest-first positions `0..len()`.

/// A FIFO with inline storage for `N` items.
#[derive(Clone, Debug)]
pub struct RingBuffer<T, const N: usize> {
    slots: [Option<T>; N],
    head: usize,
    len: usize,
}

impl<T, const N: usize> Default for RingBuffer<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> RingBuffer<T, N> {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            head: 0,
            len: 0,
        }
    }

    /// Maximum number of items.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of resident items.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing is resident.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if no further push fits.
    pub const fn is_full(&self) -> bool {
        self.len == N
    }

    const fn physical(&self, pos: usize) -> usize {
        (self.head + pos) % N
    }

    /// Appends an item as the youngest entry.
    ///
    /// # Returns
    ///
    /// `Err(item)` when the buffer is full.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }
        let idx = self.physical(self.len);
        self.slots[idx] = Some(item);
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the oldest entry.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % N;
        self.len -= 1;
        item
    }

    /// Oldest-first access.
    pub fn get(&self, pos: usize) -> Option<&T> {
        if pos < self.len {
            self.slots[self.physical(pos)].as_ref()
        } else {
            None
        }
    }

    /// Oldest-first mutable access.
    pub fn get_mut(&mut self, pos: usize) -> Option<&mut T> {
        if pos < self.len {
            let idx = self.physical(pos);
            self.slots[idx].as_mut()
        } else {
            None
        }
    }

    /// Iterates from the oldest entry to the youngest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len).filter_map(move |pos| self.get(pos))
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        while self.pop_front().is_some() {}
        self.head = 0;
    }
}
