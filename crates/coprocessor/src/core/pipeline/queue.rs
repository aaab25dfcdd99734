//! Delayed-write queue with bypass forwarding.
//!
//! Every register write produced by a pipeline stage is scheduled here with
//! a delay in clocks. The queue is a circular array of slots indexed by
//! `(head + delay) % QUEUE_SLOTS`; once per clock the machine commits the
//! head slot and calls [`DelayedWriteQueue::advance`].
//!
//! Two properties hold by construction:
//! 1. **Exactly-once commit:** a slot is cleared when the head leaves it, so
//!    its writes can never be committed twice.
//! 2. **Forwarding:** [`DelayedWriteQueue::bypass_lookup`] returns the
//!    newest pending write marked as bypassable, scanning delays from
//!    `BYPASS_MAX_DELAY` down to 0.

use crate::common::constants::{BYPASS_MAX_DELAY, QUEUE_SLOT_ENTRIES, QUEUE_SLOTS};
use crate::common::{RegId, RegVal, SimError, SimResult};

/// One scheduled register write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingWrite {
    /// Destination register.
    pub id: RegId,
    /// Payload.
    pub val: RegVal,
    /// Clock at which the write was scheduled.
    pub issued_at: u64,
    /// Whether bypass reads may observe the value before commit.
    pub bypass: bool,
}

/// Circular array of write slots.
#[derive(Clone, Debug)]
pub struct DelayedWriteQueue {
    slots: [Vec<PendingWrite>; QUEUE_SLOTS],
    head: usize,
    pending: usize,
}

impl Default for DelayedWriteQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayedWriteQueue {
    /// Creates an empty queue with every slot preallocated.
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| Vec::with_capacity(QUEUE_SLOT_ENTRIES)),
            head: 0,
            pending: 0,
        }
    }

    const fn slot_index(&self, delay: usize) -> usize {
        (self.head + delay) % QUEUE_SLOTS
    }

    /// Schedules a write `delay` clocks ahead.
    ///
    /// # Arguments
    ///
    /// * `id` - Destination register.
    /// * `val` - Masked payload.
    /// * `delay` - Clocks until commit; 0 commits at the end of the current clock.
    /// * `bypass` - Whether bypass reads may see the value early.
    /// * `now` - Current clock, recorded for diagnostics.
    pub fn schedule(&mut self, id: RegId, val: RegVal, delay: usize, bypass: bool, now: u64) -> SimResult<()> {
        if delay >= QUEUE_SLOTS {
            return Err(SimError::QueueSlotOverflow { delay });
        }
        let idx = self.slot_index(delay);
        let slot = &mut self.slots[idx];
        if slot.len() >= QUEUE_SLOT_ENTRIES {
            return Err(SimError::QueueSlotOverflow { delay });
        }
        slot.push(PendingWrite {
            id,
            val,
            issued_at: now,
            bypass,
        });
        self.pending += 1;
        Ok(())
    }

    /// Finds the newest pending bypassable write to `id`.
    ///
    /// Slots are scanned from the furthest delay down to the head; within a
    /// slot the earliest scheduled write wins. The lane of `id` is ignored: a
    /// pending half write forwards its raw bits.
    pub fn bypass_lookup(&self, id: RegId) -> Option<&PendingWrite> {
        (0..=BYPASS_MAX_DELAY).rev().find_map(|delay| {
            self.slots[self.slot_index(delay)]
                .iter()
                .find(|w| w.bypass && w.id.same_register(&id))
        })
    }

    /// Writes pending `delay` clocks ahead, in scheduling order.
    pub fn slot(&self, delay: usize) -> &[PendingWrite] {
        &self.slots[self.slot_index(delay % QUEUE_SLOTS)]
    }

    /// Entry `pos` of the head slot, if present.
    ///
    /// The head slot may grow while it is being committed (a delay-0 write
    /// scheduled by a commit side effect), so callers walk it by position.
    pub fn head_entry(&self, pos: usize) -> Option<PendingWrite> {
        self.slots[self.head].get(pos).copied()
    }

    /// Clears the head slot and moves the head one slot forward.
    pub fn advance(&mut self) {
        let head = self.head;
        self.pending -= self.slots[head].len();
        self.slots[head].clear();
        self.head = (head + 1) % QUEUE_SLOTS;
    }

    /// Number of writes not yet committed.
    pub const fn len(&self) -> usize {
        self.pending
    }

    /// Returns true if no write is pending.
    pub const fn is_empty(&self) -> bool {
        self.pending == 0
    }

    /// Drops every pending write.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.clear();
        }
        self.head = 0;
        self.pending = 0;
    }

    /// Iterates over every pending write with its remaining delay.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &PendingWrite)> + '_ {
        (0..QUEUE_SLOTS).flat_map(move |delay| self.slot(delay).iter().map(move |w| (delay, w)))
    }
}
