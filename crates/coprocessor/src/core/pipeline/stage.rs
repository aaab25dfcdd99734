//! Staged execution pipe shared by the cal and lmem pipelines.
//!
//! A pipe is a FIFO of entries, each carrying its own stage counter. The
//! machine shifts a pipe by copying each entry out, running its current
//! stage, bumping the counter and storing it back, oldest first. Entries
//! whose counter reaches the pipe depth retire from the front; an entry
//! finishing while an older one is still resident breaks FIFO order and is
//! reported as `PipelineOrder`.

use crate::common::{SimError, SimResult};

use super::ring::RingBuffer;

/// An entry that advances one stage per clock.
pub trait Staged: Copy {
    /// Pipe name used in diagnostics.
    const PIPE: &'static str;
    /// Stage count; an entry is finished when its stage reaches this value.
    const DEPTH: u8;

    /// Next stage to execute.
    fn stage(&self) -> u8;

    /// Issue clock of the entry.
    fn ticket(&self) -> u64;
}

/// Fixed-capacity staged pipe.
#[derive(Clone, Debug, Default)]
pub struct Pipe<E, const N: usize> {
    ring: RingBuffer<E, N>,
}

impl<E: Staged, const N: usize> Pipe<E, N> {
    /// Creates an empty pipe.
    pub fn new() -> Self {
        Self {
            ring: RingBuffer::new(),
        }
    }

    /// Appends a freshly issued entry.
    pub fn issue(&mut self, entry: E) -> SimResult<()> {
        self.ring
            .push(entry)
            .map_err(|_| SimError::PipelineOverflow { pipe: E::PIPE })
    }

    /// Copy of the entry at oldest-first position `pos`.
    pub fn entry(&self, pos: usize) -> Option<E> {
        self.ring.get(pos).copied()
    }

    /// Stores an updated entry back at `pos`.
    pub fn store(&mut self, pos: usize, entry: E) {
        if let Some(slot) = self.ring.get_mut(pos) {
            *slot = entry;
        }
    }

    /// Removes finished entries from the front.
    ///
    /// # Returns
    ///
    /// The retired entries' tickets, oldest first, or `PipelineOrder` if a
    /// younger entry finished while an older one is still resident.
    pub fn retire(&mut self) -> SimResult<Vec<u64>> {
        let mut retired = Vec::new();
        while let Some(front) = self.ring.get(0) {
            if front.stage() < E::DEPTH {
                break;
            }
            retired.push(front.ticket());
            let _ = self.ring.pop_front();
        }
        if let Some(pos) = self.ring.iter().position(|e| e.stage() >= E::DEPTH) {
            return Err(SimError::PipelineOrder {
                pipe: E::PIPE,
                index: pos,
            });
        }
        Ok(retired)
    }

    /// Number of resident entries.
    pub const fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns true if no entry is resident.
    pub const fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Iterates oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &E> + '_ {
        self.ring.iter()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.ring.clear();
    }
}
