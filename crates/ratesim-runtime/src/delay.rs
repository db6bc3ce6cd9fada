//! Rolling history of past rate vectors
//!
//! Slot `d - 1` of the ring holds the rate vector committed exactly `d` ticks
//! ago. Depth grows on request and never shrinks; new slots are zero-filled so
//! that delayed reads during warm-up are deterministic.

use crate::error::{Result, RuntimeError};
use std::collections::VecDeque;

/// Fixed-width ring of rate snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct DelayRing {
    width: usize,
    slots: VecDeque<Vec<f64>>,
}

impl DelayRing {
    /// Create an empty ring (depth 0) for vectors of `width` entries
    pub fn new(width: usize) -> Self {
        Self {
            width,
            slots: VecDeque::new(),
        }
    }

    /// Length of every stored snapshot
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of past ticks retained
    pub fn max_delay(&self) -> usize {
        self.slots.len()
    }

    /// Grow the ring to `depth` slots. Returns `true` if the ring grew.
    ///
    /// Stored snapshots keep their delay; the added slots sit at the old end of
    /// the history and read as zero until real snapshots shift into them.
    pub fn set_max_delay(&mut self, depth: usize) -> bool {
        if depth <= self.slots.len() {
            return false;
        }
        let additional = depth - self.slots.len();
        self.slots.reserve(additional);
        for _ in 0..additional {
            self.slots.push_back(vec![0.0; self.width]);
        }
        true
    }

    /// Commit `rates` as the one-tick-old snapshot, shifting older ones back
    /// and evicting the oldest. No-op while the depth is zero.
    ///
    /// A vector of the wrong width is rejected and leaves the ring untouched.
    pub fn push(&mut self, rates: &[f64]) -> Result<()> {
        if rates.len() != self.width {
            return Err(RuntimeError::RateLengthMismatch {
                expected: self.width,
                found: rates.len(),
            });
        }
        // Recycle the evicted buffer instead of allocating a fresh one.
        if let Some(mut oldest) = self.slots.pop_back() {
            oldest.copy_from_slice(rates);
            self.slots.push_front(oldest);
        }
        Ok(())
    }

    /// Snapshot taken `delay` ticks ago, for `1 <= delay <= max_delay`
    pub fn get(&self, delay: usize) -> Option<&[f64]> {
        if delay == 0 {
            return None;
        }
        self.slots.get(delay - 1).map(Vec::as_slice)
    }

    /// Zero every snapshot, keeping the depth
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.iter_mut().for_each(|v| *v = 0.0);
        }
    }

    /// Iterate snapshots from the most recent (delay 1) to the oldest
    pub fn iter(&self) -> impl Iterator<Item = &[f64]> {
        self.slots.iter().map(Vec::as_slice)
    }
}
