use crate::core_invariants::require;

use super::value::Smoothable;

pub const MAX_HISTORY: usize = 3;

/// Fixed-size recency ring. Slot 0 is always the newest sample.
#[derive(Debug, Clone, Copy)]
pub struct History<T: Smoothable> {
    slots: [T; MAX_HISTORY],
    depth: usize,
    samples: u64,
}

impl<T: Smoothable> History<T> {
    pub fn new(depth: usize) -> Self {
        require(
            (2..=MAX_HISTORY).contains(&depth),
            "history depth must be 2 or 3",
        );
        Self {
            slots: [T::default(); MAX_HISTORY],
            depth,
            samples: 0,
        }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of samples ever pushed.
    #[inline]
    pub fn samples(&self) -> u64 {
        self.samples
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples == 0
    }

    /// Shift everything back one slot and store `value` as newest. The very first sample fills
    /// every slot, so an object with a single sample reads as motionless.
    pub fn push(&mut self, value: T) {
        if self.samples == 0 {
            for slot in self.slots[..self.depth].iter_mut() {
                *slot = value;
            }
        } else {
            self.slots.copy_within(0..self.depth - 1, 1);
            self.slots[0] = value;
        }
        self.samples = self.samples.saturating_add(1);
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<T> {
        if self.samples == 0 || index >= self.depth {
            return None;
        }
        Some(self.slots[index])
    }

    #[inline]
    pub fn newest(&self) -> Option<T> {
        self.get(0)
    }

    #[inline]
    pub fn previous(&self) -> Option<T> {
        self.get(1)
    }

    /// The two newest samples differ.
    #[inline]
    pub fn changed(&self) -> bool {
        self.samples > 0 && self.slots[0] != self.slots[1]
    }

    pub fn clear(&mut self) {
        self.slots = [T::default(); MAX_HISTORY];
        self.samples = 0;
    }
}
