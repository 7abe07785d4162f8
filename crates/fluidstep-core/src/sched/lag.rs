#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LagTransition {
    BecameSlow,
    Recovered,
}

/// Running-slowly bookkeeping.
///
/// Every extra update in one iteration adds to the lag counter; every iteration that ran exactly
/// one update pays one back. The flag raises at `threshold` and clears once the counter is back
/// at zero.
#[derive(Debug, Clone)]
pub struct LagTracker {
    counter: u32,
    threshold: u32,
    running_slowly: bool,
}

impl LagTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            counter: 0,
            threshold: threshold.max(1),
            running_slowly: false,
        }
    }

    #[inline]
    pub fn is_running_slowly(&self) -> bool {
        self.running_slowly
    }

    #[inline]
    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn observe(&mut self, updates_run: u32) -> Option<LagTransition> {
        self.counter = self.counter.saturating_add(updates_run.saturating_sub(1));

        let transition = if self.running_slowly {
            if self.counter == 0 {
                self.running_slowly = false;
                Some(LagTransition::Recovered)
            } else {
                None
            }
        } else if self.counter >= self.threshold {
            self.running_slowly = true;
            Some(LagTransition::BecameSlow)
        } else {
            None
        };

        if updates_run == 1 && self.counter > 0 {
            self.counter -= 1;
        }

        transition
    }

    pub fn reset(&mut self) {
        self.counter = 0;
        self.running_slowly = false;
    }
}
