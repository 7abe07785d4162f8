use std::time::Duration;

use crate::time::Clock;

/// Sleep/spin hybrid wait.
///
/// Coarse sleeps of `step` are used while the remaining time exceeds one step plus the worst
/// sleep overshoot observed so far; the tail is busy-waited.
#[derive(Debug, Clone)]
pub struct HybridWait {
    step: Duration,
    worst_overshoot: Duration,
}

const OVERSHOOT_CAP: Duration = Duration::from_millis(8);

impl HybridWait {
    pub const DEFAULT_STEP: Duration = Duration::from_millis(1);

    pub fn new() -> Self {
        Self::with_step(Self::DEFAULT_STEP)
    }

    pub fn with_step(step: Duration) -> Self {
        Self {
            step: step.max(Duration::from_micros(1)),
            worst_overshoot: Duration::ZERO,
        }
    }

    #[inline]
    pub fn worst_overshoot(&self) -> Duration {
        self.worst_overshoot
    }

    /// Blocks until `clock.now() >= deadline`.
    pub fn wait_until<C: Clock + ?Sized>(&mut self, clock: &C, deadline: Duration) {
        loop {
            let now = clock.now();
            if now >= deadline {
                return;
            }

            let remaining = deadline - now;
            if remaining > self.step + self.worst_overshoot {
                clock.sleep(self.step);
                let slept = clock.now().saturating_sub(now);
                let over = slept.saturating_sub(self.step).min(OVERSHOOT_CAP);
                if over > self.worst_overshoot {
                    self.worst_overshoot = over;
                }
            } else {
                clock.spin();
            }
        }
    }
}

impl Default for HybridWait {
    fn default() -> Self {
        Self::new()
    }
}
