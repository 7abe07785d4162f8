use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic elapsed-time source for the tick scheduler.
///
/// `now` is measured from an arbitrary fixed origin and never goes backwards.
pub trait Clock {
    fn now(&self) -> Duration;

    /// Coarse OS-level sleep. May overshoot.
    fn sleep(&self, dur: Duration);

    /// One turn of a busy-wait.
    fn spin(&self) {
        std::hint::spin_loop();
    }
}

/// Wall clock over `Instant`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    #[inline]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    #[inline]
    fn sleep(&self, dur: Duration) {
        std::thread::sleep(dur);
    }

    #[inline]
    fn spin(&self) {
        std::thread::yield_now();
    }
}

/// Deterministic clock for tests and replays.
///
/// Time only moves when someone sleeps, spins or calls `advance`. Clones share the same timeline,
/// so a test can keep one handle while the scheduler owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
    sleep_overshoot: Duration,
    spin_quantum: Duration,
}

impl ManualClock {
    pub const DEFAULT_SPIN_QUANTUM: Duration = Duration::from_micros(10);

    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Duration::ZERO)),
            sleep_overshoot: Duration::ZERO,
            spin_quantum: Self::DEFAULT_SPIN_QUANTUM,
        }
    }

    /// Every sleep lands this much past the requested duration.
    pub fn with_sleep_overshoot(mut self, overshoot: Duration) -> Self {
        self.sleep_overshoot = overshoot;
        self
    }

    pub fn with_spin_quantum(mut self, quantum: Duration) -> Self {
        self.spin_quantum = quantum.max(Duration::from_nanos(1));
        self
    }

    #[inline]
    pub fn advance(&self, dur: Duration) {
        self.now.set(self.now.get() + dur);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Duration {
        self.now.get()
    }

    #[inline]
    fn sleep(&self, dur: Duration) {
        self.advance(dur + self.sleep_overshoot);
    }

    #[inline]
    fn spin(&self) {
        self.advance(self.spin_quantum);
    }
}
