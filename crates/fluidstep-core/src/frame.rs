use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Update,
    Draw,
}

/// Timing snapshot handed to the host for one update or draw call.
///
/// - **Update frame**: `elapsed == update_interval`, `elapsed_fraction == 0.0`.
/// - **Draw frame**: `elapsed` is the target draw interval, never the raw measured time, so
///   delta-time driven render effects stay stable under scheduling jitter.
///
/// `elapsed_fraction` is how far, in update intervals, real time has moved past the newest
/// simulation step. It is usually in `[0..1)` but exceeds 1 while lagging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub kind: FrameKind,

    /// Elapsed time credited to this call.
    pub elapsed: Duration,

    /// Fixed simulation step size.
    pub update_interval: Duration,

    /// Fraction of an update interval elapsed since the newest simulation step.
    pub elapsed_fraction: f32,

    /// Monotonic update index. For draw frames, the value after all updates of the iteration.
    pub update_index: u64,

    /// Monotonic draw index. Skipped draws do not advance it.
    pub draw_index: u64,

    pub running_slowly: bool,

    /// Scheduler clock reading when the iteration that issued this call woke up.
    pub clock_time: Duration,
}

impl Frame {
    #[inline]
    pub fn is_update(&self) -> bool {
        self.kind == FrameKind::Update
    }

    #[inline]
    pub fn is_draw(&self) -> bool {
        self.kind == FrameKind::Draw
    }
}
