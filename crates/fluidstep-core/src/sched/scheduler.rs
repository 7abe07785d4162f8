use std::time::Duration;

use log::{info, trace, warn};

use super::config::{Pacing, PacingPlan, SchedulerConfig};
use super::lag::{LagTracker, LagTransition};
use super::wait::HybridWait;
use crate::error::FluidResult;
use crate::frame::{Frame, FrameKind};
use crate::time::Clock;

/// What the scheduler drives. The runtime implements this over the host and the smoothing engine.
pub trait TickTarget {
    /// Platform/input polling. Called exactly once per real iteration.
    fn poll_events(&mut self) {}

    fn update(&mut self, frame: &Frame) -> FluidResult<()>;

    fn draw(&mut self, frame: &Frame) -> FluidResult<()>;

    /// Asked once per iteration after the updates ran; `true` skips the next due draw.
    fn take_draw_suppression(&mut self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IterationReport {
    pub updates: u32,
    pub drew: bool,
    pub draw_skipped: bool,
    pub waited: Duration,
}

/// Fixed-step main loop replacement.
///
/// Each call to [`run_one_iteration`](Self::run_one_iteration) waits for the next scheduled
/// event, then runs zero or more updates and at most one draw. Accumulators only ever shrink by
/// whole target intervals, so pacing does not drift with measurement noise.
pub struct TickScheduler<C: Clock> {
    clock: C,
    config: SchedulerConfig,
    plan: PacingPlan,

    previous: Duration,
    update_acc: Duration,
    draw_acc: Duration,
    /// Position inside the `draws_per_update` cycle (integer-ratio mode).
    draw_phase: u32,

    lag: LagTracker,
    waiter: HybridWait,

    suppress_next_draw: bool,
    update_index: u64,
    draw_index: u64,
    stopped: bool,
}

impl<C: Clock> TickScheduler<C> {
    pub fn new(clock: C, config: SchedulerConfig) -> FluidResult<Self> {
        let plan = config.plan()?;
        let previous = clock.now();
        Ok(Self {
            clock,
            config,
            lag: LagTracker::new(plan.lag_threshold),
            plan,
            previous,
            update_acc: Duration::ZERO,
            draw_acc: Duration::ZERO,
            draw_phase: 0,
            waiter: HybridWait::new(),
            suppress_next_draw: false,
            update_index: 0,
            draw_index: 0,
            stopped: false,
        })
    }

    /// Replaces the rates. Timing state restarts from now; counters are kept.
    pub fn configure(&mut self, config: SchedulerConfig) -> FluidResult<()> {
        let plan = config.plan()?;
        self.config = config;
        self.plan = plan;
        self.lag = LagTracker::new(plan.lag_threshold);
        self.reset_timing();
        info!(
            "scheduler configured: {:?} update={:?} draw={:?} draws_per_update={}",
            plan.pacing, plan.update_interval, plan.draw_interval, plan.draws_per_update
        );
        Ok(())
    }

    pub fn reset_timing(&mut self) {
        self.previous = self.clock.now();
        self.update_acc = Duration::ZERO;
        self.draw_acc = Duration::ZERO;
        self.draw_phase = 0;
    }

    #[inline]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    #[inline]
    pub fn plan(&self) -> &PacingPlan {
        &self.plan
    }

    #[inline]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[inline]
    pub fn update_count(&self) -> u64 {
        self.update_index
    }

    #[inline]
    pub fn draw_count(&self) -> u64 {
        self.draw_index
    }

    #[inline]
    pub fn is_running_slowly(&self) -> bool {
        self.lag.is_running_slowly()
    }

    /// One-shot: the next draw that would otherwise happen is skipped.
    #[inline]
    pub fn suppress_next_draw(&mut self) {
        self.suppress_next_draw = true;
    }

    #[inline]
    pub fn draw_suppressed(&self) -> bool {
        self.suppress_next_draw
    }

    #[inline]
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn run_one_iteration(&mut self, target: &mut dyn TickTarget) -> FluidResult<IterationReport> {
        let mut report = IterationReport::default();
        if self.stopped {
            return Ok(report);
        }

        self.advance();

        let wait = self.time_until_next_event();
        if !wait.is_zero() {
            let started = self.previous;
            self.waiter.wait_until(&self.clock, started + wait);
            self.advance();
            report.waited = self.previous.saturating_sub(started);
        }

        self.clamp_accumulators();

        target.poll_events();

        let draw_fraction = match self.plan.pacing {
            Pacing::IntegerRatio => self.run_ratio_updates(target, &mut report)?,
            Pacing::Independent => self.run_independent_updates(target, &mut report)?,
        };

        match self.lag.observe(report.updates) {
            Some(LagTransition::BecameSlow) => warn!(
                "running slowly: {} extra updates pending (update interval {:?})",
                self.lag.counter(),
                self.plan.update_interval
            ),
            Some(LagTransition::Recovered) => info!("caught up, no longer running slowly"),
            None => {}
        }

        if target.take_draw_suppression() {
            self.suppress_next_draw = true;
        }

        let Some(elapsed_fraction) = draw_fraction else {
            return Ok(report);
        };

        if self.suppress_next_draw {
            self.suppress_next_draw = false;
            report.draw_skipped = true;
            trace!("draw suppressed (update {})", self.update_index);
            return Ok(report);
        }

        self.draw_index += 1;
        let frame = Frame {
            kind: FrameKind::Draw,
            elapsed: self.plan.draw_interval,
            update_interval: self.plan.update_interval,
            elapsed_fraction,
            update_index: self.update_index,
            draw_index: self.draw_index,
            running_slowly: self.lag.is_running_slowly(),
            clock_time: self.previous,
        };
        target.draw(&frame)?;
        report.drew = true;

        Ok(report)
    }

    fn advance(&mut self) {
        let now = self.clock.now();
        let delta = now.saturating_sub(self.previous);
        if now > self.previous {
            self.previous = now;
        }
        self.update_acc += delta;
        self.draw_acc += delta;
    }

    fn time_until_next_event(&self) -> Duration {
        let to_draw = self.plan.draw_interval.saturating_sub(self.draw_acc);
        match self.plan.pacing {
            Pacing::IntegerRatio => to_draw,
            Pacing::Independent => {
                let to_update = self.plan.update_interval.saturating_sub(self.update_acc);
                to_update.min(to_draw)
            }
        }
    }

    fn clamp_accumulators(&mut self) {
        let max = self.plan.max_accumulated;
        if self.update_acc > max || self.draw_acc > max {
            trace!("accumulated time clamped to {max:?}");
        }
        self.update_acc = self.update_acc.min(max);
        self.draw_acc = self.draw_acc.min(max);
    }

    fn run_ratio_updates(
        &mut self,
        target: &mut dyn TickTarget,
        report: &mut IterationReport,
    ) -> FluidResult<Option<f32>> {
        let di = self.plan.draw_interval;
        let dpu = self.plan.draws_per_update;
        let mut phase_for_draw = None;
        while self.draw_acc >= di {
            self.draw_acc -= di;
            let due = self.draw_phase == 0;
            phase_for_draw = Some(self.draw_phase);
            // Advanced first: a failed update still uses up its slot.
            self.draw_phase = (self.draw_phase + 1) % dpu;
            if due {
                self.run_update(target)?;
                report.updates += 1;
            }
        }

        Ok(phase_for_draw.map(|phase| phase as f32 / dpu as f32))
    }

    fn run_independent_updates(
        &mut self,
        target: &mut dyn TickTarget,
        report: &mut IterationReport,
    ) -> FluidResult<Option<f32>> {
        let ui = self.plan.update_interval;
        while self.update_acc >= ui {
            self.update_acc -= ui;
            self.run_update(target)?;
            report.updates += 1;
        }

        let di = self.plan.draw_interval;
        if self.draw_acc < di {
            return Ok(None);
        }
        // A late draw is not repeated to catch up.
        while self.draw_acc >= di {
            self.draw_acc -= di;
        }

        Ok(Some((self.update_acc.as_secs_f64() / ui.as_secs_f64()) as f32))
    }

    fn run_update(&mut self, target: &mut dyn TickTarget) -> FluidResult<()> {
        self.update_index += 1;
        let frame = Frame {
            kind: FrameKind::Update,
            elapsed: self.plan.update_interval,
            update_interval: self.plan.update_interval,
            elapsed_fraction: 0.0,
            update_index: self.update_index,
            draw_index: self.draw_index,
            running_slowly: self.lag.is_running_slowly(),
            clock_time: self.previous,
        };
        target.update(&frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FluidError;
    use crate::time::ManualClock;

    #[derive(Default)]
    struct Counter {
        polls: u32,
        updates: u32,
        draws: u32,
        fractions: Vec<f32>,
        dispose_at_update: Option<u32>,
        fail_at_update: Option<u32>,
        suppress_once: bool,
    }

    impl TickTarget for Counter {
        fn poll_events(&mut self) {
            self.polls += 1;
        }

        fn update(&mut self, _frame: &Frame) -> FluidResult<()> {
            self.updates += 1;
            if self.dispose_at_update == Some(self.updates) {
                return Err(FluidError::HostDisposed);
            }
            if self.fail_at_update == Some(self.updates) {
                return Err(FluidError::other("step failed"));
            }
            Ok(())
        }

        fn draw(&mut self, frame: &Frame) -> FluidResult<()> {
            self.draws += 1;
            self.fractions.push(frame.elapsed_fraction);
            Ok(())
        }

        fn take_draw_suppression(&mut self) -> bool {
            std::mem::take(&mut self.suppress_once)
        }
    }

    fn run_for(
        sched: &mut TickScheduler<ManualClock>,
        clock: &ManualClock,
        target: &mut Counter,
        secs: u64,
    ) {
        let end = Duration::from_secs(secs);
        while clock.now() < end {
            sched.run_one_iteration(target).unwrap();
        }
    }

    #[test]
    fn integer_ratio_rates_hold_over_time() {
        let clock = ManualClock::new();
        let mut sched =
            TickScheduler::new(clock.clone(), SchedulerConfig::new(60.0, 240.0, Pacing::IntegerRatio))
                .unwrap();
        let mut target = Counter::default();

        run_for(&mut sched, &clock, &mut target, 2);

        assert!((target.updates as i64 - 120).abs() <= 1, "updates={}", target.updates);
        assert!((target.draws as i64 - 480).abs() <= 1, "draws={}", target.draws);
        assert!(!sched.is_running_slowly());
    }

    #[test]
    fn integer_ratio_fractions_cycle() {
        let clock = ManualClock::new();
        let mut sched =
            TickScheduler::new(clock.clone(), SchedulerConfig::new(60.0, 240.0, Pacing::IntegerRatio))
                .unwrap();
        let mut target = Counter::default();

        for _ in 0..8 {
            sched.run_one_iteration(&mut target).unwrap();
        }

        assert_eq!(target.updates, 2);
        assert_eq!(target.fractions, vec![0.0, 0.25, 0.5, 0.75, 0.0, 0.25, 0.5, 0.75]);
        assert_eq!(target.polls, 8);
    }

    #[test]
    fn independent_rates_hold_over_time() {
        let clock = ManualClock::new();
        let mut sched =
            TickScheduler::new(clock.clone(), SchedulerConfig::new(60.0, 144.0, Pacing::Independent))
                .unwrap();
        let mut target = Counter::default();

        run_for(&mut sched, &clock, &mut target, 3);

        assert!((target.updates as i64 - 180).abs() <= 1, "updates={}", target.updates);
        assert!((target.draws as i64 - 432).abs() <= 1, "draws={}", target.draws);
        assert!(target.fractions.iter().all(|f| (0.0..1.0).contains(f)));
    }

    #[test]
    fn sleep_overshoot_does_not_drift() {
        let clock = ManualClock::new().with_sleep_overshoot(Duration::from_micros(900));
        let mut sched =
            TickScheduler::new(clock.clone(), SchedulerConfig::new(50.0, 100.0, Pacing::IntegerRatio))
                .unwrap();
        let mut target = Counter::default();

        run_for(&mut sched, &clock, &mut target, 4);

        assert!((target.updates as i64 - 200).abs() <= 1, "updates={}", target.updates);
        assert!((target.draws as i64 - 400).abs() <= 1, "draws={}", target.draws);
    }

    #[test]
    fn suppression_skips_exactly_one_draw() {
        let clock = ManualClock::new();
        let mut sched =
            TickScheduler::new(clock.clone(), SchedulerConfig::new(60.0, 120.0, Pacing::IntegerRatio))
                .unwrap();
        let mut target = Counter::default();

        sched.suppress_next_draw();
        let r = sched.run_one_iteration(&mut target).unwrap();
        assert!(r.draw_skipped && !r.drew);
        assert_eq!(r.updates, 1);
        assert!(!sched.draw_suppressed());

        let r = sched.run_one_iteration(&mut target).unwrap();
        assert!(r.drew && !r.draw_skipped);
        assert_eq!(target.draws, 1);
        assert_eq!(sched.draw_count(), 1);
    }

    #[test]
    fn target_requested_suppression_applies_same_iteration() {
        let clock = ManualClock::new();
        let mut sched =
            TickScheduler::new(clock.clone(), SchedulerConfig::new(60.0, 60.0, Pacing::IntegerRatio))
                .unwrap();
        let mut target = Counter {
            suppress_once: true,
            ..Counter::default()
        };

        let r = sched.run_one_iteration(&mut target).unwrap();
        assert!(r.draw_skipped);
        let r = sched.run_one_iteration(&mut target).unwrap();
        assert!(r.drew);
    }

    #[test]
    fn stall_is_clamped_and_reports_running_slowly() {
        let clock = ManualClock::new();
        let mut cfg = SchedulerConfig::new(60.0, 60.0, Pacing::Independent);
        cfg.max_accumulated = Duration::from_millis(105);
        let mut sched = TickScheduler::new(clock.clone(), cfg).unwrap();
        let mut target = Counter::default();

        clock.advance(Duration::from_secs(5));
        let r = sched.run_one_iteration(&mut target).unwrap();

        // 105ms worth of 60 Hz steps, not 5 seconds worth.
        assert_eq!(r.updates, 6);
        assert!(sched.is_running_slowly());
    }

    #[test]
    fn disposed_host_aborts_iteration() {
        let clock = ManualClock::new();
        let mut sched =
            TickScheduler::new(clock.clone(), SchedulerConfig::new(60.0, 60.0, Pacing::Independent))
                .unwrap();
        let mut target = Counter {
            dispose_at_update: Some(1),
            ..Counter::default()
        };

        let err = sched.run_one_iteration(&mut target).unwrap_err();
        assert!(matches!(err, FluidError::HostDisposed));
        assert_eq!(target.draws, 0);
    }

    #[test]
    fn failed_update_keeps_the_ratio_phase() {
        let clock = ManualClock::new();
        let mut sched =
            TickScheduler::new(clock.clone(), SchedulerConfig::new(60.0, 240.0, Pacing::IntegerRatio))
                .unwrap();
        let mut target = Counter {
            fail_at_update: Some(2),
            ..Counter::default()
        };

        for _ in 0..4 {
            sched.run_one_iteration(&mut target).unwrap();
        }
        assert!(sched.run_one_iteration(&mut target).is_err());
        assert_eq!(target.updates, 2);

        for _ in 0..3 {
            let r = sched.run_one_iteration(&mut target).unwrap();
            assert_eq!(r.updates, 0);
            assert!(r.drew);
        }
        assert_eq!(sched.run_one_iteration(&mut target).unwrap().updates, 1);
        assert_eq!(&target.fractions[4..], &[0.25, 0.5, 0.75, 0.0]);
    }

    #[test]
    fn configure_restarts_timing_with_new_rates() {
        let clock = ManualClock::new();
        let mut cfg = SchedulerConfig::new(60.0, 60.0, Pacing::Independent);
        cfg.max_accumulated = Duration::from_millis(105);
        let mut sched = TickScheduler::new(clock.clone(), cfg).unwrap();
        let mut target = Counter::default();

        run_for(&mut sched, &clock, &mut target, 1);
        clock.advance(Duration::from_secs(5));
        sched.run_one_iteration(&mut target).unwrap();
        assert!(sched.is_running_slowly());

        clock.advance(Duration::from_millis(7));
        sched.advance();
        assert!(sched.draw_acc > Duration::ZERO);

        sched
            .configure(SchedulerConfig::new(50.0, 100.0, Pacing::IntegerRatio))
            .unwrap();
        assert_eq!(sched.update_acc, Duration::ZERO);
        assert_eq!(sched.draw_acc, Duration::ZERO);
        assert_eq!(sched.draw_phase, 0);
        assert_eq!(sched.previous, clock.now());
        assert!(!sched.is_running_slowly());
        assert_eq!(sched.plan().draws_per_update, 2);

        let (updates, draws) = (target.updates, target.draws);
        let end = clock.now() + Duration::from_secs(2);
        while clock.now() < end {
            sched.run_one_iteration(&mut target).unwrap();
        }
        let updates = (target.updates - updates) as i64;
        let draws = (target.draws - draws) as i64;
        assert!((updates - 100).abs() <= 1, "updates={updates}");
        assert!((draws - 200).abs() <= 1, "draws={draws}");
        assert!(!sched.is_running_slowly());

        let before = *sched.plan();
        let err = sched
            .configure(SchedulerConfig::new(0.0, 60.0, Pacing::IntegerRatio))
            .unwrap_err();
        assert!(matches!(err, FluidError::Config(_)));
        assert_eq!(*sched.plan(), before);
        assert_eq!(sched.config().update_hz, 50.0);
    }

    #[test]
    fn stopped_scheduler_does_nothing() {
        let clock = ManualClock::new();
        let mut sched = TickScheduler::new(clock.clone(), SchedulerConfig::default()).unwrap();
        let mut target = Counter::default();

        sched.stop();
        let r = sched.run_one_iteration(&mut target).unwrap();
        assert_eq!(r, IterationReport::default());
        assert_eq!(clock.now(), Duration::ZERO);
    }
}
