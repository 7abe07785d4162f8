use std::time::Duration;

use crate::error::FluidResult;
use crate::module::{Module, ModuleCtx};

/// Logs measured update and draw rates once per period.
///
/// Time is read from the frames' scheduler clock, so rates follow whatever clock drives the
/// runtime.
pub struct TelemetryModule {
    enabled: bool,
    period: Duration,

    pub update_rate: f32,
    pub draw_rate: f32,

    last: Option<Duration>,
    updates: u32,
    draws: u32,
    was_slow: bool,
}

impl TelemetryModule {
    pub fn new(enabled: bool, period: Duration) -> Self {
        Self {
            enabled,
            period: period.max(Duration::from_millis(250)),
            update_rate: 0.0,
            draw_rate: 0.0,
            last: None,
            updates: 0,
            draws: 0,
            was_slow: false,
        }
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    fn maybe_report(&mut self, running_slowly: bool, now: Duration) {
        let Some(last) = self.last else {
            self.last = Some(now);
            return;
        };

        let elapsed = now.saturating_sub(last);
        if elapsed < self.period {
            return;
        }

        let secs = elapsed.as_secs_f32().max(0.0001);
        self.update_rate = self.updates as f32 / secs;
        self.draw_rate = self.draws as f32 / secs;

        if self.enabled {
            log::info!(
                "telemetry: ups={:.1} dps={:.1} running_slowly={}",
                self.update_rate,
                self.draw_rate,
                running_slowly
            );
        }

        self.updates = 0;
        self.draws = 0;
        self.last = Some(now);
    }

    fn note_slow(&mut self, running_slowly: bool) {
        if running_slowly && !self.was_slow {
            log::warn!("telemetry: simulation is running slowly");
        }
        self.was_slow = running_slowly;
    }
}

impl Default for TelemetryModule {
    fn default() -> Self {
        Self::new(true, Duration::from_secs(1))
    }
}

impl Module for TelemetryModule {
    fn id(&self) -> &'static str {
        "telemetry"
    }

    fn fixed_update(&mut self, ctx: &mut ModuleCtx<'_>) -> FluidResult<()> {
        if self.last.is_none() {
            self.last = ctx.frame().map(|f| f.clock_time);
        }
        self.updates += 1;
        Ok(())
    }

    fn render(&mut self, ctx: &mut ModuleCtx<'_>) -> FluidResult<()> {
        self.draws += 1;
        let Some(frame) = ctx.frame().copied() else {
            return Ok(());
        };
        self.note_slow(frame.running_slowly);
        self.maybe_report(frame.running_slowly, frame.clock_time);
        Ok(())
    }
}
