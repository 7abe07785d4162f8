use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{FluidError, FluidResult};

/// How update and draw cadences relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pacing {
    /// Draws are the heartbeat; one update runs every `draws_per_update` draws.
    #[default]
    IntegerRatio,
    /// Update and draw run on unrelated intervals, each with its own accumulator.
    Independent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    pub update_hz: f64,
    pub draw_hz: f64,
    pub pacing: Pacing,
    /// Accumulated time is clamped to this after a stall.
    pub max_accumulated: Duration,
    /// Extra updates that must pile up before reporting "running slowly".
    pub lag_threshold: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            update_hz: 60.0,
            draw_hz: 240.0,
            pacing: Pacing::IntegerRatio,
            max_accumulated: Duration::from_millis(500),
            lag_threshold: 5,
        }
    }
}

/// Validated, precomputed intervals the scheduler actually runs on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacingPlan {
    pub pacing: Pacing,
    pub update_interval: Duration,
    pub draw_interval: Duration,
    /// Always 1 in independent mode.
    pub draws_per_update: u32,
    /// Effective draw rate after rounding.
    pub draw_hz: f64,
    pub max_accumulated: Duration,
    pub lag_threshold: u32,
}

const RATIO_EPSILON: f64 = 1e-6;

impl SchedulerConfig {
    #[inline]
    pub fn new(update_hz: f64, draw_hz: f64, pacing: Pacing) -> Self {
        Self {
            update_hz,
            draw_hz,
            pacing,
            ..Self::default()
        }
    }

    /// Validates the rates and derives the intervals.
    ///
    /// In integer-ratio mode a draw rate that is not a multiple of the update rate is rounded up
    /// to the next multiple, with a warning.
    pub fn plan(&self) -> FluidResult<PacingPlan> {
        check_rate("update_hz", self.update_hz)?;
        check_rate("draw_hz", self.draw_hz)?;

        let (update_interval, draw_interval, draws_per_update, draw_hz) = match self.pacing {
            Pacing::IntegerRatio => {
                let ratio = self.draw_hz / self.update_hz;
                let nearest = ratio.round();
                let dpu = if (ratio - nearest).abs() <= RATIO_EPSILON {
                    nearest
                } else {
                    ratio.ceil()
                }
                .max(1.0);

                if dpu > u32::MAX as f64 {
                    return Err(FluidError::config(format!(
                        "draw_hz {} is too far above update_hz {}",
                        self.draw_hz, self.update_hz
                    )));
                }
                let dpu = dpu as u32;

                let draw_hz = self.update_hz * dpu as f64;
                if (draw_hz - self.draw_hz).abs() > RATIO_EPSILON {
                    warn!(
                        "draw rate {} Hz is not a multiple of update rate {} Hz; using {} Hz",
                        self.draw_hz, self.update_hz, draw_hz
                    );
                }

                let draw_interval = interval_of("draw_hz", draw_hz)?;
                (draw_interval * dpu, draw_interval, dpu, draw_hz)
            }
            Pacing::Independent => (
                interval_of("update_hz", self.update_hz)?,
                interval_of("draw_hz", self.draw_hz)?,
                1,
                self.draw_hz,
            ),
        };

        let floor = update_interval.max(draw_interval);
        let max_accumulated = if self.max_accumulated < floor {
            warn!(
                "max_accumulated {:?} is shorter than one interval; raising it to {:?}",
                self.max_accumulated, floor
            );
            floor
        } else {
            self.max_accumulated
        };

        Ok(PacingPlan {
            pacing: self.pacing,
            update_interval,
            draw_interval,
            draws_per_update,
            draw_hz,
            max_accumulated,
            lag_threshold: self.lag_threshold.max(1),
        })
    }
}

fn check_rate(name: &str, hz: f64) -> FluidResult<()> {
    if hz.is_finite() && hz > 0.0 {
        Ok(())
    } else {
        Err(FluidError::config(format!(
            "{name} must be a positive finite rate, got {hz}"
        )))
    }
}

fn interval_of(name: &str, hz: f64) -> FluidResult<Duration> {
    let interval = Duration::try_from_secs_f64(1.0 / hz)
        .map_err(|e| FluidError::config(format!("{name} {hz} has no usable interval: {e}")))?;
    if interval.is_zero() {
        return Err(FluidError::config(format!(
            "{name} {hz} is too high to schedule"
        )));
    }
    Ok(interval)
}
