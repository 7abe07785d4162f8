use serde::{Deserialize, Serialize};

use super::history::History;
use super::value::Smoothable;

/// Distance, in world units, above which one step's movement counts as a teleport.
pub const DEFAULT_TELEPORT_THRESHOLD: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SmoothingMode {
    /// Draw the newest simulation state as is.
    None,
    /// Blend between the two newest samples. One step of latency, never overshoots.
    #[default]
    Interpolate,
    /// Project the last step's motion forward. No latency, may overshoot on sudden stops.
    Extrapolate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothParams {
    pub mode: SmoothingMode,
    pub fraction: f32,
    pub time_rate: f32,
    pub teleport_threshold: f32,
}

/// Either of the two newest samples is unset, or they are further apart than `threshold`.
pub fn snaps<T: Smoothable>(history: &History<T>, threshold: f32) -> bool {
    let Some(newest) = history.newest() else {
        return false;
    };
    if newest.is_unset() {
        return true;
    }
    let Some(previous) = history.previous() else {
        return false;
    };
    previous.is_unset()
        || T::distance_squared(previous, newest).is_some_and(|d2| d2 > threshold * threshold)
}

/// Smoothed value for one history, or `authoritative` when smoothing is cancelled.
///
/// Cancelled when: fewer than two samples, either sample is unset, the samples are identical,
/// or they are further apart than the teleport threshold.
pub fn smooth<T: Smoothable>(history: &History<T>, authoritative: T, p: &SmoothParams) -> T {
    let (Some(newest), Some(previous)) = (history.newest(), history.previous()) else {
        return authoritative;
    };

    if p.mode == SmoothingMode::None {
        return newest;
    }

    if newest == previous || snaps(history, p.teleport_threshold) {
        return authoritative;
    }

    match p.mode {
        SmoothingMode::Interpolate => T::interpolate(previous, newest, p.fraction.clamp(0.0, 1.0)),
        SmoothingMode::Extrapolate => T::extrapolate(previous, newest, p.fraction * p.time_rate),
        SmoothingMode::None => newest,
    }
}
