//! Player extrapolation.
//!
//! The player is the one object drawn ahead of the simulation rather than behind it. The prediction
//! is abandoned for the rest of the step as soon as fresh input would make it wrong.

use crate::math::Vec2;

/// Host input device as seen by the extrapolator's peek.
///
/// The device normally holds the state the last simulation step consumed. `install_live` swaps in
/// the state accumulated since then; `restore_consumed` swaps it back.
pub trait InputSource {
    fn install_live(&mut self);

    fn restore_consumed(&mut self);

    /// A dash binding went down in the installed state.
    fn dash_pressed(&self) -> bool;
}

/// Scoped live-input view. The consumed state is restored when the guard drops, whatever happens
/// while it is held.
pub struct InputPeek<'a> {
    source: &'a mut dyn InputSource,
}

impl<'a> InputPeek<'a> {
    pub fn new(source: &'a mut dyn InputSource) -> Self {
        source.install_live();
        Self { source }
    }

    #[inline]
    pub fn dash_pressed(&self) -> bool {
        self.source.dash_pressed()
    }
}

impl Drop for InputPeek<'_> {
    fn drop(&mut self) {
        self.source.restore_consumed();
    }
}

/// Inputs of one player extrapolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerFrame {
    pub previous: Vec2,
    pub newest: Vec2,
    /// Current position on the object.
    pub authoritative: Vec2,
    pub fraction: f32,
    pub time_rate: f32,
    pub frozen: bool,
    pub gravity_inverted: bool,
    /// Sum of the smoothing deltas of whatever pushed the player this step.
    pub push_offset: Option<Vec2>,
    pub teleport_threshold: f32,
}

#[derive(Debug, Default)]
pub struct PlayerExtrapolator {
    cancelled: bool,
}

impl PlayerExtrapolator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called before every simulation step.
    #[inline]
    pub fn on_update(&mut self) {
        self.cancelled = false;
    }

    /// Extrapolation is off until the next step.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    #[inline]
    pub fn cancel(&mut self) {
        if !self.cancelled {
            log::trace!("player: extrapolation cancelled until next update");
        }
        self.cancelled = true;
    }

    pub fn extrapolate(&mut self, f: &PlayerFrame, input: Option<&mut dyn InputSource>) -> Vec2 {
        if f.frozen {
            return f.authoritative;
        }
        if f.newest == f.previous {
            return f.authoritative;
        }
        if f.newest.distance_squared(f.previous) > f.teleport_threshold * f.teleport_threshold {
            return f.authoritative;
        }
        if self.cancelled {
            return f.authoritative;
        }

        if let Some(source) = input {
            let peek = InputPeek::new(source);
            if peek.dash_pressed() {
                self.cancel();
                return f.authoritative;
            }
        }

        let mut step = f.newest - f.previous;
        if f.gravity_inverted {
            step.y = -step.y;
        }

        let base = match f.push_offset {
            Some(offset) => f.authoritative + offset,
            None => f.newest,
        };
        base + step * (f.fraction * f.time_rate)
    }
}
