use fluidstep_core::InputSource;
use serde::{Deserialize, Serialize};

use crate::events::{GamepadButton, KeyCode};
use crate::live::LiveInput;
use crate::state::InputState;

/// Keys and buttons that start a dash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashBindings {
    #[serde(default = "default_dash_keys")]
    pub keys: Vec<KeyCode>,
    #[serde(default = "default_dash_buttons")]
    pub buttons: Vec<GamepadButton>,
}

fn default_dash_keys() -> Vec<KeyCode> { vec![KeyCode::X, KeyCode::C] }
fn default_dash_buttons() -> Vec<GamepadButton> { vec![GamepadButton::West, GamepadButton::East] }

impl Default for DashBindings {
    fn default() -> Self {
        Self {
            keys: default_dash_keys(),
            buttons: default_dash_buttons(),
        }
    }
}

impl DashBindings {
    pub fn triggered(&self, state: &InputState) -> bool {
        self.keys.iter().any(|&k| state.key_pressed(k))
            || self.buttons.iter().any(|&b| state.button_pressed(b))
    }
}

/// Input as the simulation sees it.
///
/// `state()` is what the last step consumed. Between steps the player extrapolator may install the
/// live state for a peek; it is always put back before gameplay reads again.
pub struct InputDevice {
    live: LiveInput,
    current: InputState,
    stash: InputState,
    peeking: bool,
    bindings: DashBindings,
}

impl InputDevice {
    pub fn new(live: LiveInput, bindings: DashBindings) -> Self {
        Self {
            live,
            current: InputState::new(),
            stash: InputState::new(),
            peeking: false,
            bindings,
        }
    }

    /// Call at the start of every simulation step.
    pub fn begin_step(&mut self) {
        if self.peeking {
            log::warn!("input: step began during a live peek; restoring consumed state");
            self.restore_consumed();
        }
        self.live.consume_into(&mut self.current);
    }

    #[inline]
    pub fn state(&self) -> &InputState {
        &self.current
    }

    #[inline]
    pub fn live(&self) -> &LiveInput {
        &self.live
    }

    #[inline]
    pub fn bindings(&self) -> &DashBindings {
        &self.bindings
    }

    pub fn set_bindings(&mut self, bindings: DashBindings) {
        log::debug!("input: dash bindings {:?}", bindings);
        self.bindings = bindings;
    }

    #[inline]
    pub fn is_peeking(&self) -> bool {
        self.peeking
    }
}

impl InputSource for InputDevice {
    fn install_live(&mut self) {
        if self.peeking {
            return;
        }
        std::mem::swap(&mut self.current, &mut self.stash);
        self.live.copy_into(&mut self.current);
        self.peeking = true;
    }

    fn restore_consumed(&mut self) {
        if !self.peeking {
            return;
        }
        std::mem::swap(&mut self.current, &mut self.stash);
        self.peeking = false;
    }

    fn dash_pressed(&self) -> bool {
        self.bindings.triggered(&self.current)
    }
}
