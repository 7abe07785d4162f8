//! Input device for fluidstep hosts.
//!
//! Gameplay reads the state its last simulation step consumed. Platform threads feed a separate
//! live state through [`LiveInput`], and the player extrapolator peeks at it between steps through
//! the [`fluidstep_core::InputSource`] impl on [`InputDevice`].

mod device;
mod events;
mod live;
mod state;

pub use device::{DashBindings, InputDevice};
pub use events::{GamepadButton, InputEvent, KeyCode, KeyState, KEY_COUNT};
pub use live::LiveInput;
pub use state::InputState;
