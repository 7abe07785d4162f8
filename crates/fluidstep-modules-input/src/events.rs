use serde::{Deserialize, Serialize};

#[rustfmt::skip]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyCode {
    Escape,
    Enter,
    Space,
    Tab,
    Backspace,
    LeftShift,
    LeftCtrl,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    Unknown,
}

pub const KEY_COUNT: usize = KeyCode::Unknown as usize + 1;

impl KeyCode {
    #[inline(always)]
    pub const fn to_index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GamepadButton {
    South,
    East,
    West,
    North,
    Start,
    Select,
    L1,
    R1,
    L2,
    R2,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
}

impl GamepadButton {
    #[inline(always)]
    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Raw event as delivered by the platform layer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    Key {
        code: KeyCode,
        state: KeyState,
        repeat: bool,
    },
    Button {
        button: GamepadButton,
        pressed: bool,
    },
    /// Window lost focus: everything held is released.
    FocusLost,
}
