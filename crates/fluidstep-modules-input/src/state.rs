use crate::events::{GamepadButton, InputEvent, KeyCode, KeyState, KEY_COUNT};

/// Held keys and buttons plus the edges seen since the last `begin_frame`.
#[derive(Debug, Clone, PartialEq)]
pub struct InputState {
    pub keys_down: Vec<bool>,
    pub keys_pressed: Vec<bool>,
    pub keys_released: Vec<bool>,

    pub buttons_down_bits: u32,
    pub buttons_pressed_bits: u32,
    pub buttons_released_bits: u32,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    #[inline]
    pub fn new() -> Self {
        Self {
            keys_down: vec![false; KEY_COUNT],
            keys_pressed: vec![false; KEY_COUNT],
            keys_released: vec![false; KEY_COUNT],

            buttons_down_bits: 0,
            buttons_pressed_bits: 0,
            buttons_released_bits: 0,
        }
    }

    /// Clears edges; held state carries over.
    #[inline(always)]
    pub fn begin_frame(&mut self) {
        self.keys_pressed.fill(false);
        self.keys_released.fill(false);

        self.buttons_pressed_bits = 0;
        self.buttons_released_bits = 0;
    }

    #[inline(always)]
    pub fn apply(&mut self, ev: &InputEvent) {
        match *ev {
            InputEvent::Key {
                code,
                state,
                repeat,
            } => self.apply_key(code, state, repeat),
            InputEvent::Button { button, pressed } => self.apply_button(button, pressed),
            InputEvent::FocusLost => self.release_all(),
        }
    }

    #[inline(always)]
    fn apply_key(&mut self, code: KeyCode, state: KeyState, repeat: bool) {
        let idx = code.to_index();
        if idx >= self.keys_down.len() {
            return;
        }

        match state {
            KeyState::Pressed => {
                if !repeat && !self.keys_down[idx] {
                    self.keys_pressed[idx] = true;
                }
                self.keys_down[idx] = true;
            }
            KeyState::Released => {
                if self.keys_down[idx] {
                    self.keys_released[idx] = true;
                }
                self.keys_down[idx] = false;
            }
        }
    }

    #[inline(always)]
    fn apply_button(&mut self, button: GamepadButton, pressed: bool) {
        let bit = button.bit();
        let was_down = self.buttons_down_bits & bit != 0;

        if pressed {
            if !was_down {
                self.buttons_pressed_bits |= bit;
            }
            self.buttons_down_bits |= bit;
        } else {
            if was_down {
                self.buttons_released_bits |= bit;
            }
            self.buttons_down_bits &= !bit;
        }
    }

    fn release_all(&mut self) {
        for (down, released) in self.keys_down.iter_mut().zip(self.keys_released.iter_mut()) {
            if *down {
                *released = true;
                *down = false;
            }
        }
        self.buttons_released_bits |= self.buttons_down_bits;
        self.buttons_down_bits = 0;
    }

    #[inline]
    pub fn key_down(&self, code: KeyCode) -> bool {
        self.keys_down.get(code.to_index()).copied().unwrap_or(false)
    }

    #[inline]
    pub fn key_pressed(&self, code: KeyCode) -> bool {
        self.keys_pressed.get(code.to_index()).copied().unwrap_or(false)
    }

    #[inline]
    pub fn key_released(&self, code: KeyCode) -> bool {
        self.keys_released.get(code.to_index()).copied().unwrap_or(false)
    }

    #[inline]
    pub fn button_down(&self, button: GamepadButton) -> bool {
        self.buttons_down_bits & button.bit() != 0
    }

    #[inline]
    pub fn button_pressed(&self, button: GamepadButton) -> bool {
        self.buttons_pressed_bits & button.bit() != 0
    }
}
