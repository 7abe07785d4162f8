use std::sync::Arc;

use parking_lot::RwLock;

use crate::events::InputEvent;
use crate::state::InputState;

/// Shared handle to the live input state.
///
/// Clones share one state, so a platform thread can push while the runtime thread reads.
#[derive(Clone, Default)]
pub struct LiveInput {
    state: Arc<RwLock<InputState>>,
}

impl LiveInput {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&self, ev: InputEvent) {
        self.state.write().apply(&ev);
    }

    pub fn push_all(&self, events: impl IntoIterator<Item = InputEvent>) {
        let mut g = self.state.write();
        for ev in events {
            g.apply(&ev);
        }
    }

    #[inline]
    pub fn snapshot(&self) -> InputState {
        self.state.read().clone()
    }

    /// Copies the live state into `out` without reallocating it.
    #[inline]
    pub fn copy_into(&self, out: &mut InputState) {
        out.clone_from(&self.state.read());
    }

    /// Hands the live state to a simulation step and starts a new edge window.
    pub(crate) fn consume_into(&self, out: &mut InputState) {
        let mut g = self.state.write();
        out.clone_from(&g);
        g.begin_frame();
    }
}
