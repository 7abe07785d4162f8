use crossbeam_channel::{Receiver, Sender};

use crate::host::{KindId, ObjectId};

/// Signals a host raises from inside its own callbacks.
///
/// They are queued and drained by the runtime at fixed points of the iteration, so the tracked
/// table is only ever mutated by the runtime itself.
#[derive(Debug, Clone, PartialEq)]
pub enum HostSignal {
    ObjectCreated { id: ObjectId, kind: KindId },
    ObjectDestroyed(ObjectId),
    /// Whole object graph rebuilt (state load, level restart).
    SceneReset,
    /// The actor-movement primitive pushed `actor` against `platform` during this step.
    PushCollision { actor: ObjectId, platform: ObjectId },
    SuppressNextDraw,
}

/// Runtime side of the signal channel.
pub struct SignalBus {
    tx: Sender<HostSignal>,
    rx: Receiver<HostSignal>,
}

impl SignalBus {
    #[inline]
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }

    /// Handle for the host. Clone freely.
    #[inline]
    pub fn sender(&self) -> SignalSender {
        SignalSender {
            tx: self.tx.clone(),
        }
    }

    #[inline]
    pub fn try_recv(&self) -> Option<HostSignal> {
        self.rx.try_recv().ok()
    }

    #[inline]
    pub fn drain_into(&self, out: &mut Vec<HostSignal>) -> usize {
        let mut n = 0usize;
        while let Ok(ev) = self.rx.try_recv() {
            out.push(ev);
            n += 1;
        }
        n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Host side of the signal channel.
///
/// Sends are fire-and-forget: the receiver lives as long as the runtime, and a signal sent after
/// shutdown has nothing left to act on.
#[derive(Clone)]
pub struct SignalSender {
    tx: Sender<HostSignal>,
}

impl SignalSender {
    #[inline]
    pub fn send(&self, signal: HostSignal) {
        let _ = self.tx.send(signal);
    }

    #[inline]
    pub fn object_created(&self, id: ObjectId, kind: KindId) {
        self.send(HostSignal::ObjectCreated { id, kind });
    }

    #[inline]
    pub fn object_destroyed(&self, id: ObjectId) {
        self.send(HostSignal::ObjectDestroyed(id));
    }

    #[inline]
    pub fn scene_reset(&self) {
        self.send(HostSignal::SceneReset);
    }

    #[inline]
    pub fn push_collision(&self, actor: ObjectId, platform: ObjectId) {
        self.send(HostSignal::PushCollision { actor, platform });
    }

    #[inline]
    pub fn suppress_next_draw(&self) {
        self.send(HostSignal::SuppressNextDraw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_in_send_order() {
        let bus = SignalBus::new();
        let tx = bus.sender();
        tx.object_created(ObjectId(1), KindId("entity"));
        tx.push_collision(ObjectId(1), ObjectId(2));
        tx.scene_reset();

        let mut out = Vec::new();
        assert_eq!(bus.drain_into(&mut out), 3);
        assert_eq!(
            out,
            vec![
                HostSignal::ObjectCreated {
                    id: ObjectId(1),
                    kind: KindId("entity")
                },
                HostSignal::PushCollision {
                    actor: ObjectId(1),
                    platform: ObjectId(2)
                },
                HostSignal::SceneReset,
            ]
        );
        assert!(bus.is_empty());
    }
}
