use std::collections::HashMap;

use crate::host::{HostWorld, ObjectId};
use crate::smoothing::{KindRole, SmoothingEngine};

/// Which platforms moved which actors during the current simulation step.
///
/// Rebuilt every step: cleared before the host steps, filled from push collisions during the step
/// and from platform riders after it.
#[derive(Debug, Default)]
pub struct PusherOffsetTracker {
    pushers: HashMap<ObjectId, Vec<ObjectId>>,
    scratch: Vec<ObjectId>,
}

impl PusherOffsetTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous step's associations.
    pub fn begin_step(&mut self) {
        self.pushers.clear();
    }

    pub fn record_push(&mut self, actor: ObjectId, platform: ObjectId) {
        if actor == platform {
            return;
        }
        let set = self.pushers.entry(actor).or_default();
        if !set.contains(&platform) {
            set.push(platform);
        }
    }

    /// Adds every rider of every platform that moved this step.
    pub fn collect_riders<W: HostWorld>(&mut self, world: &W, engine: &SmoothingEngine<W>) {
        let mut riders = std::mem::take(&mut self.scratch);
        for state in engine.states() {
            if state.role() != KindRole::Platform || !state.changed() {
                continue;
            }
            riders.clear();
            world.riders(state.id(), &mut riders);
            for &actor in &riders {
                self.record_push(actor, state.id());
            }
        }
        riders.clear();
        self.scratch = riders;
    }

    /// Platforms that moved `actor` this step, in the order they were recorded.
    #[inline]
    pub fn pushers_of(&self, actor: ObjectId) -> &[ObjectId] {
        self.pushers.get(&actor).map(Vec::as_slice).unwrap_or(&[])
    }

    #[inline]
    pub fn is_pushed(&self, actor: ObjectId) -> bool {
        !self.pushers_of(actor).is_empty()
    }

    /// Drops `actor` entirely, used when the object is untracked.
    pub fn forget(&mut self, actor: ObjectId) {
        self.pushers.remove(&actor);
        self.pushers.retain(|_, set| {
            set.retain(|p| *p != actor);
            !set.is_empty()
        });
    }

    /// Number of actors moved by at least one platform this step.
    #[inline]
    pub fn len(&self) -> usize {
        self.pushers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pushers.is_empty()
    }

    pub fn clear(&mut self) {
        self.pushers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pushes_are_deduplicated_and_cleared_per_step() {
        let mut t = PusherOffsetTracker::new();
        t.record_push(ObjectId(1), ObjectId(10));
        t.record_push(ObjectId(1), ObjectId(10));
        t.record_push(ObjectId(1), ObjectId(11));
        assert_eq!(t.pushers_of(ObjectId(1)), &[ObjectId(10), ObjectId(11)]);

        t.begin_step();
        assert!(!t.is_pushed(ObjectId(1)));
        assert!(t.pushers_of(ObjectId(2)).is_empty());
    }

    #[test]
    fn transient_actors_do_not_accumulate() {
        let mut t = PusherOffsetTracker::new();
        for step in 0..100 {
            t.begin_step();
            t.record_push(ObjectId(1000 + step), ObjectId(10));
            assert_eq!(t.len(), 1);
        }
        t.begin_step();
        assert!(t.is_empty());
    }

    #[test]
    fn self_push_is_ignored() {
        let mut t = PusherOffsetTracker::new();
        t.record_push(ObjectId(3), ObjectId(3));
        assert!(!t.is_pushed(ObjectId(3)));
    }

    #[test]
    fn forget_removes_both_directions() {
        let mut t = PusherOffsetTracker::new();
        t.record_push(ObjectId(1), ObjectId(10));
        t.record_push(ObjectId(10), ObjectId(20));
        t.forget(ObjectId(10));
        assert!(!t.is_pushed(ObjectId(1)));
        assert!(!t.is_pushed(ObjectId(10)));
        assert!(t.is_empty());
    }
}
