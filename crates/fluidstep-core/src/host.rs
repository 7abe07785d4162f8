use crate::error::FluidResult;
use crate::frame::Frame;
use crate::player::InputSource;

/// Identity of a host-owned object. Compared by identity only; the host guarantees an id is not
/// reused while the object it named is still tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

/// Runtime kind/category of a host object, used to pick its accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KindId(pub &'static str);

impl KindId {
    #[inline]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

/// Queries the core makes against the host's object graph.
///
/// Everything has a neutral default so small hosts only implement what they have.
pub trait HostWorld {
    /// Every live object the core may track, used to repopulate after a scene reset.
    fn live_objects(&self, out: &mut Vec<(ObjectId, KindId)>);

    /// The actively controlled player, if any.
    fn player(&self) -> Option<ObjectId> {
        None
    }

    /// Actors currently riding `platform`.
    fn riders(&self, _platform: ObjectId, _out: &mut Vec<ObjectId>) {}

    /// Whether `object` is being carried by the player this step.
    fn carried_by_player(&self, _object: ObjectId) -> bool {
        false
    }

    /// Gravity inversion of `player`. `None` means the host has no such notion.
    fn gravity_inverted(&self, _player: ObjectId) -> Option<bool> {
        None
    }

    /// Paused, transitioning between areas or globally frozen.
    fn simulation_frozen(&self) -> bool {
        false
    }

    /// Product of the host's global time-rate multipliers.
    fn time_rate(&self) -> f32 {
        1.0
    }

    /// Live input device used by the player extrapolator's peek.
    fn input(&mut self) -> Option<&mut dyn InputSource> {
        None
    }
}

/// The cooperating host application.
///
/// The runtime owns pacing; the host only does its per-step and per-draw work when called.
pub trait Host {
    type World: HostWorld;

    fn world(&self) -> &Self::World;

    fn world_mut(&mut self) -> &mut Self::World;

    /// Platform/input event pump, once per real iteration.
    fn poll_events(&mut self) {}

    /// One fixed simulation step.
    fn update(&mut self, frame: &Frame) -> FluidResult<()>;

    /// One draw call. Tracked objects hold their smoothed values for its duration.
    fn draw(&mut self, frame: &Frame) -> FluidResult<()>;

    /// Set once the host tore itself down; checked after every update.
    fn is_disposed(&self) -> bool {
        false
    }
}
