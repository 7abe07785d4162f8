#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};

use fluidstep_core::{
    Accessor, FnAccessor, FnPathAccessor, HostWorld, InputSource, KindId, KindSpec, ObjectId,
    PlayerExtrapolator, PusherOffsetTracker, Sample, SmoothingEngine, SmoothingMode,
    SmoothingSettings, Vec2,
};

pub const ENTITY: KindId = KindId("entity");
pub const CAMERA: KindId = KindId("camera");
pub const PLATFORM: KindId = KindId("platform");
pub const TRACK: KindId = KindId("track");

/// Path of every `TRACK` object: a horizontal line at y = 40, 100 units long.
pub fn track_path(percent: f32) -> Vec2 {
    Vec2::new(percent * 100.0, 40.0)
}

#[derive(Debug, Clone)]
pub struct Body {
    pub kind: KindId,
    pub pos: Vec2,
    pub percent: f32,
    pub visible: bool,
    pub boosting: bool,
}

impl Body {
    pub fn at(kind: KindId, pos: Vec2) -> Self {
        Self {
            kind,
            pos,
            percent: 0.0,
            visible: true,
            boosting: false,
        }
    }

    pub fn on_track(percent: f32) -> Self {
        Self {
            percent,
            ..Self::at(TRACK, Vec2::ZERO)
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeInput {
    pub live_dash: bool,
    installed: bool,
    pub peeks: u32,
    pub restores: u32,
}

impl InputSource for FakeInput {
    fn install_live(&mut self) {
        self.installed = true;
        self.peeks += 1;
    }

    fn restore_consumed(&mut self) {
        self.installed = false;
        self.restores += 1;
    }

    fn dash_pressed(&self) -> bool {
        self.installed && self.live_dash
    }
}

#[derive(Debug)]
pub struct FakeWorld {
    pub bodies: BTreeMap<ObjectId, Body>,
    pub player: Option<ObjectId>,
    pub riders: HashMap<ObjectId, Vec<ObjectId>>,
    pub carried: Vec<ObjectId>,
    pub frozen: bool,
    pub gravity_inverted: Option<bool>,
    pub time_rate: f32,
    pub input: Option<FakeInput>,
}

impl Default for FakeWorld {
    fn default() -> Self {
        Self {
            bodies: BTreeMap::new(),
            player: None,
            riders: HashMap::new(),
            carried: Vec::new(),
            frozen: false,
            gravity_inverted: None,
            time_rate: 1.0,
            input: None,
        }
    }
}

impl FakeWorld {
    pub fn spawn(&mut self, id: u64, body: Body) -> ObjectId {
        let id = ObjectId(id);
        self.bodies.insert(id, body);
        id
    }

    pub fn pos(&self, id: ObjectId) -> Vec2 {
        self.bodies[&id].pos
    }

    pub fn set_pos(&mut self, id: ObjectId, pos: Vec2) {
        if let Some(b) = self.bodies.get_mut(&id) {
            b.pos = pos;
        }
    }

    pub fn set_percent(&mut self, id: ObjectId, percent: f32) {
        if let Some(b) = self.bodies.get_mut(&id) {
            b.percent = percent;
        }
    }
}

impl HostWorld for FakeWorld {
    fn live_objects(&self, out: &mut Vec<(ObjectId, KindId)>) {
        out.extend(self.bodies.iter().map(|(id, b)| (*id, b.kind)));
    }

    fn player(&self) -> Option<ObjectId> {
        self.player
    }

    fn riders(&self, platform: ObjectId, out: &mut Vec<ObjectId>) {
        if let Some(r) = self.riders.get(&platform) {
            out.extend_from_slice(r);
        }
    }

    fn carried_by_player(&self, object: ObjectId) -> bool {
        self.carried.contains(&object)
    }

    fn gravity_inverted(&self, _player: ObjectId) -> Option<bool> {
        self.gravity_inverted
    }

    fn simulation_frozen(&self) -> bool {
        self.frozen
    }

    fn time_rate(&self) -> f32 {
        self.time_rate
    }

    fn input(&mut self) -> Option<&mut dyn InputSource> {
        self.input.as_mut().map(|i| i as &mut dyn InputSource)
    }
}

fn position_accessor() -> FnAccessor<FakeWorld, Vec2> {
    FnAccessor::new(
        |w: &FakeWorld, id| w.pos(id),
        |w: &mut FakeWorld, id, v| w.set_pos(id, v),
    )
    .with_visibility(|w: &FakeWorld, id| w.bodies.get(&id).is_some_and(|b| b.visible))
}

/// Accessors for every kind the fake world has.
pub fn kinds() -> Vec<(KindId, KindSpec, Accessor<FakeWorld>)> {
    vec![
        (ENTITY, KindSpec::generic(), Accessor::position(position_accessor())),
        (CAMERA, KindSpec::camera(), Accessor::position(position_accessor())),
        (PLATFORM, KindSpec::platform(), Accessor::position(position_accessor())),
        (
            TRACK,
            KindSpec::platform().with_history_depth(3),
            Accessor::percent(FnPathAccessor::new(
                FnAccessor::new(
                    |w: &FakeWorld, id| w.bodies[&id].percent,
                    |w: &mut FakeWorld, id, v| w.set_percent(id, v),
                ),
                |_w: &FakeWorld, _id, p| track_path(p),
            )),
        ),
    ]
}

pub fn register_kinds(engine: &mut SmoothingEngine<FakeWorld>) {
    for (kind, spec, accessor) in kinds() {
        engine.register_kind(kind, spec, accessor);
    }
}

/// Engine plus the per-step collaborators, driven by hand.
pub struct Harness {
    pub world: FakeWorld,
    pub engine: SmoothingEngine<FakeWorld>,
    pub pushers: PusherOffsetTracker,
    pub player: PlayerExtrapolator,
}

impl Harness {
    pub fn new(settings: SmoothingSettings) -> Self {
        let mut engine = SmoothingEngine::new(settings);
        register_kinds(&mut engine);
        Self {
            world: FakeWorld::default(),
            engine,
            pushers: PusherOffsetTracker::new(),
            player: PlayerExtrapolator::new(),
        }
    }

    pub fn track_all(&mut self) {
        self.engine.rescan(&self.world);
    }

    /// One simulation step: `f` plays the host's update.
    pub fn step(&mut self, f: impl FnOnce(&mut FakeWorld, &mut PusherOffsetTracker)) {
        self.pushers.begin_step();
        self.player.on_update();
        f(&mut self.world, &mut self.pushers);
        self.engine.update_history(&self.world);
        self.pushers.collect_riders(&self.world, &self.engine);
    }

    pub fn compute(&mut self, fraction: f32) {
        self.engine
            .compute_smoothed(&mut self.world, fraction, &self.pushers, &mut self.player);
    }

    pub fn smoothed(&self, id: ObjectId) -> Sample {
        self.engine
            .state(id)
            .and_then(|s| s.smoothed())
            .expect("object has a smoothed value")
    }

    pub fn smoothed_pos(&self, id: ObjectId) -> Vec2 {
        self.smoothed(id).as_position().expect("position sample")
    }
}

pub fn settings(mode: SmoothingMode) -> SmoothingSettings {
    SmoothingSettings {
        mode,
        ..SmoothingSettings::default()
    }
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}
