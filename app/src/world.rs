use std::collections::BTreeMap;

use fluidstep_core::math::wrap_angle;
use fluidstep_core::{
    Accessor, Angle, FluidResult, Frame, FnAccessor, Host, HostWorld, InputSource, KindId,
    KindSpec, ObjectId, SignalSender, Vec2,
};
use fluidstep_modules_input::InputDevice;

pub const PLAYER: KindId = KindId("player");
pub const PLATFORM: KindId = KindId("platform");
pub const CAMERA: KindId = KindId("camera");
pub const DRONE: KindId = KindId("drone");
pub const GEAR: KindId = KindId("gear");
pub const SPARK: KindId = KindId("spark");

const RUN_SPEED: f32 = 1.5;
const DASH_SPEED: f32 = 6.0;
const DASH_STEPS: u32 = 10;
const SPARK_EVERY: u64 = 90;
const SPARK_LIFETIME: u64 = 45;

#[derive(Debug, Clone)]
pub struct Body {
    pub kind: KindId,
    pub pos: Vec2,
    pub rotation: Angle,
    pub visible: bool,
    pub boosting: bool,
    pub born: u64,
}

impl Body {
    fn at(kind: KindId, pos: Vec2, born: u64) -> Self {
        Self {
            kind,
            pos,
            rotation: Angle(0.0),
            visible: true,
            boosting: false,
            born,
        }
    }
}

pub struct DemoWorld {
    pub bodies: BTreeMap<ObjectId, Body>,
    pub player: ObjectId,
    pub platform: ObjectId,
    pub camera: ObjectId,
    pub drone: ObjectId,
    pub gear: ObjectId,
    riding: bool,
    input: InputDevice,
}

impl DemoWorld {
    pub fn new(input: InputDevice) -> Self {
        let mut bodies = BTreeMap::new();
        let player = ObjectId(1);
        let platform = ObjectId(2);
        let camera = ObjectId(3);
        let drone = ObjectId(4);
        let gear = ObjectId(5);

        bodies.insert(player, Body::at(PLAYER, Vec2::new(40.0, 100.0), 0));
        bodies.insert(platform, Body::at(PLATFORM, Vec2::new(40.0, 108.0), 0));
        bodies.insert(camera, Body::at(CAMERA, Vec2::new(40.0, 90.0), 0));
        bodies.insert(drone, Body::at(DRONE, Vec2::new(0.0, 30.0), 0));
        bodies.insert(gear, Body::at(GEAR, Vec2::new(200.0, 60.0), 0));

        Self {
            bodies,
            player,
            platform,
            camera,
            drone,
            gear,
            riding: true,
            input,
        }
    }

    #[inline]
    pub fn input_device(&mut self) -> &mut InputDevice {
        &mut self.input
    }

    pub fn pos(&self, id: ObjectId) -> Vec2 {
        self.bodies.get(&id).map(|b| b.pos).unwrap_or(Vec2::ZERO)
    }

    fn set_pos(&mut self, id: ObjectId, pos: Vec2) {
        if let Some(b) = self.bodies.get_mut(&id) {
            b.pos = pos;
        }
    }

    fn is_visible(&self, id: ObjectId) -> bool {
        self.bodies.get(&id).is_some_and(|b| b.visible)
    }

    pub fn is_boosting(&self, id: ObjectId) -> bool {
        self.bodies.get(&id).is_some_and(|b| b.boosting)
    }
}

impl HostWorld for DemoWorld {
    fn live_objects(&self, out: &mut Vec<(ObjectId, KindId)>) {
        out.extend(self.bodies.iter().map(|(id, b)| (*id, b.kind)));
    }

    fn player(&self) -> Option<ObjectId> {
        Some(self.player)
    }

    fn riders(&self, platform: ObjectId, out: &mut Vec<ObjectId>) {
        if platform == self.platform && self.riding {
            out.push(self.player);
        }
    }

    fn input(&mut self) -> Option<&mut dyn InputSource> {
        Some(&mut self.input)
    }
}

fn position() -> FnAccessor<DemoWorld, Vec2> {
    FnAccessor::new(
        |w: &DemoWorld, id| w.pos(id),
        |w: &mut DemoWorld, id, v| w.set_pos(id, v),
    )
    .with_visibility(|w: &DemoWorld, id| w.is_visible(id))
}

fn rotation() -> FnAccessor<DemoWorld, Angle> {
    FnAccessor::new(
        |w: &DemoWorld, id| w.bodies.get(&id).map(|b| b.rotation).unwrap_or(Angle(0.0)),
        |w: &mut DemoWorld, id, v| {
            if let Some(b) = w.bodies.get_mut(&id) {
                b.rotation = v;
            }
        },
    )
}

pub fn kinds() -> Vec<(KindId, KindSpec, Accessor<DemoWorld>)> {
    vec![
        (PLAYER, KindSpec::generic(), Accessor::position(position())),
        (PLATFORM, KindSpec::platform(), Accessor::position(position())),
        (CAMERA, KindSpec::camera(), Accessor::position(position())),
        (DRONE, KindSpec::generic(), Accessor::position(position())),
        (SPARK, KindSpec::generic(), Accessor::position(position())),
        (GEAR, KindSpec::generic().with_history_depth(3), Accessor::angle(rotation())),
    ]
}

/// Headless stand-in for a game: a player riding a moving platform, dashing on input, a camera
/// following it and some ambient objects coming and going.
pub struct DemoHost {
    world: DemoWorld,
    signals: Option<SignalSender>,
    steps: u64,
    dash_left: u32,
    facing: f32,
    next_spark: u64,
    draws: u64,
    last_drawn: Vec2,
}

impl DemoHost {
    pub fn new(world: DemoWorld) -> Self {
        Self {
            world,
            signals: None,
            steps: 0,
            dash_left: 0,
            facing: 1.0,
            next_spark: 100,
            draws: 0,
            last_drawn: Vec2::ZERO,
        }
    }

    /// Lifecycle and push signals go nowhere until attached.
    pub fn attach(&mut self, signals: SignalSender) {
        self.signals = Some(signals);
    }

    fn signal(&self, f: impl FnOnce(&SignalSender)) {
        if let Some(tx) = &self.signals {
            f(tx);
        }
    }

    #[inline]
    pub fn draws(&self) -> u64 {
        self.draws
    }

    fn move_platform(&mut self) {
        let t = self.steps as f32 / 60.0;
        let before = self.world.pos(self.world.platform);
        let after = Vec2::new(40.0 + 30.0 * (t * 0.8).sin(), before.y);
        self.world.set_pos(self.world.platform, after);

        if self.world.riding {
            let p = self.world.pos(self.world.player);
            self.world.set_pos(self.world.player, p + (after - before));
        }
    }

    fn move_player(&mut self) {
        let input = &self.world.input;
        let dash = input.bindings().triggered(input.state());
        if dash && self.dash_left == 0 {
            self.dash_left = DASH_STEPS;
            self.world.riding = false;
            log::debug!("demo: dash at step {}", self.steps);
        }

        let speed = if self.dash_left > 0 {
            self.dash_left -= 1;
            DASH_SPEED
        } else {
            RUN_SPEED
        };

        let mut p = self.world.pos(self.world.player);
        p.x += speed * self.facing;
        if !(0.0..=320.0).contains(&p.x) {
            self.facing = -self.facing;
            p.x = p.x.clamp(0.0, 320.0);
        }

        let platform = self.world.pos(self.world.platform);
        if self.dash_left == 0 && (p.x - platform.x).abs() < 12.0 {
            if !self.world.riding {
                let (player, platform) = (self.world.player, self.world.platform);
                self.signal(|tx| tx.push_collision(player, platform));
            }
            self.world.riding = true;
            p.y = platform.y - 8.0;
        }
        self.world.set_pos(self.world.player, p);

        let cam = self.world.pos(self.world.camera);
        self.world.set_pos(self.world.camera, cam.lerp(p - Vec2::new(0.0, 10.0), 0.2));
    }

    fn move_ambient(&mut self) {
        let drone = self.world.drone;
        let d = self.world.pos(drone);
        self.world.set_pos(drone, Vec2::new((d.x + 2.0) % 320.0, d.y));
        if let Some(b) = self.world.bodies.get_mut(&drone) {
            b.boosting = (self.steps / 120) % 2 == 1;
        }

        if let Some(g) = self.world.bodies.get_mut(&self.world.gear) {
            g.rotation = Angle(wrap_angle(g.rotation.0 + 0.3));
        }

        if self.steps >= self.next_spark {
            self.next_spark = self.steps + SPARK_EVERY;
            let id = ObjectId(1000 + self.steps);
            let at = self.world.pos(self.world.player);
            self.world.bodies.insert(id, Body::at(SPARK, at, self.steps));
            self.signal(|tx| tx.object_created(id, SPARK));
        }

        let steps = self.steps;
        let expired: Vec<ObjectId> = self
            .world
            .bodies
            .iter()
            .filter(|(_, b)| b.kind == SPARK && steps - b.born >= SPARK_LIFETIME)
            .map(|(id, _)| *id)
            .collect();
        for id in expired {
            self.world.bodies.remove(&id);
            self.signal(|tx| tx.object_destroyed(id));
        }

        for b in self.world.bodies.values_mut().filter(|b| b.kind == SPARK) {
            b.pos.y -= 1.0;
            b.visible = (steps - b.born) % 20 < 15;
        }
    }
}

impl Host for DemoHost {
    type World = DemoWorld;

    fn world(&self) -> &DemoWorld {
        &self.world
    }

    fn world_mut(&mut self) -> &mut DemoWorld {
        &mut self.world
    }

    fn update(&mut self, _frame: &Frame) -> FluidResult<()> {
        self.steps += 1;
        self.world.input.begin_step();
        self.move_platform();
        self.move_player();
        self.move_ambient();
        Ok(())
    }

    fn draw(&mut self, frame: &Frame) -> FluidResult<()> {
        self.draws += 1;
        let p = self.world.pos(self.world.player);
        log::trace!(
            "draw #{} fraction={:.3} player=({:.2}, {:.2}) moved={:.2}",
            frame.draw_index,
            frame.elapsed_fraction,
            p.x,
            p.y,
            p.distance_squared(self.last_drawn).sqrt()
        );
        self.last_drawn = p;
        Ok(())
    }
}
