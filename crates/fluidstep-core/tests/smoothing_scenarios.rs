mod common;

use common::{approx, settings, Body, FakeInput, Harness, CAMERA, ENTITY, PLATFORM};
use fluidstep_core::{
    FnRule, ObjectId, Sample, SmoothingMode, SmoothingSettings, SmoothingState, Vec2,
};

/// Entity sampled at x = 90 then x = 100.
fn two_samples(mode: SmoothingMode) -> (Harness, ObjectId) {
    let mut h = Harness::new(settings(mode));
    let id = h.world.spawn(1, Body::at(ENTITY, Vec2::new(90.0, 5.0)));
    h.track_all();
    h.step(|_, _| {});
    h.step(|w, _| w.set_pos(id, Vec2::new(100.0, 5.0)));
    (h, id)
}

#[test]
fn interpolates_halfway() {
    let (mut h, id) = two_samples(SmoothingMode::Interpolate);
    h.compute(0.5);
    assert_eq!(h.smoothed_pos(id), Vec2::new(95.0, 5.0));
}

#[test]
fn extrapolates_halfway() {
    let (mut h, id) = two_samples(SmoothingMode::Extrapolate);
    h.compute(0.5);
    assert_eq!(h.smoothed_pos(id), Vec2::new(105.0, 5.0));
}

#[test]
fn fraction_zero_edges() {
    let (mut h, id) = two_samples(SmoothingMode::Interpolate);
    h.compute(0.0);
    assert_eq!(h.smoothed_pos(id), Vec2::new(90.0, 5.0));

    let (mut h, id) = two_samples(SmoothingMode::Extrapolate);
    h.compute(0.0);
    assert_eq!(h.smoothed_pos(id), Vec2::new(100.0, 5.0));
}

#[test]
fn interpolation_never_overshoots() {
    let (mut h, id) = two_samples(SmoothingMode::Interpolate);
    for i in 0..=20 {
        h.compute(i as f32 / 10.0);
        let x = h.smoothed_pos(id).x;
        assert!((90.0..=100.0).contains(&x), "fraction {} gave {x}", i as f32 / 10.0);
    }
}

#[test]
fn none_mode_draws_newest() {
    let (mut h, id) = two_samples(SmoothingMode::None);
    h.compute(0.5);
    assert_eq!(h.smoothed_pos(id), Vec2::new(100.0, 5.0));
}

#[test]
fn teleport_snaps_to_authoritative() {
    for mode in [SmoothingMode::Interpolate, SmoothingMode::Extrapolate] {
        let mut h = Harness::new(settings(mode));
        let id = h.world.spawn(1, Body::at(ENTITY, Vec2::new(10.0, 5.0)));
        h.track_all();
        h.step(|_, _| {});
        h.step(|w, _| w.set_pos(id, Vec2::new(200.0, 5.0)));
        h.compute(0.5);
        assert_eq!(h.smoothed_pos(id), Vec2::new(200.0, 5.0), "{mode:?}");
    }
}

#[test]
fn camera_is_always_interpolated() {
    let mut h = Harness::new(settings(SmoothingMode::Extrapolate));
    let cam = h.world.spawn(1, Body::at(CAMERA, Vec2::new(10.0, 10.0)));
    h.track_all();
    h.step(|_, _| {});
    h.step(|w, _| w.set_pos(cam, Vec2::new(20.0, 10.0)));
    h.compute(0.5);
    assert_eq!(h.smoothed_pos(cam), Vec2::new(15.0, 10.0));
}

#[test]
fn rider_inherits_platform_offset() {
    let mut h = Harness::new(settings(SmoothingMode::Extrapolate));
    let platform = h.world.spawn(1, Body::at(PLATFORM, Vec2::new(0.0, 100.0)));
    let rider = h.world.spawn(2, Body::at(ENTITY, Vec2::new(50.0, 100.0)));
    h.world.riders.insert(platform, vec![rider]);
    h.track_all();

    h.step(|_, _| {});
    h.step(|w, _| w.set_pos(platform, Vec2::new(6.0, 100.0)));
    assert_eq!(h.pushers.pushers_of(rider), &[platform]);

    h.compute(1.0);
    assert_eq!(h.smoothed_pos(platform), Vec2::new(12.0, 100.0));
    assert_eq!(h.smoothed_pos(rider), Vec2::new(56.0, 100.0));
}

#[test]
fn reported_push_collision_counts_as_pusher() {
    let mut h = Harness::new(settings(SmoothingMode::Extrapolate));
    let platform = h.world.spawn(1, Body::at(PLATFORM, Vec2::new(0.0, 100.0)));
    let actor = h.world.spawn(2, Body::at(ENTITY, Vec2::new(50.0, 100.0)));
    h.track_all();

    h.step(|_, _| {});
    h.step(|w, p| {
        w.set_pos(platform, Vec2::new(6.0, 100.0));
        p.record_push(actor, platform);
    });

    h.compute(1.0);
    assert_eq!(h.smoothed_pos(actor), Vec2::new(56.0, 100.0));

    // Next step nothing pushes: ordinary smoothing of a motionless actor.
    h.step(|_, _| {});
    h.compute(1.0);
    assert_eq!(h.smoothed_pos(actor), Vec2::new(50.0, 100.0));
}

#[test]
fn teleported_rider_ignores_platform_offset() {
    let mut h = Harness::new(settings(SmoothingMode::Extrapolate));
    let platform = h.world.spawn(1, Body::at(PLATFORM, Vec2::new(0.0, 100.0)));
    let rider = h.world.spawn(2, Body::at(ENTITY, Vec2::new(50.0, 100.0)));
    h.world.riders.insert(platform, vec![rider]);
    h.track_all();

    h.step(|_, _| {});
    h.step(|w, _| {
        w.set_pos(platform, Vec2::new(6.0, 100.0));
        w.set_pos(rider, Vec2::new(150.0, 100.0));
    });
    assert_eq!(h.pushers.pushers_of(rider), &[platform]);

    h.compute(1.0);
    assert_eq!(h.smoothed_pos(platform), Vec2::new(12.0, 100.0));
    assert_eq!(h.smoothed_pos(rider), Vec2::new(150.0, 100.0));
}

#[test]
fn unset_rider_sample_draws_authoritative() {
    let mut h = Harness::new(settings(SmoothingMode::Extrapolate));
    let platform = h.world.spawn(1, Body::at(PLATFORM, Vec2::new(0.0, 100.0)));
    let rider = h.world.spawn(2, Body::at(ENTITY, Vec2::new(20.0, 0.0)));
    h.world.riders.insert(platform, vec![rider]);
    h.track_all();

    h.step(|_, _| {});
    h.step(|w, _| {
        w.set_pos(platform, Vec2::new(6.0, 100.0));
        w.set_pos(rider, Vec2::ZERO);
    });

    h.compute(1.0);
    assert_eq!(h.smoothed_pos(rider), Vec2::ZERO);
}

#[test]
fn path_platform_carries_riders() {
    let mut h = Harness::new(settings(SmoothingMode::Extrapolate));
    let track = h.world.spawn(1, Body::on_track(0.2));
    let rider = h.world.spawn(2, Body::at(ENTITY, Vec2::new(70.0, 40.0)));
    h.world.riders.insert(track, vec![rider]);
    h.track_all();

    h.step(|_, _| {});
    h.step(|w, _| w.set_percent(track, 0.3));
    h.compute(0.5);

    match h.smoothed(track) {
        Sample::Percent(p) => assert!(approx(p, 0.35), "percent {p}"),
        other => panic!("unexpected sample {other:?}"),
    }
    let pos = h.smoothed_pos(rider);
    assert!(approx(pos.x, 75.0), "x {}", pos.x);
    assert_eq!(pos.y, 40.0);
}

#[test]
fn push_cycles_terminate() {
    let mut h = Harness::new(settings(SmoothingMode::Interpolate));
    let a = h.world.spawn(1, Body::at(PLATFORM, Vec2::new(10.0, 10.0)));
    let b = h.world.spawn(2, Body::at(PLATFORM, Vec2::new(30.0, 10.0)));
    h.world.riders.insert(a, vec![b]);
    h.world.riders.insert(b, vec![a]);
    h.track_all();

    h.step(|_, _| {});
    h.step(|w, _| {
        w.set_pos(a, Vec2::new(12.0, 10.0));
        w.set_pos(b, Vec2::new(33.0, 10.0));
    });
    h.compute(0.5);

    assert_eq!(h.smoothed_pos(b), Vec2::new(31.5, 10.0));
    assert_eq!(h.smoothed_pos(a), Vec2::new(10.5, 10.0));
}

#[test]
fn carried_object_follows_player() {
    let mut h = Harness::new(SmoothingSettings {
        mode: SmoothingMode::Interpolate,
        player_mode: SmoothingMode::Interpolate,
        ..SmoothingSettings::default()
    });
    let player = h.world.spawn(1, Body::at(ENTITY, Vec2::new(10.0, 5.0)));
    let held = h.world.spawn(2, Body::at(ENTITY, Vec2::new(20.0, 8.0)));
    h.world.player = Some(player);
    h.world.carried.push(held);
    h.track_all();

    h.step(|_, _| {});
    h.step(|w, _| w.set_pos(player, Vec2::new(20.0, 5.0)));
    h.compute(0.5);

    assert_eq!(h.smoothed_pos(player), Vec2::new(15.0, 5.0));
    assert_eq!(h.smoothed_pos(held), Vec2::new(15.0, 8.0));
}

#[test]
fn teleported_carried_object_draws_authoritative() {
    let mut h = Harness::new(SmoothingSettings {
        mode: SmoothingMode::Interpolate,
        player_mode: SmoothingMode::Interpolate,
        ..SmoothingSettings::default()
    });
    let player = h.world.spawn(1, Body::at(ENTITY, Vec2::new(10.0, 5.0)));
    let held = h.world.spawn(2, Body::at(ENTITY, Vec2::new(20.0, 8.0)));
    h.world.player = Some(player);
    h.world.carried.push(held);
    h.track_all();

    h.step(|_, _| {});
    h.step(|w, _| {
        w.set_pos(player, Vec2::new(20.0, 5.0));
        w.set_pos(held, Vec2::new(200.0, 8.0));
    });
    h.compute(0.5);

    assert_eq!(h.smoothed_pos(player), Vec2::new(15.0, 5.0));
    assert_eq!(h.smoothed_pos(held), Vec2::new(200.0, 8.0));
}

#[test]
fn player_dash_cancels_until_next_step() {
    let mut h = Harness::new(SmoothingSettings::default());
    let player = h.world.spawn(1, Body::at(ENTITY, Vec2::new(10.0, 5.0)));
    h.world.player = Some(player);
    h.world.input = Some(FakeInput::default());
    h.track_all();

    h.step(|_, _| {});
    h.step(|w, _| w.set_pos(player, Vec2::new(14.0, 5.0)));
    h.compute(0.5);
    assert_eq!(h.smoothed_pos(player), Vec2::new(16.0, 5.0));

    h.world.input.as_mut().unwrap().live_dash = true;
    h.compute(0.5);
    assert_eq!(h.smoothed_pos(player), Vec2::new(14.0, 5.0));
    assert!(h.player.is_cancelled());

    h.world.input.as_mut().unwrap().live_dash = false;
    h.compute(0.75);
    assert_eq!(h.smoothed_pos(player), Vec2::new(14.0, 5.0));

    h.step(|w, _| w.set_pos(player, Vec2::new(18.0, 5.0)));
    h.compute(0.5);
    assert_eq!(h.smoothed_pos(player), Vec2::new(20.0, 5.0));

    let input = h.world.input.as_ref().unwrap();
    assert_eq!(input.peeks, input.restores);
}

#[test]
fn frozen_player_is_not_extrapolated() {
    let mut h = Harness::new(SmoothingSettings::default());
    let player = h.world.spawn(1, Body::at(ENTITY, Vec2::new(10.0, 5.0)));
    h.world.player = Some(player);
    h.track_all();

    h.step(|_, _| {});
    h.step(|w, _| w.set_pos(player, Vec2::new(14.0, 5.0)));
    h.world.frozen = true;
    h.compute(0.5);
    assert_eq!(h.smoothed_pos(player), Vec2::new(14.0, 5.0));
}

#[test]
fn pushed_player_keeps_velocity_term() {
    let mut h = Harness::new(SmoothingSettings::default());
    let player = h.world.spawn(1, Body::at(ENTITY, Vec2::new(50.0, 100.0)));
    let platform = h.world.spawn(2, Body::at(PLATFORM, Vec2::new(0.0, 100.0)));
    h.world.player = Some(player);
    h.world.riders.insert(platform, vec![player]);
    h.track_all();

    h.step(|_, _| {});
    h.step(|w, _| {
        w.set_pos(platform, Vec2::new(6.0, 100.0));
        w.set_pos(player, Vec2::new(56.0, 100.0));
    });
    h.compute(1.0);

    // The platform is interpolated under the default global mode, so at fraction 1 it adds a
    // zero offset and the player keeps only its own velocity term.
    assert_eq!(h.smoothed_pos(platform), Vec2::new(6.0, 100.0));
    assert_eq!(h.pushers.pushers_of(player), &[platform]);
    assert_eq!(h.smoothed_pos(player), Vec2::new(62.0, 100.0));
}

#[test]
fn override_rule_exempts_object() {
    let mut h = Harness::new(settings(SmoothingMode::Interpolate));
    h.engine.add_rule(FnRule::new(
        "boost",
        |w: &common::FakeWorld, s: &SmoothingState| {
            w.bodies.get(&s.id()).is_some_and(|b| b.boosting)
        },
    ));
    let boosted = h.world.spawn(1, Body::at(ENTITY, Vec2::new(10.0, 5.0)));
    let plain = h.world.spawn(2, Body::at(ENTITY, Vec2::new(10.0, 9.0)));
    h.world.bodies.get_mut(&boosted).unwrap().boosting = true;
    h.track_all();

    h.step(|_, _| {});
    h.step(|w, _| {
        w.set_pos(boosted, Vec2::new(20.0, 5.0));
        w.set_pos(plain, Vec2::new(20.0, 9.0));
    });
    h.compute(0.5);

    assert_eq!(h.smoothed_pos(boosted), Vec2::new(20.0, 5.0));
    assert_eq!(h.smoothed_pos(plain), Vec2::new(15.0, 9.0));
}

#[test]
fn hidden_object_draws_authoritative() {
    let (mut h, id) = two_samples(SmoothingMode::Interpolate);
    h.world.bodies.get_mut(&id).unwrap().visible = false;
    h.compute(0.5);
    assert_eq!(h.smoothed_pos(id), Vec2::new(100.0, 5.0));
}

#[test]
fn apply_then_restore_round_trips_world() {
    let (mut h, id) = two_samples(SmoothingMode::Interpolate);
    h.compute(0.25);
    h.engine.apply_smoothed(&mut h.world);
    assert_eq!(h.world.pos(id), Vec2::new(92.5, 5.0));
    h.engine.restore_original(&mut h.world);
    assert_eq!(h.world.pos(id), Vec2::new(100.0, 5.0));
}
