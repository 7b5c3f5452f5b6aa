//! Tests for placing, rolling, and clearing dice through the scripted platform

use ardicee::ar_dice::{
    AppSettings, AssetFactory, Diagnostic, NodeKind, NodeParent, PlacementController,
    PlaneDetection, RollSettings, SceneOp, ScreenPoint, ScriptViewSettings, ScriptedPlatform,
    SessionError, SessionState, TapOutcome, TrackingMode,
};
use bevy::math::{Vec2, Vec3};
use std::f32::consts::FRAC_PI_2;

type Controller = PlacementController<ScriptedPlatform, AssetFactory>;

fn controller(world_tracking: bool) -> Controller {
    let settings = AppSettings::default();
    PlacementController::with_seed(
        ScriptedPlatform::new(world_tracking, ScriptViewSettings::default()),
        AssetFactory::from_settings(&settings),
        RollSettings::default(),
        42,
    )
}

/// World-tracking controller with a large table centred on (1, -2).
fn tracking_with_table() -> Controller {
    let mut c = controller(true);
    c.platform_mut().declare_plane(Vec2::new(1.0, -2.0), Vec2::new(2.0, 2.0), 0.0);
    c.on_session_start();
    c.pump_platform_events();
    c.take_diagnostics();
    c
}

fn tap_world(c: &mut Controller, x: f32, z: f32) -> TapOutcome {
    let point = c.platform().world_to_screen(x, z);
    c.on_tap(point)
}

#[test]
fn test_tap_without_plane_places_nothing() {
    let mut c = controller(true);
    c.on_session_start();

    let point = ScreenPoint::new(400.0, 300.0);
    assert_eq!(c.on_tap(point), TapOutcome::NoPlaneDetected);
    assert!(c.placed().is_empty());
    assert_eq!(c.platform().attached_dice(), 0);
    assert!(c
        .take_diagnostics()
        .contains(&Diagnostic::NoPlaneDetected { point }));
}

#[test]
fn test_die_rests_on_plane_by_its_radius() {
    let mut c = tracking_with_table();

    let outcome = c.on_tap(ScreenPoint::new(500.0, 100.0));
    let TapOutcome::Placed { node, position } = outcome else {
        panic!("expected a placement, got {:?}", outcome);
    };
    assert!((position - Vec3::new(1.0, 0.05, -2.0)).length() < 1e-6);
    assert_eq!(c.placed().len(), 1);
    assert_eq!(c.placed()[0].position, position);

    // Attached at the root and rolled once on placement.
    let (scene_node, parent) = c
        .platform()
        .attached()
        .find(|(n, _)| n.id == node)
        .cloned()
        .expect("die should be attached");
    assert_eq!(parent, NodeParent::Root);
    assert_eq!(scene_node.template.kind, NodeKind::Die);
    assert_eq!(scene_node.transform.translation, position);
    assert_eq!(c.platform().rotations_for(node), 1);
}

#[test]
fn test_tap_uses_the_first_hit() {
    let mut c = controller(true);
    c.platform_mut().declare_plane(Vec2::ZERO, Vec2::splat(4.0), 0.0);
    c.platform_mut().declare_plane(Vec2::ZERO, Vec2::splat(1.0), 0.75);
    c.on_session_start();
    c.pump_platform_events();

    let TapOutcome::Placed { position, .. } = tap_world(&mut c, 0.0, 0.0) else {
        panic!("expected a placement");
    };
    assert!((position.y - 0.8).abs() < 1e-6);
}

#[test]
fn test_roll_all_then_clear_all() {
    let mut c = tracking_with_table();
    for x in [0.5, 1.0, 1.5] {
        assert!(tap_world(&mut c, x, -2.0).is_placed());
    }
    let before = c.platform().ops().len();

    assert_eq!(c.roll_all(), 3);
    let rotations: Vec<_> = c.platform().ops()[before..]
        .iter()
        .filter(|op| matches!(op, SceneOp::Rotate { .. }))
        .collect();
    assert_eq!(rotations.len(), 3);
    for object in c.placed() {
        assert_eq!(object.roll_count, 2);
        assert_eq!(c.platform().rotations_for(object.node), 2);
    }

    assert_eq!(c.clear_all(), 3);
    assert!(c.placed().is_empty());
    assert_eq!(c.platform().attached_dice(), 0);
}

#[test]
fn test_roll_increments_are_quarter_turn_multiples() {
    let mut c = tracking_with_table();
    tap_world(&mut c, 1.0, -2.0);
    for _ in 0..20 {
        c.roll_all();
    }

    let settings = RollSettings::default();
    for op in c.platform().ops() {
        if let SceneOp::Rotate { animation, .. } = op {
            assert_eq!(animation.duration_seconds, settings.duration_seconds);
            assert_eq!(animation.delta.y, 0.0);
            for angle in [animation.delta.x, animation.delta.z] {
                let quarters = angle / (FRAC_PI_2 * settings.spin_multiplier);
                assert!((1.0..=4.0).contains(&quarters.round()));
                assert!((quarters - quarters.round()).abs() < 1e-4);
            }
        }
    }
}

#[test]
fn test_dice_draw_their_spins_independently() {
    let mut c = tracking_with_table();
    for x in [0.25, 0.75, 1.25, 1.75] {
        assert!(tap_world(&mut c, x, -2.0).is_placed());
    }

    let mut rolls_with_different_spins = 0;
    for _ in 0..50 {
        assert_eq!(c.roll_all(), 4);
        let spins: Vec<_> = c.placed().iter().map(|p| p.last_spin).collect();
        assert!(spins.iter().all(Option::is_some));
        if spins.iter().any(|spin| *spin != spins[0]) {
            rolls_with_different_spins += 1;
        }
    }
    // A shared draw would give every die the same spin on every roll.
    assert!(rolls_with_different_spins > 0);
}

#[test]
fn test_shake_rolls_every_die() {
    let mut c = tracking_with_table();
    tap_world(&mut c, 0.5, -2.0);
    tap_world(&mut c, 1.5, -2.0);

    assert_eq!(c.on_shake_gesture(), 2);
    assert!(c.placed().iter().all(|p| p.roll_count == 2));
}

#[test]
fn test_roll_with_no_dice_does_nothing() {
    let mut c = tracking_with_table();
    let before = c.platform().ops().len();
    assert_eq!(c.roll_all(), 0);
    assert_eq!(c.clear_all(), 0);
    assert_eq!(c.platform().ops().len(), before);
}

#[test]
fn test_plane_indicator_lies_flat_under_its_anchor() {
    let mut c = controller(true);
    let anchor = c.platform_mut().declare_plane(Vec2::new(1.0, -2.0), Vec2::new(0.6, 0.4), 0.0);
    c.on_session_start();
    assert_eq!(c.pump_platform_events(), 1);

    assert_eq!(c.planes().len(), 1);
    let plane = c.planes()[0];
    assert_eq!(plane.anchor, anchor);

    let (node, parent) = c
        .platform()
        .attached()
        .find(|(n, _)| n.id == plane.indicator)
        .cloned()
        .expect("indicator should be attached");
    assert_eq!(parent, NodeParent::Anchor(anchor));
    assert_eq!(
        node.template.kind,
        NodeKind::PlaneIndicator {
            width: 0.6,
            height: 0.4
        }
    );
    // The anchor carries the plane's position; the indicator sits at its origin.
    assert_eq!(node.transform.translation, Vec3::ZERO);
    assert_eq!(
        c.platform().world_translation(plane.indicator),
        Some(Vec3::new(1.0, 0.0, -2.0))
    );
    // A vertical rectangle's normal ends up pointing up.
    let normal = node.transform.rotation * Vec3::Z;
    assert!((normal - Vec3::Y).length() < 1e-5);
}

#[test]
fn test_raised_plane_indicator_follows_its_anchor() {
    let mut c = controller(true);
    c.platform_mut().declare_plane(Vec2::new(-0.5, -1.5), Vec2::new(0.4, 0.4), 0.72);
    c.on_session_start();
    c.pump_platform_events();

    let indicator = c.planes()[0].indicator;
    let world = c.platform().world_translation(indicator).unwrap();
    assert!((world - Vec3::new(-0.5, 0.72, -1.5)).length() < 1e-6);

    // A die placed on it rests on the same surface.
    let TapOutcome::Placed { node, position } = tap_world(&mut c, -0.5, -1.5) else {
        panic!("expected a placement");
    };
    assert!((position.y - (0.72 + 0.05)).abs() < 1e-6);
    assert_eq!(c.platform().world_translation(node), Some(position));
}

#[test]
fn test_orientation_only_device() {
    let mut c = controller(false);
    c.platform_mut().declare_plane(Vec2::new(1.0, -2.0), Vec2::new(2.0, 2.0), 0.0);

    assert_eq!(c.on_session_start(), TrackingMode::OrientationOnly);
    assert_eq!(c.pump_platform_events(), 0);
    assert!(c.planes().is_empty());

    assert_eq!(
        c.on_tap(ScreenPoint::new(500.0, 100.0)),
        TapOutcome::NoPlaneDetected
    );
    assert!(c.placed().is_empty());
}

#[test]
fn test_world_tracking_requests_horizontal_planes() {
    let mut c = controller(true);
    assert_eq!(
        c.on_session_start(),
        TrackingMode::WorldTracking {
            plane_detection: PlaneDetection::Horizontal
        }
    );
    assert_eq!(c.state(), SessionState::Tracking);
}

#[test]
fn test_paused_session_ignores_taps_and_rolls() {
    let mut c = tracking_with_table();
    tap_world(&mut c, 1.0, -2.0);
    c.on_session_stop();
    c.take_diagnostics();

    assert_eq!(tap_world(&mut c, 1.0, -2.0), TapOutcome::SessionInactive);
    assert_eq!(c.roll_all(), 0);
    assert!(c
        .take_diagnostics()
        .iter()
        .all(|d| matches!(d, Diagnostic::IgnoredWhileInactive(_))));
    assert_eq!(c.placed().len(), 1);

    // Clearing still works while paused.
    assert_eq!(c.clear_all(), 1);
}

#[test]
fn test_session_failure_pauses_until_restarted() {
    let mut c = tracking_with_table();
    c.platform_mut()
        .inject_error(SessionError::TrackingFailed("lost features".into()));
    c.pump_platform_events();

    assert_eq!(c.state(), SessionState::Inactive);
    assert!(!c.platform().is_running());
    assert_eq!(tap_world(&mut c, 1.0, -2.0), TapOutcome::SessionInactive);

    c.on_session_start();
    assert!(tap_world(&mut c, 1.0, -2.0).is_placed());
}

#[test]
fn test_interruption_blocks_taps_until_resumed() {
    let mut c = tracking_with_table();
    c.platform_mut().interrupt();
    c.pump_platform_events();
    assert!(c.is_interrupted());
    assert_eq!(tap_world(&mut c, 1.0, -2.0), TapOutcome::Interrupted);

    c.platform_mut().resume();
    c.pump_platform_events();
    assert!(!c.is_interrupted());
    assert!(tap_world(&mut c, 1.0, -2.0).is_placed());
}

#[test]
fn test_seeded_controllers_roll_identically() {
    let spins = |seed| {
        let settings = AppSettings::default();
        let mut c = PlacementController::with_seed(
            ScriptedPlatform::new(true, ScriptViewSettings::default()),
            AssetFactory::from_settings(&settings),
            RollSettings::default(),
            seed,
        );
        c.platform_mut().declare_plane(Vec2::new(1.0, -2.0), Vec2::new(2.0, 2.0), 0.0);
        c.on_session_start();
        c.pump_platform_events();
        c.on_tap(ScreenPoint::new(500.0, 100.0));
        (0..5)
            .map(|_| c.roll_one(c.placed()[0].node))
            .collect::<Vec<_>>()
    };
    assert_eq!(spins(7), spins(7));
}
