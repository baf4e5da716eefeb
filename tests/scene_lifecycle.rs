//! Integration tests for the scene lifecycle, capture and the stage.
//!
//! These drive the public API the way the window host does: build a scene
//! from a store, bind a canvas slot, tick, click, tear down.

use shoal::prelude::*;

fn seeded() -> SceneConfig {
    SceneConfig::new().with_seed(2024).with_strict_invariants(true)
}

fn running_scene(slot: &CanvasSlot) -> (ParameterStore, Scene) {
    let store = water::init_parameter_store();
    let mut scene = water::create_sketch(store.clone())
        .with_config(seeded())
        .build();
    scene.setup(slot).unwrap();
    (store, scene)
}

fn press(position: Vec2) -> SceneInput {
    SceneInput::PointerPressed {
        position,
        button: MouseButton::Left,
    }
}

/// Replace the spawned school with a single fish at `position`.
fn lone_fish(scene: &mut Scene, position: Vec2, size: f32) {
    let sim = scene.simulation_mut().unwrap();
    let bounds = sim.bounds();
    *sim = SimulationState::with_fish(bounds, vec![Fish::new(0, position, 0.0, size)], 1);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_factory_does_not_start_anything() {
    let slot = CanvasSlot::new("main", 320, 240);
    let scene = water::create_sketch(water::init_parameter_store()).build();
    assert_eq!(scene.state(), SceneState::Uninitialized);
    assert!(scene.canvas().is_none());
    assert!(!slot.is_bound());
}

#[test]
fn test_full_lifecycle() {
    let slot = CanvasSlot::new("main", 320, 240);
    let (_store, mut scene) = running_scene(&slot);
    assert_eq!(scene.state(), SceneState::Running);

    for _ in 0..10 {
        scene.tick(1.0 / 60.0).unwrap();
    }
    assert_eq!(scene.frame_count(), 10);

    scene.teardown();
    assert_eq!(scene.state(), SceneState::TornDown);

    // Torn down scenes ignore everything.
    scene.tick(1.0 / 60.0).unwrap();
    assert!(scene.input(press(Vec2::new(10.0, 10.0))).is_none());
    assert_eq!(scene.frame_count(), 0);
}

#[test]
fn test_double_teardown_releases_once() {
    let slot = CanvasSlot::new("main", 320, 240);
    let (_store, mut scene) = running_scene(&slot);
    scene.teardown();
    scene.teardown();
    drop(scene);
    assert_eq!(slot.release_count(), 1);
    assert!(!slot.is_bound());
}

#[test]
fn test_second_scene_waits_for_release() {
    let slot = CanvasSlot::new("main", 320, 240);
    let (_store, mut first) = running_scene(&slot);

    let mut second = water::create_sketch(water::init_parameter_store())
        .with_config(seeded())
        .build();
    let err = second.setup(&slot).unwrap_err();
    assert!(matches!(err, SceneError::InvalidCanvasTarget(_)));

    first.teardown();
    second.setup(&slot).unwrap();
    assert_eq!(second.state(), SceneState::Running);
}

// ============================================================================
// Capture
// ============================================================================

#[test]
fn test_click_near_fish_captures_it() {
    let slot = CanvasSlot::new("main", 320, 240);
    let (_store, mut scene) = running_scene(&slot);
    lone_fish(&mut scene, Vec2::new(100.0, 100.0), 15.0);

    let capture = scene.input(press(Vec2::new(105.0, 108.0))).unwrap();
    assert_eq!(capture.fish_id, 0);
    assert_eq!(scene.simulation().unwrap().live_count(), 0);
}

#[test]
fn test_click_far_from_fish_changes_nothing() {
    let slot = CanvasSlot::new("main", 320, 240);
    let (_store, mut scene) = running_scene(&slot);
    lone_fish(&mut scene, Vec2::new(100.0, 100.0), 15.0);

    assert!(scene.input(press(Vec2::new(130.0, 130.0))).is_none());
    let sim = scene.simulation().unwrap();
    assert_eq!(sim.live_count(), 1);
    assert_eq!(sim.captured_count(), 0);
}

#[test]
fn test_captured_fish_disappears_from_frame() {
    let slot = CanvasSlot::new("main", 320, 240);
    let (_store, mut scene) = running_scene(&slot);
    lone_fish(&mut scene, Vec2::new(100.0, 100.0), 15.0);
    scene.tick(1.0 / 60.0).unwrap();
    scene.input(press(Vec2::new(100.0, 100.0))).unwrap();

    // Let the capture ripple fade out completely.
    for _ in 0..20 {
        scene.tick(0.1).unwrap();
    }
    assert!(scene.simulation().unwrap().ripples().is_empty());

    // Replay the same steps on an empty pond: the frames must match exactly.
    let params = *scene.frame_params().unwrap();
    let mut empty = SimulationState::with_fish(Vec2::new(320.0, 240.0), Vec::new(), 0);
    empty.update(1.0 / 60.0, &params).unwrap();
    for _ in 0..20 {
        empty.update(0.1, &params).unwrap();
    }
    let mut reference = DrawList::new(320, 240);
    shoal::render::render(&empty, &params, &mut reference);

    assert_eq!(scene.canvas().unwrap(), &reference);
}

// ============================================================================
// Stage
// ============================================================================

#[test]
fn test_stage_reactivation_restores_defaults() {
    let mut stage = Stage::new(CanvasSlot::new("main", 320, 240), seeded());
    stage.activate(PresetId::Water).unwrap();
    stage.store().unwrap().set("speed", 8.0).unwrap();
    stage.tick(1.0 / 60.0).unwrap();

    stage.activate(PresetId::Water).unwrap();
    assert_eq!(stage.store().unwrap().get("speed").unwrap(), 2.0);
    assert_eq!(stage.active_preset(), Some(PresetId::Water));
    assert_eq!(stage.scene().unwrap().frame_count(), 0);
}

#[test]
fn test_stage_shutdown_tears_down_scene() {
    let mut stage = Stage::new(CanvasSlot::new("main", 320, 240), seeded());
    stage.activate(PresetId::Water).unwrap();
    stage.shutdown();
    assert!(stage.scene().is_none());
    assert!(!stage.slot().is_bound());
}
