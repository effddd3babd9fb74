//! Door integration test
//!
//! Headless App + DoorPlugin, delta = 100ms на тик.
//! Первый `app.update()` идёт с delta = 0 (инициализация дверей).
//!
//! Проверяем:
//! - snapshot closed/open при спавне
//! - toggle → анимация → точный target
//! - interrupt и двойной toggle
//! - деспавн pivot посреди анимации
//! - клик → raycast → toggle (distance / identity gating)
//! - клик без raycaster'а не переживает тик

use std::time::Duration;

use bevy::math::bounding::Aabb3d;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use hinge_simulation::*;

const TICK: Duration = Duration::from_millis(100);
const SCREEN_CENTER: Vec2 = Vec2::new(640.0, 360.0);

/// Helper: App с door plugin и фиксированным шагом времени
fn create_door_app() -> App {
    let mut app = create_headless_app(42);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(TICK))
        .add_plugins(HingeSimulationPlugin);
    app
}

/// Helper: дверь 1×2m с петлёй в origin, вращается сама door entity
fn spawn_door(app: &mut App, config: DoorConfig) -> Entity {
    app.world_mut()
        .spawn((Transform::default(), Door::new(config)))
        .id()
}

fn door_volume() -> Aabb3d {
    Aabb3d::new(Vec3::new(0.5, 1.0, 0.0), Vec3::new(0.5, 1.0, 0.05))
}

/// Helper: камера в 3m перед дверью, смотрит на её центр
fn spawn_viewpoint(app: &mut App) -> Entity {
    app.world_mut()
        .spawn((
            Transform::from_xyz(0.5, 1.0, 3.0),
            Viewpoint::default(),
            ActiveViewpoint,
        ))
        .id()
}

fn hinge(app: &App, door: Entity) -> HingeState {
    app.world()
        .get::<HingeState>(door)
        .cloned()
        .expect("door initialized")
}

fn rotation(app: &App, entity: Entity) -> Quat {
    app.world().get::<Transform>(entity).expect("transform").rotation
}

fn click(app: &mut App, position: Vec2) {
    app.world_mut().send_event(PointerInputEvent {
        primary_pressed: true,
        position,
    });
}

fn drain_finished(app: &mut App) -> Vec<DoorMotionFinished> {
    app.world_mut()
        .resource_mut::<Events<DoorMotionFinished>>()
        .drain()
        .collect()
}

#[test]
fn test_initialization_snapshot() {
    let mut app = create_door_app();

    let r0 = Quat::from_rotation_y(0.7) * Quat::from_rotation_x(0.1);
    let pivot = app.world_mut().spawn(Transform::from_rotation(r0)).id();
    let door = app
        .world_mut()
        .spawn((
            Transform::default(),
            Door::new(DoorConfig {
                open_angle: 60.0,
                ..default()
            })
            .with_pivot(pivot),
        ))
        .id();

    app.update();

    let state = hinge(&app, door);
    assert_eq!(state.pivot, pivot);
    assert_eq!(state.closed, r0);
    assert_eq!(state.open, r0 * Quat::from_rotation_y(60.0_f32.to_radians()));
    assert_eq!(state.phase(), DoorPhase::Closed);
    assert_eq!(rotation(&app, pivot), r0);

    // Snapshot не меняется после toggle'ов
    for _ in 0..3 {
        app.world_mut().send_event(ToggleDoor { door });
        app.update();
    }
    let after = hinge(&app, door);
    assert_eq!(after.closed, r0);
    assert_eq!(after.open, state.open);
}

#[test]
fn test_start_open_rotates_pivot() {
    let mut app = create_door_app();
    let door = spawn_door(
        &mut app,
        DoorConfig {
            start_open: true,
            ..default()
        },
    );

    app.update();

    let state = hinge(&app, door);
    assert_eq!(state.phase(), DoorPhase::Open);
    assert_eq!(rotation(&app, door), state.open);
}

#[test]
fn test_toggle_six_ticks_reaches_open_exactly() {
    let mut app = create_door_app();
    let door = spawn_door(&mut app, DoorConfig::default());
    app.update();

    app.world_mut().send_event(ToggleDoor { door });

    for tick in 1..=5 {
        app.update();
        assert_eq!(
            hinge(&app, door).phase(),
            DoorPhase::AnimatingToOpen,
            "tick {}",
            tick
        );
    }
    assert!(drain_finished(&mut app).is_empty());

    app.update();

    let state = hinge(&app, door);
    assert_eq!(state.phase(), DoorPhase::Open);
    assert!(state.animation.is_none());
    assert_eq!(rotation(&app, door), state.open);
    assert_eq!(
        drain_finished(&mut app),
        vec![DoorMotionFinished { door, is_open: true }]
    );
}

#[test]
fn test_toggle_moves_pivot_in_same_tick() {
    let mut app = create_door_app();
    let door = spawn_door(&mut app, DoorConfig::default());
    app.update();

    app.world_mut().send_event(ToggleDoor { door });
    app.update();

    let state = hinge(&app, door);
    let current = rotation(&app, door);
    assert!(current.angle_between(state.closed) > 1e-4);
    assert!(current.angle_between(state.open) > 1e-4);
}

#[test]
fn test_double_toggle_restores_semantic_state() {
    let mut app = create_door_app();
    let door = spawn_door(&mut app, DoorConfig::default());
    app.update();

    app.world_mut().send_event(ToggleDoor { door });
    app.world_mut().send_event(ToggleDoor { door });
    app.update();

    let state = hinge(&app, door);
    assert!(!state.is_open);
    assert_eq!(state.phase(), DoorPhase::AnimatingToClosed);

    // Второй task стартует с open → pivot рядом с open, а не closed
    let current = rotation(&app, door);
    assert!(current.angle_between(state.open) < current.angle_between(state.closed));

    let changed: Vec<DoorStateChanged> = app
        .world_mut()
        .resource_mut::<Events<DoorStateChanged>>()
        .drain()
        .collect();
    assert_eq!(changed.len(), 2);
    assert!(!changed[0].interrupted);
    assert!(changed[1].interrupted);

    // Без новых toggle'ов сходится к closed
    for _ in 0..6 {
        app.update();
    }
    assert_eq!(rotation(&app, door), hinge(&app, door).closed);
}

#[test]
fn test_interrupt_mid_animation_reverses() {
    let mut app = create_door_app();
    let door = spawn_door(&mut app, DoorConfig::default());
    app.update();

    app.world_mut().send_event(ToggleDoor { door });
    app.update();
    app.update();

    app.world_mut().send_event(ToggleDoor { door });
    app.update();

    let state = hinge(&app, door);
    assert_eq!(state.phase(), DoorPhase::AnimatingToClosed);
    let task = state.animation.expect("animating");
    assert_eq!(task.from, state.open);
    assert_eq!(task.to, state.closed);
}

#[test]
fn test_pivot_despawned_mid_animation() {
    let mut app = create_door_app();
    let pivot = app.world_mut().spawn(Transform::default()).id();
    let door = app
        .world_mut()
        .spawn((
            Transform::default(),
            Door::new(DoorConfig::default()).with_pivot(pivot),
        ))
        .id();
    app.update();

    app.world_mut().send_event(ToggleDoor { door });
    app.update();
    app.update();
    assert!(hinge(&app, door).animation.is_some());

    app.world_mut().despawn(pivot);
    let door_rotation = rotation(&app, door);
    app.update();

    let state = hinge(&app, door);
    assert!(state.animation.is_none());
    assert!(state.is_open);
    assert_eq!(rotation(&app, door), door_rotation);
    assert!(drain_finished(&mut app).is_empty());

    // Toggle с мёртвым pivot — no-op
    app.world_mut().send_event(ToggleDoor { door });
    app.update();
    let state = hinge(&app, door);
    assert!(state.is_open);
    assert!(state.animation.is_none());
}

#[test]
fn test_door_despawned_mid_animation() {
    let mut app = create_door_app();
    let door = spawn_door(&mut app, DoorConfig::default());
    app.update();

    app.world_mut().send_event(ToggleDoor { door });
    app.update();

    app.world_mut().despawn(door);
    app.world_mut().send_event(ToggleDoor { door });
    for _ in 0..10 {
        app.update();
    }

    assert!(app.world().get_entity(door).is_err());
}

#[test]
fn test_invalid_pivot_leaves_door_uninitialized() {
    let mut app = create_door_app();
    let pivot = app.world_mut().spawn_empty().id();
    app.world_mut().despawn(pivot);

    let door = app
        .world_mut()
        .spawn((
            Transform::default(),
            Door::new(DoorConfig::default()).with_pivot(pivot),
        ))
        .id();
    app.update();

    assert!(app.world().get::<HingeState>(door).is_none());

    app.world_mut().send_event(ToggleDoor { door });
    app.update();
    assert!(app.world().get::<HingeState>(door).is_none());
}

#[test]
fn test_click_toggles_door() {
    let mut app = create_door_app();
    let door = spawn_door(&mut app, DoorConfig::default());
    app.insert_resource(SceneRaycaster::new(
        BoundingRaycaster::new().with_volume(door, door_volume()),
    ));
    spawn_viewpoint(&mut app);
    app.update();

    click(&mut app, SCREEN_CENTER);
    app.update();

    assert_eq!(hinge(&app, door).phase(), DoorPhase::AnimatingToOpen);
}

#[test]
fn test_click_on_pivot_collider() {
    let mut app = create_door_app();
    let pivot = app.world_mut().spawn(Transform::default()).id();
    let door = app
        .world_mut()
        .spawn((
            Transform::default(),
            Door::new(DoorConfig::default()).with_pivot(pivot),
        ))
        .id();
    app.insert_resource(SceneRaycaster::new(
        BoundingRaycaster::new().with_volume(pivot, door_volume()),
    ));
    spawn_viewpoint(&mut app);
    app.update();

    click(&mut app, SCREEN_CENTER);
    app.update();

    assert!(hinge(&app, door).is_open);
}

#[test]
fn test_release_or_miss_does_not_toggle() {
    let mut app = create_door_app();
    let door = spawn_door(&mut app, DoorConfig::default());
    app.insert_resource(SceneRaycaster::new(
        BoundingRaycaster::new().with_volume(door, door_volume()),
    ));
    spawn_viewpoint(&mut app);
    app.update();

    // Кнопка не нажата
    app.world_mut().send_event(PointerInputEvent {
        primary_pressed: false,
        position: SCREEN_CENTER,
    });
    app.update();
    assert_eq!(hinge(&app, door).phase(), DoorPhase::Closed);

    // Клик в угол экрана — мимо двери
    click(&mut app, Vec2::ZERO);
    app.update();
    assert_eq!(hinge(&app, door).phase(), DoorPhase::Closed);
}

#[test]
fn test_click_without_viewpoint_is_ignored() {
    let mut app = create_door_app();
    let door = spawn_door(&mut app, DoorConfig::default());
    app.insert_resource(SceneRaycaster::new(
        BoundingRaycaster::new().with_volume(door, door_volume()),
    ));
    app.update();

    click(&mut app, SCREEN_CENTER);
    app.update();

    assert_eq!(hinge(&app, door).phase(), DoorPhase::Closed);
}

#[test]
fn test_click_without_raycaster_is_dropped() {
    let mut app = create_door_app();
    let door = spawn_door(&mut app, DoorConfig::default());
    spawn_viewpoint(&mut app);
    app.update();

    click(&mut app, SCREEN_CENTER);
    app.update();

    // Raycaster появился позже: клик прошлого тика не должен сработать
    app.insert_resource(SceneRaycaster::new(
        BoundingRaycaster::new().with_volume(door, door_volume()),
    ));
    app.update();

    assert_eq!(hinge(&app, door).phase(), DoorPhase::Closed);

    click(&mut app, SCREEN_CENTER);
    app.update();
    assert!(hinge(&app, door).is_open);
}

#[test]
fn test_click_distance_gating() {
    // Камера в ~2.95m от полотна
    for (max_use_distance, expect_open) in [(2.0, false), (5.0, true), (0.0, true), (-1.0, true)] {
        let mut app = create_door_app();
        let door = spawn_door(
            &mut app,
            DoorConfig {
                max_use_distance,
                ..default()
            },
        );
        app.insert_resource(SceneRaycaster::new(
            BoundingRaycaster::new().with_volume(door, door_volume()),
        ));
        spawn_viewpoint(&mut app);
        app.update();

        click(&mut app, SCREEN_CENTER);
        app.update();

        assert_eq!(
            hinge(&app, door).is_open,
            expect_open,
            "max_use_distance = {}",
            max_use_distance
        );
    }
}

#[test]
fn test_click_blocked_by_other_geometry() {
    let mut app = create_door_app();
    let door = spawn_door(&mut app, DoorConfig::default());
    let wall = app.world_mut().spawn(Transform::default()).id();

    // Стекло между камерой и дверью
    app.insert_resource(SceneRaycaster::new(
        BoundingRaycaster::new()
            .with_volume(door, door_volume())
            .with_volume(wall, Aabb3d::new(Vec3::new(0.5, 1.0, 1.5), Vec3::new(2.0, 2.0, 0.05))),
    ));
    spawn_viewpoint(&mut app);
    app.update();

    click(&mut app, SCREEN_CENTER);
    app.update();

    assert_eq!(hinge(&app, door).phase(), DoorPhase::Closed);
}
