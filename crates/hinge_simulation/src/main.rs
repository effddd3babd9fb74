//! Headless симуляция HINGE
//!
//! Одна дверь, камера напротив, случайные клики (seeded) в центр экрана.

use std::time::Duration;

use bevy::math::bounding::Aabb3d;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use hinge_simulation::{
    create_headless_app, logger, ActiveViewpoint, BoundingRaycaster, DeterministicRng, Door,
    DoorConfig, DoorMotionFinished, DoorSet, DoorStateChanged, HingeSimulationPlugin, HingeState,
    PointerInputEvent, SceneRaycaster, Viewpoint,
};
use rand::Rng;

const TICKS: usize = 600;
const CLICK_CHANCE: f64 = 0.02;

fn main() {
    let seed = 42;
    let mut app = create_headless_app(seed);
    logger::log_info(&format!("Starting HINGE headless simulation (seed: {})", seed));

    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(1.0 / 60.0)))
        .add_plugins(HingeSimulationPlugin)
        .add_systems(Update, scripted_clicks.before(DoorSet::Interaction))
        .add_systems(Update, report_door_events.after(DoorSet::Animate));

    let door = app
        .world_mut()
        .spawn((Transform::default(), Door::new(DoorConfig::default())))
        .id();

    // Полотно 1×2m, петля в origin
    app.insert_resource(SceneRaycaster::new(BoundingRaycaster::new().with_volume(
        door,
        Aabb3d::new(Vec3::new(0.5, 1.0, 0.0), Vec3::new(0.5, 1.0, 0.05)),
    )));

    app.world_mut().spawn((
        Transform::from_xyz(0.5, 1.0, 3.0),
        Viewpoint::default(),
        ActiveViewpoint,
    ));

    for tick in 0..TICKS {
        app.update();

        if tick % 100 == 0 {
            if let Some(state) = app.world().get::<HingeState>(door) {
                logger::log_info(&format!("Tick {}: {:?}", tick, state.phase()));
            }
        }
    }

    logger::log_info("Simulation complete!");
}

/// Случайный клик в центр viewport (попадает в дверь)
fn scripted_clicks(mut rng: ResMut<DeterministicRng>, mut pointer: EventWriter<PointerInputEvent>) {
    if rng.rng.gen_bool(CLICK_CHANCE) {
        pointer.write(PointerInputEvent {
            primary_pressed: true,
            position: Vec2::new(640.0, 360.0),
        });
    }
}

fn report_door_events(
    mut changed: EventReader<DoorStateChanged>,
    mut finished: EventReader<DoorMotionFinished>,
) {
    for event in changed.read() {
        logger::log_info(&format!(
            "door {:?} toggled → open: {} (interrupted: {})",
            event.door, event.is_open, event.interrupted
        ));
    }

    for event in finished.read() {
        logger::log_info(&format!("door {:?} settled (open: {})", event.door, event.is_open));
    }
}
