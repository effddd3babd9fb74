//! HINGE Simulation Core
//!
//! ECS-логика интерактивной двери на Bevy 0.16:
//! - клик по коллайдеру двери → toggle open/closed
//! - плавный поворот pivot (slerp + easing curve) за `duration`
//! - pivot может быть деспавнен сценой посреди анимации
//!
//! Рендер, физика, ввод — на стороне хоста (он же крутит `App::update()`).

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod door;
pub mod logger;

pub use door::{
    ActiveViewpoint, BoundingRaycaster, Door, DoorConfig, DoorEase, DoorMotionFinished, DoorPhase,
    DoorPlugin, DoorSet, DoorStateChanged, HingeState, KeyframeCurve, PointerInputEvent,
    RapierPickingPlugin, RayHit, SceneRaycast, SceneRaycaster, ToggleDoor, Viewpoint,
};

/// Главный plugin симуляции
pub struct HingeSimulationPlugin;

impl Plugin for HingeSimulationPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.add_plugins(DoorPlugin);
    }
}

/// Детерминистичный RNG resource (seeded)
///
/// Используется scripted input'ом (headless прогон, тесты детерминизма).
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
