//! Door domain: дверь на петле с плавным open/close по клику
//!
//! ECS ответственность:
//! - Snapshot closed/open ориентаций при спавне
//! - Семантическое состояние (open/closed) + in-flight hinge анимация
//! - Pointer → raycast → ToggleDoor
//!
//! Host ответственность:
//! - PointerInputEvent каждый тик (LMB just_pressed + позиция курсора)
//! - Viewpoint (камера) и raycast backend (SceneRaycaster или Rapier)
//! - Рендер pivot Transform

use bevy::prelude::*;

pub mod components;
pub mod easing;
pub mod events;
pub mod interaction;
pub mod picking;
pub mod systems;


pub use components::{Door, DoorConfig, DoorPhase, HingeState, HingeStep, HingeTask, MIN_DURATION};
pub use easing::{DoorEase, Keyframe, KeyframeCurve};
pub use events::{DoorMotionFinished, DoorStateChanged, PointerInputEvent, ToggleDoor};
pub use interaction::{
    resolve_door_hit, ActiveViewpoint, BoundingRaycaster, RayHit, SceneRaycast, SceneRaycaster,
    Viewpoint,
};
pub use picking::RapierPickingPlugin;

/// Порядок door систем внутри тика
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoorSet {
    /// Snapshot ориентаций новых дверей
    Initialize,
    /// Pointer → raycast → ToggleDoor
    Interaction,
    /// ToggleDoor → flip + новая анимация
    Toggle,
    /// Шаг анимации → pivot Transform
    Animate,
}

/// Door Plugin
///
/// Регистрирует door системы в Update (1 шаг на frame, delta = `Time::delta_secs`).
///
/// Порядок выполнения:
/// 1. initialize_doors — snapshot для `Added<Door>`
/// 2. detect_door_clicks — raycast через `SceneRaycaster` (если resource есть)
/// 3. apply_door_toggles — flip + restart анимации
/// 4. animate_hinges — slerp шаг, завершение → точный target
///
/// Toggle этого тика влияет на анимацию этого же тика.
pub struct DoorPlugin;

impl Plugin for DoorPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PointerInputEvent>()
            .add_event::<ToggleDoor>()
            .add_event::<DoorStateChanged>()
            .add_event::<DoorMotionFinished>();

        app.configure_sets(
            Update,
            (
                DoorSet::Initialize,
                DoorSet::Interaction,
                DoorSet::Toggle,
                DoorSet::Animate,
            )
                .chain(),
        );

        app.add_systems(
            Update,
            (
                systems::initialize_doors.in_set(DoorSet::Initialize),
                interaction::detect_door_clicks.in_set(DoorSet::Interaction),
                systems::apply_door_toggles.in_set(DoorSet::Toggle),
                systems::animate_hinges.in_set(DoorSet::Animate),
            ),
        );
    }
}
