//! Door systems: инициализация, toggle, hinge анимация.
//!
//! Любая операция с pivot сначала проверяет, что pivot ещё жив (есть Transform).
//! Деспавненный pivot — не ошибка: операция молча пропускается.

use bevy::prelude::*;

use super::components::{Door, HingeState, HingeStep};
use super::events::{DoorMotionFinished, DoorStateChanged, ToggleDoor};
use crate::logger;

/// Система: снимок closed/open ориентаций для новых дверей
///
/// Одноразовая: `Added<Door>`. Дверь с невалидным pivot остаётся
/// без `HingeState` и дальше игнорируется всеми door системами.
pub fn initialize_doors(
    mut commands: Commands,
    doors: Query<(Entity, &Door), Added<Door>>,
    mut transforms: Query<&mut Transform>,
) {
    for (entity, door) in doors.iter() {
        let pivot = door.pivot.unwrap_or(entity);

        let Ok(mut pivot_transform) = transforms.get_mut(pivot) else {
            logger::log_warning(&format!(
                "initialize_doors: door {:?} — pivot {:?} не найден, дверь не инициализирована",
                entity, pivot
            ));
            continue;
        };

        let state = HingeState::new(
            pivot,
            pivot_transform.rotation,
            door.config.open_angle,
            door.config.start_open,
        );

        if state.is_open {
            pivot_transform.rotation = state.open;
        }

        logger::log_info(&format!(
            "door {:?} initialized (pivot {:?}, open_angle {:.1}°, open: {})",
            entity, pivot, door.config.open_angle, state.is_open
        ));

        commands.entity(entity).try_insert(state);
    }
}

/// Система: обработка `ToggleDoor`
///
/// Флип семантического состояния сразу, анимация стартует с ориентации
/// ДО флипа. Текущая анимация (если есть) отменяется.
pub fn apply_door_toggles(
    mut requests: EventReader<ToggleDoor>,
    mut doors: Query<&mut HingeState>,
    pivots: Query<(), With<Transform>>,
    mut changed_events: EventWriter<DoorStateChanged>,
) {
    for request in requests.read() {
        let Ok(mut state) = doors.get_mut(request.door) else {
            logger::log(&format!(
                "apply_door_toggles: {:?} не инициализированная дверь, toggle пропущен",
                request.door
            ));
            continue;
        };

        if !pivots.contains(state.pivot) {
            logger::log_warning(&format!(
                "apply_door_toggles: door {:?} — pivot {:?} деспавнен, toggle пропущен",
                request.door, state.pivot
            ));
            continue;
        }

        let interrupted = state.toggle().is_some();

        logger::log(&format!(
            "door {:?} → {} (interrupted: {})",
            request.door,
            if state.is_open { "open" } else { "closed" },
            interrupted
        ));

        changed_events.write(DoorStateChanged {
            door: request.door,
            is_open: state.is_open,
            interrupted,
        });
    }
}

/// Система: один шаг hinge анимации на тик
///
/// Работает после `apply_door_toggles`: toggle этого тика уже даёт первый шаг.
/// Pivot деспавнен → task сбрасывается без записи ориентации.
pub fn animate_hinges(
    time: Res<Time>,
    mut doors: Query<(Entity, &Door, &mut HingeState)>,
    mut transforms: Query<&mut Transform>,
    mut finished_events: EventWriter<DoorMotionFinished>,
) {
    let delta = time.delta_secs();

    for (entity, door, mut state) in doors.iter_mut() {
        if !state.is_animating() {
            continue;
        }

        let Ok(mut pivot_transform) = transforms.get_mut(state.pivot) else {
            state.cancel();
            logger::log_warning(&format!(
                "animate_hinges: door {:?} — pivot {:?} деспавнен, анимация прервана",
                entity, state.pivot
            ));
            continue;
        };

        let Some(step) = state.step(delta, door.config.duration, &door.config.ease) else {
            continue;
        };

        pivot_transform.rotation = step.rotation();

        if let HingeStep::Finished(_) = step {
            logger::log(&format!(
                "door {:?} motion finished ({})",
                entity,
                if state.is_open { "open" } else { "closed" }
            ));

            finished_events.write(DoorMotionFinished {
                door: entity,
                is_open: state.is_open,
            });
        }
    }
}
