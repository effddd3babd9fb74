//! Pointer → door interaction (raycast от viewpoint через курсор)
//!
//! Raycast backend инжектится через trait `SceneRaycast`:
//! - `SceneRaycaster` resource (любая реализация, в т.ч. `BoundingRaycaster`)
//! - Rapier backend — см. `picking.rs`
//!
//! Клик засчитывается двери, если первый hit луча — её pivot или сама door entity.

use bevy::ecs::system::SystemParam;
use bevy::math::bounding::{Aabb3d, RayCast3d};
use bevy::prelude::*;

use super::components::{Door, HingeState};
use super::events::{PointerInputEvent, ToggleDoor};
use crate::logger;

/// Камера (pinhole): источник лучей для кликов
///
/// Смотрит вдоль -Z своего Transform, `fov_y` в радианах.
#[derive(Component, Debug, Clone, Copy, Reflect)]
pub struct Viewpoint {
    pub fov_y: f32,
    /// Размер viewport в пикселях
    pub viewport_size: Vec2,
}

impl Default for Viewpoint {
    fn default() -> Self {
        Self {
            fov_y: 60.0_f32.to_radians(),
            viewport_size: Vec2::new(1280.0, 720.0),
        }
    }
}

impl Viewpoint {
    /// Луч из позиции viewpoint через пиксель `pointer` (origin = левый верхний угол)
    ///
    /// `None` для вырожденного viewport.
    pub fn ray_through(&self, transform: &Transform, pointer: Vec2) -> Option<Ray3d> {
        if self.viewport_size.x <= 0.0 || self.viewport_size.y <= 0.0 {
            return None;
        }

        let ndc = Vec2::new(
            pointer.x / self.viewport_size.x * 2.0 - 1.0,
            1.0 - pointer.y / self.viewport_size.y * 2.0,
        );
        let half_height = (self.fov_y * 0.5).tan();
        let aspect = self.viewport_size.x / self.viewport_size.y;

        let local = Vec3::new(ndc.x * half_height * aspect, ndc.y * half_height, -1.0);
        let direction = Dir3::new(transform.rotation * local).ok()?;

        Some(Ray3d::new(transform.translation, direction))
    }
}

/// Маркер активной камеры. Ровно одна, иначе клики игнорируются
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ActiveViewpoint;

/// Ближайшее пересечение луча
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Entity коллайдера
    pub entity: Entity,
    /// Дистанция от origin луча (метры)
    pub distance: f32,
}

/// Spatial hit-test provider
pub trait SceneRaycast {
    /// Ближайший hit вдоль луча. `max_distance: None` = без ограничения
    fn cast_ray(&self, ray: Ray3d, max_distance: Option<f32>) -> Option<RayHit>;
}

/// Инжектированный raycast backend
#[derive(Resource)]
pub struct SceneRaycaster(pub Box<dyn SceneRaycast + Send + Sync>);

impl SceneRaycaster {
    pub fn new(raycast: impl SceneRaycast + Send + Sync + 'static) -> Self {
        Self(Box::new(raycast))
    }
}

/// Raycast по статичному списку AABB (без физического движка)
#[derive(Debug, Clone, Default)]
pub struct BoundingRaycaster {
    volumes: Vec<(Entity, Aabb3d)>,
}

impl BoundingRaycaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_volume(mut self, entity: Entity, volume: Aabb3d) -> Self {
        self.insert(entity, volume);
        self
    }

    /// Добавляет или заменяет volume entity
    pub fn insert(&mut self, entity: Entity, volume: Aabb3d) {
        self.remove(entity);
        self.volumes.push((entity, volume));
    }

    pub fn remove(&mut self, entity: Entity) {
        self.volumes.retain(|(owner, _)| *owner != entity);
    }
}

impl SceneRaycast for BoundingRaycaster {
    fn cast_ray(&self, ray: Ray3d, max_distance: Option<f32>) -> Option<RayHit> {
        let cast = RayCast3d::from_ray(ray, max_distance.unwrap_or(f32::MAX));

        self.volumes
            .iter()
            .filter_map(|(entity, volume)| {
                cast.aabb_intersection_at(volume).map(|distance| RayHit {
                    entity: *entity,
                    distance,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

/// Решение по одному hit: toggle или нет
///
/// - нет hit → нет
/// - `limit = Some(d_max)` и hit дальше → нет (backend мог лимит проигнорировать)
/// - hit не pivot и не door → нет
pub fn resolve_door_hit(hit: Option<RayHit>, door: Entity, pivot: Entity, limit: Option<f32>) -> bool {
    let Some(hit) = hit else {
        return false;
    };

    if let Some(limit) = limit {
        if hit.distance > limit {
            return false;
        }
    }

    hit.entity == pivot || hit.entity == door
}

/// Общая часть interaction detector'а (не зависит от raycast backend)
#[derive(SystemParam)]
pub struct DoorPicking<'w, 's> {
    pointer: EventReader<'w, 's, PointerInputEvent>,
    viewpoints: Query<'w, 's, (&'static Viewpoint, &'static Transform), With<ActiveViewpoint>>,
    doors: Query<'w, 's, (Entity, &'static Door, &'static HingeState)>,
    alive: Query<'w, 's, (), With<Transform>>,
    toggles: EventWriter<'w, ToggleDoor>,
}

impl DoorPicking<'_, '_> {
    /// Обрабатывает клик текущего тика, возвращает число отправленных `ToggleDoor`
    pub fn pick(&mut self, raycast: &dyn SceneRaycast) -> usize {
        let Some(press) = self
            .pointer
            .read()
            .filter(|input| input.primary_pressed)
            .last()
            .copied()
        else {
            return 0;
        };

        // Нет активной камеры — кликать некуда (не ошибка)
        let Ok((viewpoint, transform)) = self.viewpoints.single() else {
            return 0;
        };

        let Some(ray) = viewpoint.ray_through(transform, press.position) else {
            return 0;
        };

        let mut toggled = 0;
        for (door, config, state) in self.doors.iter() {
            // Pivot мог быть деспавнен в этом тике
            if !self.alive.contains(state.pivot) {
                continue;
            }

            let limit = config.config.use_distance_limit();
            let hit = raycast.cast_ray(ray, limit);

            if resolve_door_hit(hit, door, state.pivot, limit) {
                logger::log(&format!("door {:?}: click hit at {:?}", door, hit.map(|h| h.distance)));
                self.toggles.write(ToggleDoor { door });
                toggled += 1;
            }
        }

        toggled
    }

    /// Клики этого тика без raycast backend'а пропадают, а не ждут следующего тика
    ///
    /// `true` если среди отброшенного был клик.
    pub fn discard_pointer_input(&mut self) -> bool {
        self.pointer
            .read()
            .fold(false, |pressed, input| pressed || input.primary_pressed)
    }
}

/// System: interaction detector через `SceneRaycaster` resource
///
/// Без resource клики тика отбрасываются (см. `RapierPickingPlugin` для rapier backend).
pub fn detect_door_clicks(raycaster: Option<Res<SceneRaycaster>>, mut picking: DoorPicking) {
    let Some(raycaster) = raycaster else {
        picking.discard_pointer_input();
        return;
    };

    picking.pick(&*raycaster.0);
}
