//! Rapier raycast backend для door interaction
//!
//! Требует `RapierPhysicsPlugin` в App: коллайдер двери (или pivot'а) должен
//! висеть прямо на door/pivot entity, child коллайдеры не матчатся.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::interaction::{DoorPicking, RayHit, SceneRaycast};
use super::{DoorPlugin, DoorSet};
use crate::logger;

struct RapierRaycast<'a, 'w> {
    context: &'a RapierContext<'w>,
}

impl SceneRaycast for RapierRaycast<'_, '_> {
    fn cast_ray(&self, ray: Ray3d, max_distance: Option<f32>) -> Option<RayHit> {
        let (entity, distance) = self.context.cast_ray(
            ray.origin,
            *ray.direction,
            max_distance.unwrap_or(f32::MAX),
            true,
            QueryFilter::default(),
        )?;

        Some(RayHit { entity, distance })
    }
}

/// System: interaction detector через `RapierContext::cast_ray`
pub fn detect_door_clicks_rapier(rapier_context: ReadRapierContext, mut picking: DoorPicking) {
    let Ok(context) = rapier_context.single() else {
        if picking.discard_pointer_input() {
            logger::log_error("detect_door_clicks_rapier: RapierContext не найден");
        }
        return;
    };

    picking.pick(&RapierRaycast { context: &context });
}

/// Rapier picking для дверей
///
/// Не добавлять `SceneRaycaster` resource одновременно с этим plugin:
/// оба detector'а обработают один и тот же клик.
pub struct RapierPickingPlugin;

impl Plugin for RapierPickingPlugin {
    fn build(&self, app: &mut App) {
        if !app.is_plugin_added::<DoorPlugin>() {
            app.add_plugins(DoorPlugin);
        }

        app.add_systems(Update, detect_door_clicks_rapier.in_set(DoorSet::Interaction));
    }
}
