//! Door Events — input от хоста и уведомления о состоянии двери

use bevy::prelude::*;

/// Pointer input за текущий тик (пишет host)
///
/// - `primary_pressed`: LMB just_pressed (edge, не hold)
/// - `position`: позиция курсора в пикселях, (0, 0) = левый верхний угол viewport
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct PointerInputEvent {
    pub primary_pressed: bool,
    pub position: Vec2,
}

/// Event: toggle двери (клик по коллайдеру или вызов из скрипта хоста)
///
/// Обрабатывается в `DoorSet::Toggle` того же тика.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleDoor {
    pub door: Entity,
}

/// Event: семантическое состояние двери поменялось (анимация только стартовала)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorStateChanged {
    pub door: Entity,
    pub is_open: bool,
    /// true = прервали анимацию в противоположную сторону
    pub interrupted: bool,
}

/// Event: анимация дошла до конца без прерывания, pivot стоит ровно в target
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoorMotionFinished {
    pub door: Entity,
    pub is_open: bool,
}
