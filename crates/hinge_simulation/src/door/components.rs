//! Door components: конфиг, hinge state, in-flight анимация.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::easing::DoorEase;

/// Нижняя граница duration (секунды) — защита от деления на 0
pub const MIN_DURATION: f32 = 0.0001;

/// Параметры двери (читаются при инициализации)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorConfig {
    /// Угол открытия (градусы, вокруг up-axis). Отрицательный = в другую сторону
    pub open_angle: f32,
    /// Время полного открытия/закрытия (секунды). <= 0 зажимается к `MIN_DURATION`
    pub duration: f32,
    pub ease: DoorEase,
    pub start_open: bool,
    /// Максимальная дистанция клика (метры). <= 0 = без ограничения
    pub max_use_distance: f32,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            open_angle: 90.0,
            duration: 0.6,
            ease: DoorEase::default(),
            start_open: false,
            max_use_distance: 0.0,
        }
    }
}

impl DoorConfig {
    /// Duration с нижней границей (делитель шага анимации)
    pub fn effective_duration(&self) -> f32 {
        self.duration.max(MIN_DURATION)
    }

    /// Лимит raycast. `None` = без ограничения
    pub fn use_distance_limit(&self) -> Option<f32> {
        (self.max_use_distance > 0.0).then_some(self.max_use_distance)
    }
}

/// Дверь на петле
///
/// `pivot: None` → вращается Transform самой door entity.
/// Pivot не принадлежит двери: его может деспавнить сцена в любой момент.
#[derive(Component, Debug, Clone, Default)]
#[require(Transform)]
pub struct Door {
    pub config: DoorConfig,
    pub pivot: Option<Entity>,
}

impl Door {
    pub fn new(config: DoorConfig) -> Self {
        Self { config, pivot: None }
    }

    pub fn with_pivot(mut self, pivot: Entity) -> Self {
        self.pivot = Some(pivot);
        self
    }
}

/// Фаза двери (производная от `HingeState`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum DoorPhase {
    Closed,
    Open,
    AnimatingToOpen,
    AnimatingToClosed,
}

/// Результат одного шага анимации
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HingeStep {
    /// Промежуточная ориентация, task продолжается
    InProgress(Quat),
    /// Точная целевая ориентация, task завершён
    Finished(Quat),
}

impl HingeStep {
    pub fn rotation(&self) -> Quat {
        match *self {
            HingeStep::InProgress(rotation) | HingeStep::Finished(rotation) => rotation,
        }
    }
}

/// In-flight анимация: from/to фиксированы
///
/// Копится время (секунды), доля `t` пересчитывается из него каждый тик:
/// сумма долей в f32 уплывает на длинных анимациях.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct HingeTask {
    pub from: Quat,
    pub to: Quat,
    /// Прошедшее время анимации (секунды)
    pub elapsed: f32,
    /// Пройденная доля [0, 1]
    pub t: f32,
}

impl HingeTask {
    pub fn new(from: Quat, to: Quat) -> Self {
        Self {
            from,
            to,
            elapsed: 0.0,
            t: 0.0,
        }
    }

    /// Один тик: `t = elapsed / duration`, затем slerp(from, to, ease(t))
    ///
    /// Завершение ровно при `elapsed >= duration`.
    /// Большой delta просто проматывает анимацию вперёд.
    pub fn advance(&mut self, delta: f32, duration: f32, ease: &DoorEase) -> HingeStep {
        let duration = duration.max(MIN_DURATION);
        self.elapsed += delta.max(0.0);

        if self.elapsed >= duration {
            self.t = 1.0;
            return HingeStep::Finished(self.to);
        }

        self.t = (self.elapsed / duration).clamp(0.0, 1.0);
        let eased = ease.evaluate(self.t);
        HingeStep::InProgress(self.from.slerp(self.to, eased))
    }
}

/// Runtime state двери (вставляется при инициализации)
///
/// Инварианты:
/// - `closed`/`open` — снимок при инициализации, дальше не меняются
/// - `is_open` — семантическое состояние, флипается ровно 1 раз на toggle
/// - максимум 1 `HingeTask` на дверь
#[derive(Component, Debug, Clone, Reflect)]
pub struct HingeState {
    pub pivot: Entity,
    pub closed: Quat,
    pub open: Quat,
    pub is_open: bool,
    pub animation: Option<HingeTask>,
}

impl HingeState {
    /// `open = closed ∘ RotY(open_angle)`
    pub fn new(pivot: Entity, closed: Quat, open_angle_degrees: f32, is_open: bool) -> Self {
        Self {
            pivot,
            closed,
            open: closed * Quat::from_rotation_y(open_angle_degrees.to_radians()),
            is_open,
            animation: None,
        }
    }

    pub fn phase(&self) -> DoorPhase {
        match (self.is_open, self.animation.is_some()) {
            (true, false) => DoorPhase::Open,
            (false, false) => DoorPhase::Closed,
            (true, true) => DoorPhase::AnimatingToOpen,
            (false, true) => DoorPhase::AnimatingToClosed,
        }
    }

    /// Ориентация, к которой сходится pivot при текущем семантическом состоянии
    pub fn target(&self) -> Quat {
        if self.is_open {
            self.open
        } else {
            self.closed
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Flip состояния + новая анимация
    ///
    /// from/to берутся из семантического состояния ДО flip'а, а не из текущей
    /// интерполированной ориентации. Предыдущий task отменяется заменой.
    /// Возвращает отменённый task (если был).
    pub fn toggle(&mut self) -> Option<HingeTask> {
        let (from, to) = if self.is_open {
            (self.open, self.closed)
        } else {
            (self.closed, self.open)
        };

        let cancelled = self.animation.replace(HingeTask::new(from, to));
        self.is_open = !self.is_open;
        cancelled
    }

    /// Отмена без сброса ориентации (pivot остаётся там, где был)
    pub fn cancel(&mut self) -> Option<HingeTask> {
        self.animation.take()
    }

    /// Шаг активного task. `None` = дверь в покое.
    /// На `Finished` handle очищается.
    pub fn step(&mut self, delta: f32, duration: f32, ease: &DoorEase) -> Option<HingeStep> {
        let task = self.animation.as_mut()?;
        let step = task.advance(delta, duration, ease);

        if matches!(step, HingeStep::Finished(_)) {
            self.animation = None;
        }

        Some(step)
    }
}
