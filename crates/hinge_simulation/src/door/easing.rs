//! Easing curves для hinge анимации
//!
//! `KeyframeCurve` — кривая из ключей с Hermite сегментами (time → value).
//! Default: ease-in/ease-out 0→1 с нулевыми касательными (= smoothstep).

use serde::{Deserialize, Serialize};

/// Ключ кривой
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
    /// Наклон слева от ключа (value per second)
    #[serde(default)]
    pub in_tangent: f32,
    /// Наклон справа от ключа
    #[serde(default)]
    pub out_tangent: f32,
}

impl Keyframe {
    pub fn new(time: f32, value: f32) -> Self {
        Self {
            time,
            value,
            in_tangent: 0.0,
            out_tangent: 0.0,
        }
    }

    pub fn with_tangents(time: f32, value: f32, in_tangent: f32, out_tangent: f32) -> Self {
        Self {
            time,
            value,
            in_tangent,
            out_tangent,
        }
    }
}

/// Кривая из ключей, отсортированных по `time`
///
/// Вне диапазона ключей значение зажимается к первому/последнему ключу.
/// Пустая кривая возвращает 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Keyframe>", into = "Vec<Keyframe>")]
pub struct KeyframeCurve {
    keys: Vec<Keyframe>,
}

impl KeyframeCurve {
    pub fn new(mut keys: Vec<Keyframe>) -> Self {
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Плавный старт и остановка (касательные = 0 на концах)
    pub fn ease_in_out(time_start: f32, value_start: f32, time_end: f32, value_end: f32) -> Self {
        Self::new(vec![
            Keyframe::new(time_start, value_start),
            Keyframe::new(time_end, value_end),
        ])
    }

    pub fn linear(time_start: f32, value_start: f32, time_end: f32, value_end: f32) -> Self {
        let span = time_end - time_start;
        let slope = if span.abs() > f32::EPSILON {
            (value_end - value_start) / span
        } else {
            0.0
        };

        Self::new(vec![
            Keyframe::with_tangents(time_start, value_start, 0.0, slope),
            Keyframe::with_tangents(time_end, value_end, slope, 0.0),
        ])
    }

    pub fn constant(value: f32) -> Self {
        Self::new(vec![Keyframe::new(0.0, value)])
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn evaluate(&self, time: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };

        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        // Сегмент [k0, k1], где k0.time <= time < k1.time
        let index = self.keys.partition_point(|key| key.time <= time);
        let k0 = &self.keys[index - 1];
        let k1 = &self.keys[index];

        hermite(k0, k1, time)
    }
}

impl Default for KeyframeCurve {
    fn default() -> Self {
        Self::ease_in_out(0.0, 0.0, 1.0, 1.0)
    }
}

fn hermite(k0: &Keyframe, k1: &Keyframe, time: f32) -> f32 {
    let span = k1.time - k0.time;
    if span <= f32::EPSILON {
        return k1.value;
    }

    let s = (time - k0.time) / span;
    let s2 = s * s;
    let s3 = s2 * s;

    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;

    h00 * k0.value + h10 * span * k0.out_tangent + h01 * k1.value + h11 * span * k1.in_tangent
}

/// Easing door анимации
///
/// Результат используется как есть: монотонность не проверяется,
/// overshoot кривая даёт overshoot поворота.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DoorEase {
    Curve(KeyframeCurve),

    /// Кривая из кода (не сериализуется)
    #[serde(skip)]
    Custom(fn(f32) -> f32),
}

impl DoorEase {
    pub fn evaluate(&self, t: f32) -> f32 {
        match self {
            DoorEase::Curve(curve) => curve.evaluate(t),
            DoorEase::Custom(f) => f(t),
        }
    }
}

impl Default for DoorEase {
    fn default() -> Self {
        DoorEase::Curve(KeyframeCurve::default())
    }
}

impl From<Vec<Keyframe>> for KeyframeCurve {
    fn from(keys: Vec<Keyframe>) -> Self {
        Self::new(keys)
    }
}

impl From<KeyframeCurve> for Vec<Keyframe> {
    fn from(curve: KeyframeCurve) -> Self {
        curve.keys
    }
}

impl From<KeyframeCurve> for DoorEase {
    fn from(curve: KeyframeCurve) -> Self {
        DoorEase::Curve(curve)
    }
}
