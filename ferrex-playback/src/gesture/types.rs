use serde::{Deserialize, Serialize};

use super::direction::Axis;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Largest absolute component.
    pub fn max_magnitude(&self) -> f64 {
        self.x.abs().max(self.y.abs())
    }
}

/// Location in view coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Location normalized to the view bounds, `0.0..=1.0` on both axes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitPoint {
    pub x: f64,
    pub y: f64,
}

impl UnitPoint {
    pub const CENTER: UnitPoint = UnitPoint { x: 0.5, y: 0.5 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for UnitPoint {
    fn default() -> Self {
        Self::CENTER
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}

impl GesturePhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, GesturePhase::Ended | GesturePhase::Cancelled)
    }
}

/// Recognizer output delivered by the host UI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawGesture {
    Pan {
        phase: GesturePhase,
        translation: Vector,
        velocity: Vector,
        location: Point,
        unit_point: UnitPoint,
    },
    Pinch {
        phase: GesturePhase,
        scale: f64,
        velocity: f64,
        location: Point,
        unit_point: UnitPoint,
    },
    Tap {
        count: u32,
        location: Point,
        unit_point: UnitPoint,
    },
    LongPress {
        phase: GesturePhase,
        location: Point,
        unit_point: UnitPoint,
    },
}

impl RawGesture {
    pub fn phase(&self) -> GesturePhase {
        match self {
            RawGesture::Pan { phase, .. }
            | RawGesture::Pinch { phase, .. }
            | RawGesture::LongPress { phase, .. } => *phase,
            RawGesture::Tap { .. } => GesturePhase::Ended,
        }
    }

    pub fn sample(&self) -> GestureSample {
        match self {
            RawGesture::Pan {
                phase,
                translation,
                velocity,
                location,
                unit_point,
            } => GestureSample {
                phase: *phase,
                translation: *translation,
                scale: 1.0,
                velocity: *velocity,
                location: *location,
                unit_point: *unit_point,
            },
            RawGesture::Pinch {
                phase,
                scale,
                velocity,
                location,
                unit_point,
            } => GestureSample {
                phase: *phase,
                translation: Vector::ZERO,
                scale: *scale,
                velocity: Vector::new(*velocity, *velocity),
                location: *location,
                unit_point: *unit_point,
            },
            RawGesture::Tap {
                location,
                unit_point,
                ..
            } => GestureSample::at(GesturePhase::Ended, *location, *unit_point),
            RawGesture::LongPress {
                phase,
                location,
                unit_point,
            } => GestureSample::at(*phase, *location, *unit_point),
        }
    }
}

/// Payload carried by routed intents.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GestureSample {
    pub phase: GesturePhase,
    pub translation: Vector,
    pub scale: f64,
    pub velocity: Vector,
    pub location: Point,
    pub unit_point: UnitPoint,
}

impl GestureSample {
    fn at(phase: GesturePhase, location: Point, unit_point: UnitPoint) -> Self {
        Self {
            phase,
            translation: Vector::ZERO,
            scale: 1.0,
            velocity: Vector::ZERO,
            location,
            unit_point,
        }
    }

    /// Translation along `axis`, with vertical movement flipped so that
    /// dragging up is positive.
    pub fn signed_translation(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Horizontal => self.translation.x,
            Axis::Vertical => -self.translation.y,
        }
    }

    /// View extent along `axis`, recovered from the absolute and normalized
    /// locations. `None` when the normalized coordinate is zero.
    pub fn extent(&self, axis: Axis) -> Option<f64> {
        let (absolute, unit) = match axis {
            Axis::Horizontal => (self.location.x, self.unit_point.x),
            Axis::Vertical => (self.location.y, self.unit_point.y),
        };
        (unit > 0.0).then(|| absolute / unit)
    }
}
