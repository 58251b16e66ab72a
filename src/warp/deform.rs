//! Pin-weighted displacement field.
//!
//! Every pin pulls a query point towards its own target with a weight that
//! falls off with distance from the pin's rest position:
//!
//! ```text
//! weight = depth_boost / ((dist² / (influence * 100)) ^ 1.5 + 0.0001)
//! output = point + Σ weight * (target - rest) / Σ weight
//! ```
//!
//! For `Auto` pins the target is the pin's current position. For `Fixed`
//! pins with a non-zero angle the offset from the rest position to the
//! query point is rotated as well, so the neighborhood swings around the pin.
//!
//! Evaluation is stateless, so vertices can be deformed in any order or in
//! parallel.

use glam::Vec2;
use rayon::prelude::*;

use crate::entities::Pin;

/// Falloff exponent on the normalized squared distance.
pub const FALLOFF_EXPONENT: f32 = 1.5;
/// Scale applied to `influence` before normalizing the squared distance.
pub const INFLUENCE_SCALE: f32 = 100.0;
/// Keeps the weight finite at a pin's own rest position.
pub const WEIGHT_EPSILON: f32 = 0.0001;

/// Weight of `pin` for a point at squared distance `dist_sq` from its rest position.
#[inline]
pub fn pin_weight(pin: &Pin, dist_sq: f32, influence: f32) -> f32 {
    pin.depth_boost() / ((dist_sq / (influence * INFLUENCE_SCALE)).powf(FALLOFF_EXPONENT) + WEIGHT_EPSILON)
}

/// Where `pin` wants to move `point`, expressed in the same frame as the
/// pin's position.
#[inline]
pub fn pin_target(pin: &Pin, point: Vec2) -> Vec2 {
    match pin.fixed_rotation() {
        Some(angle) => {
            let local = point - pin.original();
            let rotated = Vec2::from_angle(angle).rotate(local);
            pin.position + (rotated - local)
        }
        None => pin.position,
    }
}

/// Deformed position of `point` under `pins`.
///
/// Returns `point` unchanged when there are no pins or the total weight is
/// zero. `influence` must be positive.
pub fn deform_point(point: Vec2, pins: &[Pin], influence: f32) -> Vec2 {
    if pins.is_empty() {
        return point;
    }

    let mut total_weight = 0.0f32;
    let mut displacement = Vec2::ZERO;

    for pin in pins {
        let dist_sq = point.distance_squared(pin.original());
        let weight = pin_weight(pin, dist_sq, influence);
        let target = pin_target(pin, point);

        displacement += (target - pin.original()) * weight;
        total_weight += weight;
    }

    if total_weight == 0.0 {
        return point;
    }

    point + displacement / total_weight
}

/// Deform every vertex, preserving order.
pub fn deform_vertices(vertices: &[Vec2], pins: &[Pin], influence: f32) -> Vec<Vec2> {
    if pins.is_empty() {
        return vertices.to_vec();
    }
    vertices
        .par_iter()
        .map(|&v| deform_point(v, pins, influence))
        .collect()
}
