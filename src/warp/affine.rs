//! Triangle-to-triangle affine solve.
//!
//! Coefficients follow the 2D canvas convention:
//!
//! ```text
//! x' = a*x + c*y + e
//! y' = b*x + d*y + f
//! ```
//!
//! which is `Affine2` with `x_axis = (a, b)`, `y_axis = (c, d)`,
//! `translation = (e, f)`.

use glam::{Affine2, Vec2};

/// Source triangles with `|delta|` at or below this are skipped.
pub const DEGENERATE_DELTA: f32 = 0.0001;

/// Twice the signed area of the source triangle.
#[inline]
pub fn triangle_delta(tri: &[Vec2; 3]) -> f32 {
    let [p0, p1, p2] = *tri;
    (p1.x - p0.x) * (p2.y - p0.y) - (p2.x - p0.x) * (p1.y - p0.y)
}

/// Affine transform taking `src` exactly onto `dst`, vertex by vertex.
///
/// Returns `None` when `src` is degenerate (collinear or near-zero area);
/// the caller must not draw that triangle.
pub fn affine_for(src: &[Vec2; 3], dst: &[Vec2; 3]) -> Option<Affine2> {
    let delta = triangle_delta(src);
    if delta.abs() <= DEGENERATE_DELTA {
        return None;
    }

    let [Vec2 { x: x0, y: y0 }, Vec2 { x: x1, y: y1 }, Vec2 { x: x2, y: y2 }] = *src;
    let [Vec2 { x: u0, y: v0 }, Vec2 { x: u1, y: v1 }, Vec2 { x: u2, y: v2 }] = *dst;

    let a = ((u1 - u0) * (y2 - y0) - (u2 - u0) * (y1 - y0)) / delta;
    let b = ((v1 - v0) * (y2 - y0) - (v2 - v0) * (y1 - y0)) / delta;
    let c = ((u2 - u0) * (x1 - x0) - (u1 - u0) * (x2 - x0)) / delta;
    let d = ((v2 - v0) * (x1 - x0) - (v1 - v0) * (x2 - x0)) / delta;
    let e = u0 - a * x0 - c * y0;
    let f = v0 - b * x0 - d * y0;

    Some(Affine2::from_cols_array(&[a, b, c, d, e, f]))
}
