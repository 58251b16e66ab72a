//! Render targets.
//!
//! [`Surface`] is the only drawing capability the warp pipeline needs from
//! its host: fill a triangle with an affinely sampled source image, plus a
//! few stroke/fill primitives for the interactive overlay.
//!
//! [`Canvas`] is the software implementation over an `RgbaImage`:
//! - pixel centers at `(x + 0.5, y + 0.5)`
//! - edge-function coverage; edges shared by two triangles belong to exactly
//!   one of them, so a tessellated image has no seams and no double blends
//! - bilinear sampling through the inverse affine, transparent outside the source
//! - source-over blending in premultiplied space, stored as straight RGBA8

use glam::{Affine2, Vec2};
use image::{Rgba, RgbaImage};

pub trait Surface {
    /// Target size in pixels.
    fn size(&self) -> (u32, u32);

    /// Paint the part of `source` that `affine` maps into `dst`, clipped to
    /// `dst`, blended with uniform `alpha`.
    ///
    /// `affine` maps source pixel space to surface space.
    fn fill_triangle_with_affine_sample(
        &mut self,
        dst: &[Vec2; 3],
        source: &RgbaImage,
        affine: Affine2,
        alpha: f32,
    );

    fn stroke_segment(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba<u8>);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba<u8>);

    /// Circle outline. `dash` is `(on, off)` arc lengths in pixels.
    fn stroke_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        width: f32,
        color: Rgba<u8>,
        dash: Option<(f32, f32)>,
    );

    fn size_vec(&self) -> Vec2 {
        let (w, h) = self.size();
        Vec2::new(w as f32, h as f32)
    }
}

/// Software surface backed by an RGBA8 image.
#[derive(Clone, Debug)]
pub struct Canvas {
    pixels: RgbaImage,
}

impl Canvas {
    /// Fully transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width, height),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    pub fn clear(&mut self) {
        self.pixels.pixels_mut().for_each(|p| *p = Rgba([0, 0, 0, 0]));
    }

    /// `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.pixels.get_pixel_checked(x, y).copied()
    }

    /// Clamped pixel rect `[x0, x1) x [y0, y1)` covering `min..max`.
    fn pixel_bounds(&self, min: Vec2, max: Vec2) -> Option<(u32, u32, u32, u32)> {
        let (w, h) = self.pixels.dimensions();
        if w == 0 || h == 0 || !min.is_finite() || !max.is_finite() {
            return None;
        }
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.ceil().max(0.0) as u32).min(w);
        let y1 = (max.y.ceil().max(0.0) as u32).min(h);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0, y0, x1, y1))
    }

    /// Source-over blend of a premultiplied color scaled by `alpha`.
    fn blend(&mut self, x: u32, y: u32, src: [f32; 4], alpha: f32) {
        let sa = src[3] * alpha;
        if sa <= 0.0 {
            return;
        }
        let px = self.pixels.get_pixel_mut(x, y);
        let da = px[3] as f32 / 255.0;
        let inv = 1.0 - sa;
        let out_a = sa + da * inv;

        for c in 0..3 {
            let dc = px[c] as f32 / 255.0 * da;
            let oc = src[c] * alpha + dc * inv;
            px[c] = if out_a > 0.0 { to_u8(oc / out_a) } else { 0 };
        }
        px[3] = to_u8(out_a);
    }

    /// Blend `color` with per-pixel coverage from `coverage(pixel_center)`.
    fn paint_coverage(
        &mut self,
        min: Vec2,
        max: Vec2,
        color: Rgba<u8>,
        coverage: impl Fn(Vec2) -> f32,
    ) {
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(min, max) else {
            return;
        };
        let src = premultiply(color);
        for y in y0..y1 {
            for x in x0..x1 {
                let cov = coverage(Vec2::new(x as f32 + 0.5, y as f32 + 0.5)).clamp(0.0, 1.0);
                if cov > 0.0 {
                    self.blend(x, y, src, cov);
                }
            }
        }
    }
}

impl Surface for Canvas {
    fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn fill_triangle_with_affine_sample(
        &mut self,
        dst: &[Vec2; 3],
        source: &RgbaImage,
        affine: Affine2,
        alpha: f32,
    ) {
        if alpha <= 0.0 || source.width() == 0 || source.height() == 0 {
            return;
        }
        let inverse = affine.inverse();
        if !inverse.is_finite() {
            return;
        }

        let [v0, mut v1, mut v2] = *dst;
        let area = edge_value(v0, v1, v2);
        if area == 0.0 || !area.is_finite() {
            return;
        }
        if area < 0.0 {
            std::mem::swap(&mut v1, &mut v2);
        }

        let min = v0.min(v1).min(v2);
        let max = v0.max(v1).max(v2);
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(min, max) else {
            return;
        };

        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if !(covers(v1, v2, p) && covers(v2, v0, p) && covers(v0, v1, p)) {
                    continue;
                }
                let s = inverse.transform_point2(p);
                if let Some(color) = sample_bilinear(source, s) {
                    self.blend(x, y, color, alpha);
                }
            }
        }
    }

    fn stroke_segment(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba<u8>) {
        let pad = Vec2::splat(width * 0.5 + 1.0);
        let half = width * 0.5;
        self.paint_coverage(from.min(to) - pad, from.max(to) + pad, color, |p| {
            half + 0.5 - distance_to_segment(p, from, to)
        });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgba<u8>) {
        let pad = Vec2::splat(radius + 1.0);
        self.paint_coverage(center - pad, center + pad, color, |p| {
            radius + 0.5 - p.distance(center)
        });
    }

    fn stroke_circle(
        &mut self,
        center: Vec2,
        radius: f32,
        width: f32,
        color: Rgba<u8>,
        dash: Option<(f32, f32)>,
    ) {
        let half = width * 0.5;
        let pad = Vec2::splat(radius + half + 1.0);
        self.paint_coverage(center - pad, center + pad, color, |p| {
            let d = p - center;
            if let Some((on, off)) = dash {
                let period = on + off;
                if period > 0.0 {
                    let angle = d.y.atan2(d.x).rem_euclid(std::f32::consts::TAU);
                    if (angle * radius).rem_euclid(period) >= on {
                        return 0.0;
                    }
                }
            }
            half + 0.5 - (d.length() - radius).abs()
        });
    }
}

/// Signed doubled area of `(a, b, p)`, exactly antisymmetric in `a` and `b`.
///
/// Both triangles sharing an edge evaluate it with the same operand order,
/// so a pixel center can never land inside both or neither.
#[inline]
fn edge_value(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    if (a.x, a.y) <= (b.x, b.y) {
        (b - a).perp_dot(p - a)
    } else {
        -(a - b).perp_dot(p - b)
    }
}

/// Inside test for one edge of a positively oriented triangle.
///
/// Points exactly on the edge go to the triangle that walks the edge
/// downwards (or leftwards when horizontal); its neighbour walks it the
/// other way.
#[inline]
fn covers(a: Vec2, b: Vec2, p: Vec2) -> bool {
    let w = edge_value(a, b, p);
    if w != 0.0 {
        return w > 0.0;
    }
    let d = b - a;
    d.y > 0.0 || (d.y == 0.0 && d.x < 0.0)
}

fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

#[inline]
fn premultiply(c: Rgba<u8>) -> [f32; 4] {
    let a = c[3] as f32 / 255.0;
    [
        c[0] as f32 / 255.0 * a,
        c[1] as f32 / 255.0 * a,
        c[2] as f32 / 255.0 * a,
        a,
    ]
}

/// Bilinear sample at continuous source position `s` (pixel centers at +0.5).
///
/// Returns premultiplied RGBA in 0-1, or `None` outside the image.
fn sample_bilinear(img: &RgbaImage, s: Vec2) -> Option<[f32; 4]> {
    let (w, h) = img.dimensions();
    if !(s.x >= 0.0 && s.y >= 0.0 && s.x < w as f32 && s.y < h as f32) {
        return None;
    }

    let fx = s.x - 0.5;
    let fy = s.y - 0.5;
    let x0f = fx.floor();
    let y0f = fy.floor();
    let tx = fx - x0f;
    let ty = fy - y0f;

    let max_x = w as i64 - 1;
    let max_y = h as i64 - 1;
    let x0 = (x0f as i64).clamp(0, max_x) as u32;
    let y0 = (y0f as i64).clamp(0, max_y) as u32;
    let x1 = (x0f as i64 + 1).clamp(0, max_x) as u32;
    let y1 = (y0f as i64 + 1).clamp(0, max_y) as u32;

    let c00 = premultiply(*img.get_pixel(x0, y0));
    let c10 = premultiply(*img.get_pixel(x1, y0));
    let c01 = premultiply(*img.get_pixel(x0, y1));
    let c11 = premultiply(*img.get_pixel(x1, y1));

    let mut result = [0.0f32; 4];
    for c in 0..4 {
        let top = c00[c] * (1.0 - tx) + c10[c] * tx;
        let bottom = c01[c] * (1.0 - tx) + c11[c] * tx;
        result[c] = top * (1.0 - ty) + bottom * ty;
    }
    Some(result)
}
