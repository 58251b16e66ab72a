//! Coordinate spaces for layer placement.
//!
//! ## Coordinate Spaces
//!
//! - **Layer space**: origin top-left of the layer's source image, +Y down,
//!   unscaled image pixels. Pins, mesh vertices and the deformation field
//!   all live here.
//!
//! - **Surface space**: origin top-left of the render target, +Y down,
//!   target pixels. Pointer events arrive here.
//!
//! ## Placement
//!
//! ```text
//! surface = layer * scale + offset
//! offset  = (surface_size - image_size * scale) / 2
//! ```
//!
//! i.e. the scaled image is centered in the surface.

use glam::{Affine2, Vec2};

/// Scale and offset of one layer on one surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub scale: f32,
    pub offset: Vec2,
}

impl Placement {
    /// Center an `image_size` image scaled by `scale` on a `surface_size` target.
    pub fn centered(image_size: Vec2, scale: f32, surface_size: Vec2) -> Self {
        let scaled = image_size * scale;
        Self {
            scale,
            offset: (surface_size - scaled) * 0.5,
        }
    }

    /// Layer space -> surface space.
    #[inline]
    pub fn to_surface(&self, p: Vec2) -> Vec2 {
        p * self.scale + self.offset
    }

    /// Surface space -> layer space.
    #[inline]
    pub fn to_layer(&self, p: Vec2) -> Vec2 {
        (p - self.offset) / self.scale
    }

    /// Same mapping as [`Self::to_surface`] as an affine transform.
    pub fn as_affine(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(Vec2::splat(self.scale), 0.0, self.offset)
    }
}
