//! Per-layer warp render.
//!
//! One pass for one layer:
//! 1. skip hidden layers and layers without an image
//! 2. generate the mesh from the image size and mesh density
//! 3. deform every vertex with the layer's pins
//! 4. center the scaled image on the surface ([`Placement`])
//! 5. per triangle: solve source -> surface affine, fill the deformed
//!    triangle with the affinely sampled image at layer opacity
//! 6. optionally draw the interactive overlay (mesh, pins)
//!
//! Preview and export both go through [`render_layer`]; only the overlay flag
//! differs, so they always produce the same triangle placements.

use glam::{Affine2, Vec2};
use image::Rgba;

use super::space::Placement;
use super::surface::Surface;
use crate::entities::{Layer, WarpSettings};
use crate::warp::{Mesh, affine_for, deform_vertices, generate_mesh};

pub const MESH_COLOR: Rgba<u8> = Rgba([255, 255, 255, 51]);
pub const MESH_LINE_WIDTH: f32 = 0.5;
pub const PIN_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const SELECTED_PIN_COLOR: Rgba<u8> = Rgba([59, 130, 246, 255]);
pub const PIN_OUTLINE_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const PIN_RADIUS: f32 = 6.0;
pub const SELECTED_PIN_RADIUS: f32 = 8.0;
pub const SELECTION_RING_RADIUS: f32 = 18.0;
pub const PIN_OUTLINE_WIDTH: f32 = 2.0;
pub const SELECTION_RING_DASH: (f32, f32) = (4.0, 4.0);

/// One triangle of a layer mapped onto a surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MappedTriangle {
    /// Triangle index in the mesh.
    pub index: usize,
    /// Deformed corners in surface space.
    pub dst: [Vec2; 3],
    /// Source pixel space -> surface space. `None` for degenerate triangles.
    pub affine: Option<Affine2>,
}

/// Mesh, deformation and placement of one layer on a surface of a given size.
#[derive(Clone, Debug)]
pub struct LayerMapping {
    pub placement: Placement,
    pub mesh: Mesh,
    /// Deformed vertices in layer space, same order as `mesh.vertices`.
    pub deformed: Vec<Vec2>,
    /// Deformed vertices in surface space.
    pub surface_vertices: Vec<Vec2>,
}

impl LayerMapping {
    /// `None` when the layer has no image.
    ///
    /// `settings` must already be sanitized.
    pub fn new(layer: &Layer, settings: &WarpSettings, surface_size: Vec2) -> Option<Self> {
        let image_size = layer.image_size()?;
        let mesh = generate_mesh(image_size.x, image_size.y, settings.mesh_density);
        let deformed = deform_vertices(&mesh.vertices, &layer.pins, settings.pin_influence);

        let placement = Placement::centered(image_size, layer.scale(), surface_size);
        let surface_vertices = deformed.iter().map(|&v| placement.to_surface(v)).collect();

        Some(Self {
            placement,
            mesh,
            deformed,
            surface_vertices,
        })
    }

    pub fn triangle(&self, index: usize) -> MappedTriangle {
        let src = self.mesh.triangle(&self.mesh.vertices, index);
        let dst = self.mesh.triangle(&self.surface_vertices, index);
        MappedTriangle {
            index,
            dst,
            affine: affine_for(&src, &dst),
        }
    }

    pub fn triangles(&self) -> impl Iterator<Item = MappedTriangle> + '_ {
        (0..self.mesh.triangle_count()).map(move |i| self.triangle(i))
    }
}

/// Counters from one layer pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayerStats {
    pub drawn: usize,
    pub degenerate: usize,
}

/// Render `layer` into `surface`.
///
/// `include_overlay` draws the mesh (when `settings.show_mesh`) and the pins
/// on top; pass it only for the active layer in interactive preview.
/// Returns `None` when the layer was skipped.
pub fn render_layer<S: Surface + ?Sized>(
    layer: &Layer,
    settings: &WarpSettings,
    surface: &mut S,
    include_overlay: bool,
) -> Option<LayerStats> {
    if !layer.visible {
        return None;
    }
    let Some(image) = layer.image.as_deref() else {
        log::debug!("layer '{}' has no image, skipped", layer.name);
        return None;
    };
    let mapping = LayerMapping::new(layer, settings, surface.size_vec())?;
    let alpha = layer.opacity();

    let mut stats = LayerStats::default();
    for tri in mapping.triangles() {
        match tri.affine {
            Some(affine) => {
                surface.fill_triangle_with_affine_sample(&tri.dst, image, affine, alpha);
                stats.drawn += 1;
            }
            None => stats.degenerate += 1,
        }
    }

    if include_overlay {
        draw_overlay(layer, &mapping, settings.show_mesh, surface);
    }

    log::trace!(
        "layer '{}': {} triangles, {} degenerate",
        layer.name,
        stats.drawn,
        stats.degenerate
    );
    Some(stats)
}

/// Mesh wireframe and pin handles. Faded with the layer's opacity.
fn draw_overlay<S: Surface + ?Sized>(
    layer: &Layer,
    mapping: &LayerMapping,
    show_mesh: bool,
    surface: &mut S,
) {
    let opacity = layer.opacity();

    if show_mesh {
        let color = fade(MESH_COLOR, opacity);
        for tri in mapping.triangles() {
            let [a, b, c] = tri.dst;
            surface.stroke_segment(a, b, MESH_LINE_WIDTH, color);
            surface.stroke_segment(b, c, MESH_LINE_WIDTH, color);
            surface.stroke_segment(c, a, MESH_LINE_WIDTH, color);
        }
    }

    // deeper pins paint last
    let selected = layer.selected_pin_id();
    for pin in layer.pins_by_depth() {
        let center = mapping.placement.to_surface(pin.position);
        let is_selected = selected == Some(pin.id);
        let (radius, fill) = if is_selected {
            (SELECTED_PIN_RADIUS, SELECTED_PIN_COLOR)
        } else {
            (PIN_RADIUS, PIN_COLOR)
        };

        surface.fill_circle(center, radius, fade(fill, opacity));
        surface.stroke_circle(
            center,
            radius,
            PIN_OUTLINE_WIDTH,
            fade(PIN_OUTLINE_COLOR, opacity),
            None,
        );

        if is_selected {
            surface.stroke_circle(
                center,
                SELECTION_RING_RADIUS,
                PIN_OUTLINE_WIDTH,
                fade(SELECTED_PIN_COLOR, opacity),
                Some(SELECTION_RING_DASH),
            );
        }
    }
}

#[inline]
fn fade(color: Rgba<u8>, opacity: f32) -> Rgba<u8> {
    let a = (color[3] as f32 * opacity).round().clamp(0.0, 255.0) as u8;
    Rgba([color[0], color[1], color[2], a])
}
