//! Layer: one source image plus the pins that warp it.
//!
//! The source image is shared (`Arc`) and never modified, so cloning a layer
//! for a history snapshot or a render scene only copies pins and scalars.
//! The warp mesh is not stored; it is regenerated from the image size and
//! the current mesh density on every render pass.

use std::cmp::Reverse;
use std::sync::Arc;

use glam::Vec2;
use image::RgbaImage;
use uuid::Uuid;

use super::pin::{Pin, PinId, PinUpdate};

pub type LayerId = Uuid;

/// Smallest allowed layer scale.
pub const MIN_SCALE: f32 = 0.1;

#[derive(Clone, Debug)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    /// Source pixels. `None` layers are skipped by the renderer.
    pub image: Option<Arc<RgbaImage>>,
    /// Pins in insertion order.
    pub pins: Vec<Pin>,
    selected_pin: Option<PinId>,
    pub visible: bool,
    opacity: f32,
    scale: f32,
}

impl Layer {
    pub fn new(name: impl Into<String>, image: Option<Arc<RgbaImage>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            image,
            pins: Vec::new(),
            selected_pin: None,
            visible: true,
            opacity: 1.0,
            scale: 1.0,
        }
    }

    /// Image size in pixels, if an image is bound.
    pub fn image_size(&self) -> Option<Vec2> {
        self.image
            .as_ref()
            .map(|img| Vec2::new(img.width() as f32, img.height() as f32))
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Clamped to `[0, 1]`.
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_nan() { 1.0 } else { opacity.clamp(0.0, 1.0) };
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Floored at [`MIN_SCALE`].
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = if scale.is_nan() { MIN_SCALE } else { scale.max(MIN_SCALE) };
    }

    pub fn selected_pin_id(&self) -> Option<PinId> {
        self.selected_pin
    }

    pub fn selected_pin(&self) -> Option<&Pin> {
        self.selected_pin.and_then(|id| self.pin(id))
    }

    /// Select `id`, or clear the selection with `None`.
    ///
    /// Unknown ids clear the selection, so it always names an existing pin.
    pub fn select_pin(&mut self, id: Option<PinId>) {
        self.selected_pin = id.filter(|id| self.pin(*id).is_some());
    }

    pub fn pin(&self, id: PinId) -> Option<&Pin> {
        self.pins.iter().find(|p| p.id == id)
    }

    pub fn pin_mut(&mut self, id: PinId) -> Option<&mut Pin> {
        self.pins.iter_mut().find(|p| p.id == id)
    }

    /// Add a resting pin at `at` and select it.
    pub fn add_pin(&mut self, at: Vec2) -> PinId {
        let pin = Pin::new(at);
        let id = pin.id;
        self.pins.push(pin);
        self.selected_pin = Some(id);
        id
    }

    /// Remove a pin. Clears the selection if it pointed at it.
    pub fn remove_pin(&mut self, id: PinId) -> Option<Pin> {
        let idx = self.pins.iter().position(|p| p.id == id)?;
        if self.selected_pin == Some(id) {
            self.selected_pin = None;
        }
        Some(self.pins.remove(idx))
    }

    /// Move a pin's current position. Returns false for unknown ids.
    pub fn move_pin(&mut self, id: PinId, to: Vec2) -> bool {
        match self.pin_mut(id) {
            Some(pin) => {
                pin.position = to;
                true
            }
            None => false,
        }
    }

    pub fn update_pin(&mut self, id: PinId, update: &PinUpdate) -> bool {
        match self.pin_mut(id) {
            Some(pin) => {
                pin.apply(update);
                true
            }
            None => false,
        }
    }

    /// Put every pin back at its rest position.
    pub fn reset_pose(&mut self) {
        self.pins.iter_mut().for_each(Pin::reset);
    }

    /// Pins in paint order: ascending depth, insertion order within a depth.
    pub fn pins_by_depth(&self) -> Vec<&Pin> {
        let mut pins: Vec<&Pin> = self.pins.iter().collect();
        pins.sort_by_key(|p| p.depth);
        pins
    }

    /// Pin whose current position is within `radius` of `at`, both in
    /// layer-local space. The deepest pin wins; equal depths go to the
    /// earliest inserted.
    pub fn hit_test(&self, at: Vec2, radius: f32) -> Option<PinId> {
        self.pins
            .iter()
            .filter(|p| p.position.distance(at) < radius)
            .min_by_key(|p| Reverse(p.depth))
            .map(|p| p.id)
    }
}
