//! Document: the editable layer set.
//!
//! Owns the layers (stacking order = insertion order), the active layer, the
//! snapshot history and the in-flight pin drag. Every committed edit pushes a
//! snapshot of the layer set; pointer moves during a drag only touch the
//! transient [`PinDrag`] and are merged into the layers on pointer up.
//!
//! Rendering never reads the document directly: [`Document::snapshot`]
//! produces an immutable [`Scene`] with any drag already applied.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, anyhow, bail};
use glam::Vec2;
use image::RgbaImage;

use super::layer::{Layer, LayerId, MIN_SCALE};
use super::pin::{Pin, PinId, PinUpdate};
use super::settings::WarpSettings;
use crate::core::{History, PinDrag};
use crate::io;
use crate::render::Placement;

/// Pin pick radius in surface pixels.
pub const HIT_RADIUS: f32 = 20.0;
/// Margin kept around a freshly fitted layer, in surface pixels.
pub const FIT_MARGIN: f32 = 80.0;

/// Immutable render input: layers bottom to top plus the active layer.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub layers: Vec<Layer>,
    pub active_layer: Option<LayerId>,
}

impl Scene {
    pub fn active(&self) -> Option<&Layer> {
        let id = self.active_layer?;
        self.layers.iter().find(|l| l.id == id)
    }
}

/// What a pointer press did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerHit {
    /// Missed every pin; a new pin was placed.
    Created(PinId),
    /// Grabbed an existing pin; a drag is in progress.
    Dragging(PinId),
    /// Hit a pin while pins are locked; nothing changed.
    Locked(PinId),
}

/// Scale that fits an image into `viewport` with [`FIT_MARGIN`], never
/// enlarging and never below [`MIN_SCALE`].
pub fn fit_scale(image_size: Vec2, viewport: Vec2) -> f32 {
    let target = viewport - Vec2::splat(FIT_MARGIN);
    (target.x / image_size.x)
        .min(target.y / image_size.y)
        .min(1.0)
        .max(MIN_SCALE)
}

#[derive(Clone, Debug, Default)]
pub struct Document {
    layers: Vec<Layer>,
    active_layer: Option<LayerId>,
    history: History<Vec<Layer>>,
    drag: Option<PinDrag>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn active_layer_id(&self) -> Option<LayerId> {
        self.active_layer
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.layer(self.active_layer?)
    }

    pub fn drag(&self) -> Option<&PinDrag> {
        self.drag.as_ref()
    }

    pub fn history(&self) -> &History<Vec<Layer>> {
        &self.history
    }

    fn layer_mut(&mut self, id: LayerId) -> Result<&mut Layer> {
        self.layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| anyhow!("Layer {} not found", id))
    }

    fn active_mut(&mut self) -> Result<&mut Layer> {
        let id = self.active_layer.ok_or_else(|| anyhow!("No active layer"))?;
        self.layer_mut(id)
    }

    /// Push the current layer set as a history snapshot.
    ///
    /// Called by every committed edit; hosts call it directly at the end of a
    /// slider gesture (opacity, scale).
    pub fn commit(&mut self) {
        self.history.push(self.layers.clone());
    }

    // === Layers ===

    /// Append a layer fitted to `viewport` and make it active.
    pub fn add_layer(&mut self, name: impl Into<String>, image: RgbaImage, viewport: Vec2) -> LayerId {
        let size = Vec2::new(image.width() as f32, image.height() as f32);
        let mut layer = Layer::new(name, Some(Arc::new(image)));
        layer.set_scale(fit_scale(size, viewport));
        let id = layer.id;
        log::info!(
            "Added layer '{}' {}x{} at scale {:.3}",
            layer.name,
            size.x,
            size.y,
            layer.scale()
        );
        self.layers.push(layer);
        self.active_layer = Some(id);
        self.commit();
        id
    }

    /// Decode `path` and add it as a layer named after the file stem.
    pub fn import_layer(&mut self, path: &Path, viewport: Vec2) -> Result<LayerId> {
        let image = io::load_image(path)?;
        Ok(self.add_layer(io::layer_name(path), image, viewport))
    }

    /// Reset the active layer's scale to fit `viewport`. No history push.
    pub fn fit_active_layer(&mut self, viewport: Vec2) -> Result<()> {
        let layer = self.active_mut()?;
        let size = layer
            .image_size()
            .ok_or_else(|| anyhow!("Layer '{}' has no image", layer.name))?;
        layer.set_scale(fit_scale(size, viewport));
        Ok(())
    }

    /// Remove a layer. If it was active, the first remaining layer becomes active.
    pub fn delete_layer(&mut self, id: LayerId) -> Result<Layer> {
        let idx = self
            .layers
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| anyhow!("Layer {} not found", id))?;
        let removed = self.layers.remove(idx);
        if self.active_layer == Some(id) {
            self.active_layer = self.layers.first().map(|l| l.id);
        }
        if self.drag.is_some_and(|d| d.layer == id) {
            self.drag = None;
        }
        self.commit();
        Ok(removed)
    }

    pub fn set_active_layer(&mut self, id: LayerId) -> Result<()> {
        if self.layer(id).is_none() {
            bail!("Layer {} not found", id);
        }
        self.active_layer = Some(id);
        Ok(())
    }

    /// Flip visibility; returns the new state.
    pub fn toggle_visibility(&mut self, id: LayerId) -> Result<bool> {
        let layer = self.layer_mut(id)?;
        layer.visible = !layer.visible;
        let visible = layer.visible;
        self.commit();
        Ok(visible)
    }

    /// Continuous edit, no history push.
    pub fn set_opacity(&mut self, id: LayerId, opacity: f32) -> Result<()> {
        self.layer_mut(id)?.set_opacity(opacity);
        Ok(())
    }

    /// Continuous edit, no history push.
    pub fn set_scale(&mut self, id: LayerId, scale: f32) -> Result<()> {
        self.layer_mut(id)?.set_scale(scale);
        Ok(())
    }

    // === Pointer ===

    fn placement_of(layer: &Layer, surface_size: Vec2) -> Result<Placement> {
        let size = layer
            .image_size()
            .ok_or_else(|| anyhow!("Layer '{}' has no image", layer.name))?;
        Ok(Placement::centered(size, layer.scale(), surface_size))
    }

    /// Press at `pos` (surface space) on the active layer.
    ///
    /// Grabs the deepest pin within [`HIT_RADIUS`] surface pixels, or places
    /// a new pin when nothing is hit. `settings.lock_pins` blocks grabbing only.
    pub fn pointer_down(&mut self, pos: Vec2, surface_size: Vec2, settings: &WarpSettings) -> Result<PointerHit> {
        let layer = self.active_mut()?;
        let placement = Self::placement_of(layer, surface_size)?;
        let local = placement.to_layer(pos);

        match layer.hit_test(local, HIT_RADIUS / layer.scale()) {
            Some(pin) if settings.lock_pins => Ok(PointerHit::Locked(pin)),
            Some(pin) => {
                layer.select_pin(Some(pin));
                let start = layer.pin(pin).map_or(local, |p| p.position);
                let drag = PinDrag::new(layer.id, pin, start);
                self.drag = Some(drag);
                log::trace!("drag start {}", pin);
                Ok(PointerHit::Dragging(pin))
            }
            None => {
                let pin = layer.add_pin(local);
                log::debug!("Pin {} placed at ({:.1}, {:.1})", pin, local.x, local.y);
                self.commit();
                Ok(PointerHit::Created(pin))
            }
        }
    }

    /// Update the in-flight drag. Committed layers are untouched.
    ///
    /// Returns false when no drag is active.
    pub fn pointer_move(&mut self, pos: Vec2, surface_size: Vec2) -> Result<bool> {
        let Some(drag) = self.drag else {
            return Ok(false);
        };
        let layer = self
            .layer(drag.layer)
            .ok_or_else(|| anyhow!("Layer {} not found", drag.layer))?;
        let local = Self::placement_of(layer, surface_size)?.to_layer(pos);
        self.drag = Some(PinDrag { position: local, ..drag });
        Ok(true)
    }

    /// End the drag: merge it into the pin and push history.
    ///
    /// Returns false when no drag was active.
    pub fn pointer_up(&mut self) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        if let Some(layer) = self.layers.iter_mut().find(|l| l.id == drag.layer) {
            drag.apply_to(layer);
        }
        self.commit();
        true
    }

    /// Drop the in-flight drag without committing it.
    pub fn cancel_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }

    // === Pin editing (active layer) ===

    /// Select a pin of the active layer, or clear with `None`. No history push.
    pub fn select_pin(&mut self, id: Option<PinId>) -> Result<()> {
        let layer = self.active_mut()?;
        if let Some(id) = id
            && layer.pin(id).is_none()
        {
            bail!("Pin {} not found on layer '{}'", id, layer.name);
        }
        layer.select_pin(id);
        Ok(())
    }

    fn selected_pin_id(&mut self) -> Result<PinId> {
        let layer = self.active_mut()?;
        layer
            .selected_pin_id()
            .ok_or_else(|| anyhow!("No pin selected on layer '{}'", layer.name))
    }

    pub fn update_selected_pin(&mut self, update: PinUpdate) -> Result<()> {
        let pin = self.selected_pin_id()?;
        self.active_mut()?.update_pin(pin, &update);
        self.commit();
        Ok(())
    }

    pub fn raise_selected_pin(&mut self) -> Result<()> {
        self.shift_selected_depth(|d| d.saturating_add(1))
    }

    /// Depth never goes below 0.
    pub fn lower_selected_pin(&mut self) -> Result<()> {
        self.shift_selected_depth(|d| d.saturating_sub(1))
    }

    fn shift_selected_depth(&mut self, shift: impl FnOnce(u32) -> u32) -> Result<()> {
        let id = self.selected_pin_id()?;
        let pin = self
            .active_mut()?
            .pin_mut(id)
            .ok_or_else(|| anyhow!("Pin {} not found", id))?;
        pin.depth = shift(pin.depth);
        self.commit();
        Ok(())
    }

    pub fn delete_selected_pin(&mut self) -> Result<Pin> {
        let id = self.selected_pin_id()?;
        let pin = self
            .active_mut()?
            .remove_pin(id)
            .ok_or_else(|| anyhow!("Pin {} not found", id))?;
        if self.drag.is_some_and(|d| d.pin == id) {
            self.drag = None;
        }
        self.commit();
        Ok(pin)
    }

    /// Every pin of the active layer back to its rest position.
    pub fn reset_pose(&mut self) -> Result<()> {
        self.active_mut()?.reset_pose();
        self.commit();
        Ok(())
    }

    /// Programmatic pin move (layer space), committed immediately.
    pub fn move_pin(&mut self, layer: LayerId, pin: PinId, to: Vec2) -> Result<()> {
        if !self.layer_mut(layer)?.move_pin(pin, to) {
            bail!("Pin {} not found", pin);
        }
        self.commit();
        Ok(())
    }

    // === History ===

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(layers) => {
                self.restore(layers);
                log::debug!("undo -> {:?}", self.history.cursor());
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(layers) => {
                self.restore(layers);
                log::debug!("redo -> {:?}", self.history.cursor());
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, layers: Vec<Layer>) {
        self.layers = layers;
        self.drag = None;
        // Active layer may not exist in the restored set
        if self.active_layer.is_some_and(|id| self.layer(id).is_none()) {
            self.active_layer = self.layers.first().map(|l| l.id);
        }
    }

    // === Rendering ===

    /// Immutable copy for rendering with the in-flight drag applied.
    pub fn snapshot(&self) -> Scene {
        let mut layers = self.layers.clone();
        if let Some(drag) = &self.drag {
            for layer in &mut layers {
                drag.apply_to(layer);
            }
        }
        Scene {
            layers,
            active_layer: self.active_layer,
        }
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;
    use crate::entities::RotationMode;

    const VIEW: Vec2 = Vec2::new(400.0, 300.0);

    fn image(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([200, 100, 50, 255]))
    }

    /// Document with one 100x100 layer at scale 1 centred in VIEW (offset 150, 100).
    fn doc() -> (Document, LayerId) {
        let mut doc = Document::new();
        let id = doc.add_layer("body", image(100, 100), VIEW);
        (doc, id)
    }

    fn surface(local: Vec2) -> Vec2 {
        local + Vec2::new(150.0, 100.0)
    }

    #[test]
    fn test_fit_scale() {
        assert_eq!(fit_scale(Vec2::new(100.0, 100.0), VIEW), 1.0);
        assert_eq!(fit_scale(Vec2::new(640.0, 110.0), Vec2::new(400.0, 300.0)), 0.5);
        assert_eq!(fit_scale(Vec2::new(100_000.0, 10.0), VIEW), MIN_SCALE);
        // viewport smaller than the margin
        assert_eq!(fit_scale(Vec2::new(100.0, 100.0), Vec2::new(50.0, 50.0)), MIN_SCALE);
    }

    #[test]
    fn test_add_layer_activates_and_pushes() {
        let (mut doc, first) = doc();
        assert_eq!(doc.active_layer_id(), Some(first));
        assert_eq!(doc.history().len(), 1);
        assert!(!doc.can_undo());

        let second = doc.add_layer("arm", image(1000, 100), VIEW);
        assert_eq!(doc.active_layer_id(), Some(second));
        assert!((doc.layer(second).unwrap().scale() - 0.32).abs() < 1e-6);
        assert!(doc.can_undo());
    }

    #[test]
    fn test_import_layer_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("left_leg.png");
        io::save_png(&image(12, 8), &path).unwrap();

        let mut doc = Document::new();
        let id = doc.import_layer(&path, VIEW).unwrap();
        let layer = doc.layer(id).unwrap();
        assert_eq!(layer.name, "left_leg");
        assert_eq!(layer.image_size(), Some(Vec2::new(12.0, 8.0)));

        assert!(doc.import_layer(&dir.path().join("nope.png"), VIEW).is_err());
        assert_eq!(doc.layers().len(), 1);
    }

    #[test]
    fn test_delete_active_layer_selects_first() {
        let (mut doc, a) = doc();
        let b = doc.add_layer("b", image(10, 10), VIEW);
        let c = doc.add_layer("c", image(10, 10), VIEW);
        doc.delete_layer(c).unwrap();
        assert_eq!(doc.active_layer_id(), Some(a));

        doc.set_active_layer(b).unwrap();
        doc.delete_layer(a).unwrap();
        assert_eq!(doc.active_layer_id(), Some(b));
        doc.delete_layer(b).unwrap();
        assert_eq!(doc.active_layer_id(), None);
        assert!(doc.delete_layer(b).is_err());
    }

    #[test]
    fn test_click_creates_pin() {
        let (mut doc, id) = doc();
        let hit = doc
            .pointer_down(surface(Vec2::new(30.0, 40.0)), VIEW, &WarpSettings::default())
            .unwrap();
        let PointerHit::Created(pin) = hit else {
            panic!("expected a new pin, got {hit:?}");
        };

        let layer = doc.layer(id).unwrap();
        assert_eq!(layer.selected_pin_id(), Some(pin));
        let pin = layer.pin(pin).unwrap();
        assert_eq!(pin.position, Vec2::new(30.0, 40.0));
        assert!(pin.is_at_rest());
        assert_eq!(pin.rotation_mode, RotationMode::Auto);
        assert_eq!(doc.history().len(), 2);
        assert!(doc.drag().is_none());
    }

    #[test]
    fn test_hit_radius_is_in_surface_pixels() {
        let mut doc = Document::new();
        // 4x too big for the view: scale 0.25, hit radius 80 layer px
        let id = doc.add_layer("big", image(1280, 880), VIEW);
        assert_eq!(doc.layer(id).unwrap().scale(), 0.25);
        let settings = WarpSettings::default();

        doc.pointer_down(Vec2::new(200.0, 150.0), VIEW, &settings).unwrap();
        doc.pointer_up();
        // 15 surface px away: same pin
        let hit = doc.pointer_down(Vec2::new(215.0, 150.0), VIEW, &settings).unwrap();
        assert!(matches!(hit, PointerHit::Dragging(_)));
        doc.pointer_up();
        // 25 surface px away: new pin
        let hit = doc.pointer_down(Vec2::new(225.0, 150.0), VIEW, &settings).unwrap();
        assert!(matches!(hit, PointerHit::Created(_)));
    }

    #[test]
    fn test_drag_is_transient_until_pointer_up() {
        let (mut doc, id) = doc();
        let settings = WarpSettings::default();
        let start = surface(Vec2::new(50.0, 50.0));
        doc.pointer_down(start, VIEW, &settings).unwrap();
        let pushes = doc.history().len();

        let hit = doc.pointer_down(start + Vec2::new(3.0, 0.0), VIEW, &settings).unwrap();
        let PointerHit::Dragging(pin) = hit else {
            panic!("expected drag, got {hit:?}");
        };
        assert!(doc.pointer_move(surface(Vec2::new(70.0, 55.0)), VIEW).unwrap());
        assert!(doc.pointer_move(surface(Vec2::new(80.0, 60.0)), VIEW).unwrap());

        // Committed state untouched, scene sees the drag
        assert_eq!(doc.layer(id).unwrap().pin(pin).unwrap().position, Vec2::new(50.0, 50.0));
        assert_eq!(doc.history().len(), pushes);
        let scene = doc.snapshot();
        assert_eq!(scene.active().unwrap().pin(pin).unwrap().position, Vec2::new(80.0, 60.0));

        assert!(doc.pointer_up());
        let pin = doc.layer(id).unwrap().pin(pin).unwrap();
        assert_eq!(pin.position, Vec2::new(80.0, 60.0));
        assert_eq!(pin.original(), Vec2::new(50.0, 50.0));
        assert_eq!(doc.history().len(), pushes + 1);
        assert!(!doc.pointer_up());
    }

    #[test]
    fn test_cancel_drag_discards() {
        let (mut doc, id) = doc();
        let settings = WarpSettings::default();
        doc.pointer_down(surface(Vec2::new(10.0, 10.0)), VIEW, &settings).unwrap();
        doc.pointer_down(surface(Vec2::new(10.0, 10.0)), VIEW, &settings).unwrap();
        doc.pointer_move(surface(Vec2::new(90.0, 90.0)), VIEW).unwrap();
        assert!(doc.cancel_drag());
        assert!(doc.layer(id).unwrap().pins[0].is_at_rest());
        assert!(doc.snapshot().layers[0].pins[0].is_at_rest());
        assert!(!doc.pointer_move(surface(Vec2::ZERO), VIEW).unwrap());
    }

    #[test]
    fn test_locked_pins_block_drag_not_creation() {
        let (mut doc, id) = doc();
        let settings = WarpSettings {
            lock_pins: true,
            ..Default::default()
        };
        let at = surface(Vec2::new(20.0, 20.0));
        assert!(matches!(doc.pointer_down(at, VIEW, &settings).unwrap(), PointerHit::Created(_)));
        assert!(matches!(doc.pointer_down(at, VIEW, &settings).unwrap(), PointerHit::Locked(_)));
        assert!(doc.drag().is_none());
        assert_eq!(doc.layer(id).unwrap().pins.len(), 1);
    }

    #[test]
    fn test_pointer_without_active_layer_fails() {
        let mut doc = Document::new();
        assert!(doc.pointer_down(Vec2::ZERO, VIEW, &WarpSettings::default()).is_err());
    }

    #[test]
    fn test_pin_editing_pushes_history() {
        let (mut doc, id) = doc();
        doc.pointer_down(surface(Vec2::new(50.0, 50.0)), VIEW, &WarpSettings::default()).unwrap();
        let base = doc.history().len();

        doc.raise_selected_pin().unwrap();
        doc.raise_selected_pin().unwrap();
        doc.lower_selected_pin().unwrap();
        assert_eq!(doc.active_layer().unwrap().selected_pin().unwrap().depth, 1);
        doc.lower_selected_pin().unwrap();
        doc.lower_selected_pin().unwrap();
        assert_eq!(doc.active_layer().unwrap().selected_pin().unwrap().depth, 0);

        doc.update_selected_pin(PinUpdate {
            rotation: Some(45.0),
            rotation_mode: Some(RotationMode::Fixed),
            ..Default::default()
        })
        .unwrap();
        let pin = doc.active_layer().unwrap().selected_pin().unwrap();
        assert_eq!(pin.rotation, 45.0);
        assert_eq!(pin.rotation_mode, RotationMode::Fixed);
        assert_eq!(doc.history().len(), base + 6);

        let removed = doc.delete_selected_pin().unwrap();
        assert!(doc.layer(id).unwrap().pin(removed.id).is_none());
        assert!(doc.delete_selected_pin().is_err());
        assert!(doc.raise_selected_pin().is_err());
    }

    #[test]
    fn test_depth_steps_saturate() {
        let (mut doc, _) = doc();
        doc.pointer_down(surface(Vec2::new(50.0, 50.0)), VIEW, &WarpSettings::default()).unwrap();
        let depth = |doc: &Document| doc.active_layer().unwrap().selected_pin().unwrap().depth;

        doc.layers[0].pins[0].depth = i32::MAX as u32;
        doc.raise_selected_pin().unwrap();
        assert_eq!(depth(&doc), i32::MAX as u32 + 1);

        doc.layers[0].pins[0].depth = u32::MAX;
        doc.raise_selected_pin().unwrap();
        assert_eq!(depth(&doc), u32::MAX);
        doc.lower_selected_pin().unwrap();
        assert_eq!(depth(&doc), u32::MAX - 1);
    }

    #[test]
    fn test_select_pin() {
        let (mut doc, _) = doc();
        let settings = WarpSettings::default();
        let PointerHit::Created(a) = doc.pointer_down(surface(Vec2::new(10.0, 10.0)), VIEW, &settings).unwrap() else {
            panic!("expected pin");
        };
        doc.pointer_down(surface(Vec2::new(90.0, 90.0)), VIEW, &settings).unwrap();
        let pushes = doc.history().len();

        doc.select_pin(Some(a)).unwrap();
        assert_eq!(doc.active_layer().unwrap().selected_pin_id(), Some(a));
        doc.select_pin(None).unwrap();
        assert_eq!(doc.active_layer().unwrap().selected_pin_id(), None);
        assert!(doc.select_pin(Some(PinId::new_v4())).is_err());
        assert_eq!(doc.history().len(), pushes);
    }

    #[test]
    fn test_reset_pose_and_move_pin() {
        let (mut doc, id) = doc();
        doc.pointer_down(surface(Vec2::new(50.0, 50.0)), VIEW, &WarpSettings::default()).unwrap();
        let pin = doc.layer(id).unwrap().pins[0].id;
        doc.move_pin(id, pin, Vec2::new(70.0, 20.0)).unwrap();
        assert_eq!(doc.layer(id).unwrap().pins[0].position, Vec2::new(70.0, 20.0));
        assert!(doc.move_pin(id, PinId::new_v4(), Vec2::ZERO).is_err());

        doc.reset_pose().unwrap();
        assert!(doc.layer(id).unwrap().pins[0].is_at_rest());
    }

    #[test]
    fn test_undo_redo() {
        let (mut doc, id) = doc();
        doc.pointer_down(surface(Vec2::new(50.0, 50.0)), VIEW, &WarpSettings::default()).unwrap();
        let pin = doc.layer(id).unwrap().pins[0].id;
        doc.move_pin(id, pin, Vec2::new(60.0, 50.0)).unwrap();

        assert!(doc.undo());
        assert_eq!(doc.layer(id).unwrap().pins[0].position, Vec2::new(50.0, 50.0));
        assert!(doc.undo());
        assert!(doc.layer(id).unwrap().pins.is_empty());
        // first snapshot is the floor
        assert!(!doc.can_undo());
        assert!(!doc.undo());

        assert!(doc.redo());
        assert!(doc.redo());
        assert_eq!(doc.layer(id).unwrap().pins[0].position, Vec2::new(60.0, 50.0));
        assert!(!doc.redo());

        // new edit after undo drops the redo tail
        doc.undo();
        doc.reset_pose().unwrap();
        assert!(!doc.can_redo());
    }

    #[test]
    fn test_undo_discards_drag_and_repairs_active() {
        let (mut doc, _) = doc();
        let b = doc.add_layer("b", image(10, 10), VIEW);
        doc.pointer_down(Vec2::new(200.0, 150.0), VIEW, &WarpSettings::default()).unwrap();
        doc.pointer_down(Vec2::new(200.0, 150.0), VIEW, &WarpSettings::default()).unwrap();
        assert!(doc.drag().is_some());

        doc.undo();
        doc.undo();
        assert!(doc.drag().is_none());
        assert!(doc.layer(b).is_none());
        assert_eq!(doc.active_layer_id(), doc.layers().first().map(|l| l.id));
    }

    #[test]
    fn test_slider_edits_need_commit() {
        let (mut doc, id) = doc();
        doc.set_opacity(id, 1.7).unwrap();
        doc.set_scale(id, 0.0).unwrap();
        let layer = doc.layer(id).unwrap();
        assert_eq!(layer.opacity(), 1.0);
        assert_eq!(layer.scale(), MIN_SCALE);
        assert_eq!(doc.history().len(), 1);

        doc.commit();
        assert!(doc.can_undo());
        assert!(doc.set_opacity(LayerId::new_v4(), 0.5).is_err());

        doc.fit_active_layer(VIEW).unwrap();
        assert_eq!(doc.layer(id).unwrap().scale(), 1.0);
    }

    #[test]
    fn test_toggle_visibility() {
        let (mut doc, id) = doc();
        assert!(!doc.toggle_visibility(id).unwrap());
        assert!(!doc.snapshot().layers[0].visible);
        assert!(doc.toggle_visibility(id).unwrap());
        assert_eq!(doc.history().len(), 3);
    }
}
