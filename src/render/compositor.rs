//! Scene compositor: draws every layer of a [`Scene`] bottom to top.
//!
//! Preview and export share one pass ([`Compositor::composite`]); the mode
//! only decides whether the active layer gets its overlay.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use super::layer::render_layer;
use super::surface::{Canvas, Surface};
use crate::entities::{Scene, WarpSettings};
use crate::io::{EXPORT_FILE_NAME, save_png};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// Interactive view: overlay on the active layer.
    Preview,
    /// Final output: pixels only.
    Export,
}

/// Counters from one composite pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    pub layers_drawn: usize,
    pub layers_skipped: usize,
    pub triangles_drawn: usize,
    pub triangles_degenerate: usize,
}

#[derive(Clone, Debug, Default)]
pub struct Compositor {
    settings: WarpSettings,
}

impl Compositor {
    pub fn new(settings: &WarpSettings) -> Self {
        Self {
            settings: settings.sanitized(),
        }
    }

    pub fn settings(&self) -> &WarpSettings {
        &self.settings
    }

    /// Draw `scene` into `surface` in stacking order.
    pub fn composite<S: Surface + ?Sized>(
        &self,
        scene: &Scene,
        surface: &mut S,
        mode: RenderMode,
    ) -> PassStats {
        let mut stats = PassStats::default();
        for layer in &scene.layers {
            let overlay = mode == RenderMode::Preview && scene.active_layer == Some(layer.id);
            match render_layer(layer, &self.settings, surface, overlay) {
                Some(s) => {
                    stats.layers_drawn += 1;
                    stats.triangles_drawn += s.drawn;
                    stats.triangles_degenerate += s.degenerate;
                }
                None => stats.layers_skipped += 1,
            }
        }
        log::debug!(
            "{:?} pass: {} layers ({} skipped), {} triangles, {} degenerate",
            mode,
            stats.layers_drawn,
            stats.layers_skipped,
            stats.triangles_drawn,
            stats.triangles_degenerate
        );
        stats
    }

    /// Fresh transparent canvas of `size` with the preview pass drawn into it.
    pub fn render_preview(&self, scene: &Scene, size: (u32, u32)) -> Canvas {
        self.render(scene, size, RenderMode::Preview)
    }

    /// Same pass as [`Self::render_preview`] without overlays.
    pub fn render_export(&self, scene: &Scene, size: (u32, u32)) -> Canvas {
        self.render(scene, size, RenderMode::Export)
    }

    fn render(&self, scene: &Scene, (w, h): (u32, u32), mode: RenderMode) -> Canvas {
        let mut canvas = Canvas::new(w, h);
        self.composite(scene, &mut canvas, mode);
        canvas
    }

    /// Render the export pass and write it as PNG into `dir`.
    ///
    /// Returns the written file path.
    pub fn export_png(&self, scene: &Scene, size: (u32, u32), dir: &Path) -> Result<PathBuf> {
        if scene.layers.is_empty() {
            bail!("Nothing to export: scene has no layers");
        }
        let canvas = self.render_export(scene, size);
        let path = dir.join(EXPORT_FILE_NAME);
        save_png(canvas.image(), &path)?;
        log::info!("Exported {}x{} to {}", size.0, size.1, path.display());
        Ok(path)
    }
}
