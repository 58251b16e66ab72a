//! Process-wide warp settings.
//!
//! Read-only inputs for one render pass. Values coming from the outside
//! (UI sliders, a settings file) go through [`WarpSettings::sanitized`]
//! before they reach the warp core, which does not re-validate.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Lower bound for density and influence.
pub const MIN_POSITIVE: f32 = 0.01;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarpSettings {
    /// Grid granularity. Higher is finer.
    pub mesh_density: f32,
    /// How far a pin's pull reaches. Higher is wider.
    pub pin_influence: f32,
    /// Draw the deformed mesh over the active layer in preview.
    pub show_mesh: bool,
    /// Pins can be created but not dragged.
    pub lock_pins: bool,
}

impl Default for WarpSettings {
    fn default() -> Self {
        Self {
            mesh_density: 1.0,
            pin_influence: 8.0,
            show_mesh: true,
            lock_pins: false,
        }
    }
}

impl WarpSettings {
    /// Copy with density and influence forced positive and finite.
    pub fn sanitized(&self) -> Self {
        Self {
            mesh_density: positive_or(self.mesh_density, Self::default().mesh_density),
            pin_influence: positive_or(self.pin_influence, Self::default().pin_influence),
            ..self.clone()
        }
    }

    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let settings: Self = serde_json::from_str(&text)
            .with_context(|| format!("Invalid settings file: {}", path.display()))?;
        Ok(settings.sanitized())
    }

    /// Load settings, falling back to defaults when the file is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => {
                log::debug!("Loaded warp settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default warp settings: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)
            .with_context(|| format!("Failed to write settings: {}", path.display()))?;
        Ok(())
    }
}

/// NaN and infinities fall back to `default`, everything else is floored.
fn positive_or(value: f32, default: f32) -> f32 {
    if value.is_finite() {
        value.max(MIN_POSITIVE)
    } else {
        default
    }
}
