//! Pin: user-placed control point driving the warp.
//!
//! A pin has a rest position (`original`) fixed at creation and a current
//! position (`position`) that moves when the user drags it. Deformation is
//! always measured relative to the rest position.

use glam::Vec2;
use uuid::Uuid;

pub type PinId = Uuid;

/// How a pin's rotation contributes to the deformation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RotationMode {
    /// Pure translation, `rotation` is ignored.
    #[default]
    Auto,
    /// Neighborhood is swung by `rotation` degrees around the rest position.
    Fixed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pin {
    pub id: PinId,
    /// Current position in layer-local space.
    pub position: Vec2,
    /// Rest position in layer-local space. Never changes after creation.
    original: Vec2,
    /// Stacking priority and weight boost (+10% per unit). Never negative.
    pub depth: u32,
    /// Degrees, signed.
    pub rotation: f32,
    pub rotation_mode: RotationMode,
}

impl Pin {
    /// New pin resting at `at`.
    pub fn new(at: Vec2) -> Self {
        Self {
            id: Uuid::new_v4(),
            position: at,
            original: at,
            depth: 0,
            rotation: 0.0,
            rotation_mode: RotationMode::Auto,
        }
    }

    pub fn original(&self) -> Vec2 {
        self.original
    }

    /// Displacement from rest to current position.
    pub fn offset(&self) -> Vec2 {
        self.position - self.original
    }

    pub fn is_at_rest(&self) -> bool {
        self.position == self.original
    }

    pub fn reset(&mut self) {
        self.position = self.original;
    }

    /// Rotation in effect for deformation, in radians.
    ///
    /// `None` when the pin only translates.
    pub fn fixed_rotation(&self) -> Option<f32> {
        match self.rotation_mode {
            RotationMode::Fixed if self.rotation != 0.0 => Some(self.rotation.to_radians()),
            _ => None,
        }
    }

    /// Weight multiplier from depth.
    #[inline]
    pub fn depth_boost(&self) -> f32 {
        1.0 + self.depth as f32 * 0.1
    }

    pub fn apply(&mut self, update: &PinUpdate) {
        if let Some(depth) = update.depth {
            self.depth = depth.max(0) as u32;
        }
        if let Some(rotation) = update.rotation {
            self.rotation = rotation;
        }
        if let Some(mode) = update.rotation_mode {
            self.rotation_mode = mode;
        }
    }
}

/// Partial edit of a pin's properties. Unset fields are left alone.
///
/// `depth` is signed so that callers can pass raw input; negative values
/// are floored at 0.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PinUpdate {
    pub depth: Option<i32>,
    pub rotation: Option<f32>,
    pub rotation_mode: Option<RotationMode>,
}
