//! In-flight pin drag.
//!
//! Kept apart from committed layer state: pointer moves only update the
//! drag, and the drag is merged into the layer once the gesture ends.

use glam::Vec2;

use crate::entities::{Layer, LayerId, PinId};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinDrag {
    pub layer: LayerId,
    pub pin: PinId,
    /// Latest pointer position in the layer's local space.
    pub position: Vec2,
}

impl PinDrag {
    pub fn new(layer: LayerId, pin: PinId, position: Vec2) -> Self {
        Self { layer, pin, position }
    }

    /// Write the drag position into `layer` if it is the dragged layer.
    ///
    /// Returns true when a pin was moved.
    pub fn apply_to(&self, layer: &mut Layer) -> bool {
        layer.id == self.layer && layer.move_pin(self.pin, self.position)
    }
}
