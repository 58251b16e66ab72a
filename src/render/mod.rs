//! Rendering: placement, surfaces, per-layer warp and scene compositing.

pub mod compositor;
pub mod layer;
pub mod space;
pub mod surface;

pub use compositor::{Compositor, PassStats, RenderMode};
pub use layer::{LayerMapping, LayerStats, MappedTriangle, render_layer};
pub use space::Placement;
pub use surface::{Canvas, Surface};
