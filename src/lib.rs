//! PINWARP - pin-driven 2D image warping library
//!
//! Pins placed on a layer's image drive a smooth displacement field over a
//! triangle mesh; each deformed triangle is drawn with its own affine image
//! mapping. The same render pass serves interactive preview and PNG export.
//!
//! ```text
//! Document --snapshot--> Scene --Compositor--> Surface (Canvas)
//!    |                                  |
//!  History, PinDrag          mesh -> deform -> affine per triangle
//! ```

// Editing state (history, drag)
pub mod core;

// Data model
pub mod entities;

// Numerical core
pub mod warp;

// Rendering and file I/O
pub mod io;
pub mod render;

pub use self::core::{History, PinDrag};
pub use entities::{Document, Layer, LayerId, Pin, PinId, PinUpdate, PointerHit, RotationMode, Scene, WarpSettings};
pub use io::EXPORT_FILE_NAME;
pub use render::{Canvas, Compositor, RenderMode, Surface, render_layer};
pub use warp::{Mesh, affine_for, deform_point, deform_vertices, generate_mesh};

/// Initialize console logging (respects RUST_LOG, default level `info`).
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}
