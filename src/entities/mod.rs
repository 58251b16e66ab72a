//! Entities: the editable data model.
//!
//! Pins belong to layers, layers belong to a [`Document`]. Rendering works on
//! [`Scene`] snapshots taken from the document.

pub mod document;
pub mod layer;
pub mod pin;
pub mod settings;

pub use document::{Document, PointerHit, Scene, fit_scale};
pub use layer::{Layer, LayerId};
pub use pin::{Pin, PinId, PinUpdate, RotationMode};
pub use settings::WarpSettings;
