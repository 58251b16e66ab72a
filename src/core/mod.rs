//! Editing state plumbing: snapshot history and transient drag state.

pub mod drag;
pub mod history;

pub use drag::PinDrag;
pub use history::History;
