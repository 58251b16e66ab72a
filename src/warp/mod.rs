//! Warp core: mesh generation, pin deformation and per-triangle affine solve.
//!
//! All functions here are pure and allocation-light; nothing in this module
//! touches pixels.

pub mod affine;
pub mod deform;
pub mod mesh;

pub use affine::affine_for;
pub use deform::{deform_point, deform_vertices};
pub use mesh::{Mesh, generate_mesh};
