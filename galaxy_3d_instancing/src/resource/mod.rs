//! CPU-side resources shared by collections
//!
//! Geometry and materials are immutable once built and shared through `Arc`.

mod geometry;
mod material;

pub use geometry::{Geometry, GeometryDesc};
pub use material::{Material, MaterialDesc, Side};
