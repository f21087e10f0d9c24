//! Math helpers shared by the instancing and raycast modules.

mod bounds;
mod color;
mod transform;

pub use bounds::{AABB, Sphere};
pub use color::Color;
pub use transform::{
    Transform,
    relative_trs_matrix, average_matrix_scale, max_matrix_scale,
};
