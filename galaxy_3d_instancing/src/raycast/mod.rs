//! Raycasting module: rays, hit records and the single-object hit test.
//!
//! Pointer picking builds a `Raycaster` (optionally from a `Camera`), then
//! asks the scene to test it against collections or individual proxies.

mod intersection;
mod mesh_intersect;
mod ray;
mod raycaster;

pub use intersection::{Face, Intersection, sort_by_distance};
pub use mesh_intersect::intersect_mesh;
pub use ray::Ray;
pub use raycaster::Raycaster;
