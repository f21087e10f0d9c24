//! Camera module: low-level camera used for pointer picking.
//!
//! The engine does NOT store or manage cameras. They are owned and driven
//! by the host framework.

mod camera;

pub use camera::Camera;
