//! Scene module
//!
//! Host-facing owner of proxies and collections.

mod scene;

pub use scene::Scene;
