/*!
# Galaxy 3D Instancing

Instance virtualization for the Galaxy 3D engine.

Many logical objects (proxies) are packed into a few GPU buffers so that
each collection renders in a single draw call, while each proxy can still
be moved, recolored and picked individually.

## Architecture

- **ProxyHandle**: per-instance state (transform, color, size) the host manipulates
- **InstanceCollection**: packs mesh instances (matrix + color per slot)
- **PointCollection**: packs point sprites (position + color + size per slot)
- **InstanceRaycastProxy / PointRaycastProxy**: per-slot hit tests attributed back to a proxy
- **Scene**: owns proxies and collections, drives the per-frame tick and raycasts

Everything is reachable through the [`galaxy3d`] namespace module.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
mod math;
mod camera;
mod resource;
mod raycast;
mod instancing;
mod scene;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton (logger)
    pub use crate::engine::Engine;

    // Host-facing entry point
    pub use crate::scene::Scene;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Math sub-module
    pub mod math {
        pub use crate::math::*;
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Raycast sub-module
    pub mod raycast {
        pub use crate::raycast::*;
    }

    // Instancing sub-module
    pub mod instancing {
        pub use crate::instancing::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
