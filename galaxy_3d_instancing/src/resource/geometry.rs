//! CPU-side geometry shared by every instance of a collection.
//!
//! The GPU copy lives with the host renderer; this side keeps the
//! vertex positions (and optional triangle indices) needed for hit-testing,
//! plus precomputed bounding volumes.
//!
//! # Example
//!
//! ```text
//! Geometry "crate"
//! ├── positions: 8 × Vec3
//! ├── indices:   36 × u32  (12 triangles)
//! ├── bounding_box    (local)
//! └── bounding_sphere (local)
//! ```

use glam::Vec3;
use crate::error::Result;
use crate::engine_bail;
use crate::math::{AABB, Sphere};

// ============================================================================
// GEOMETRY DESC
// ============================================================================

/// Descriptor for creating a Geometry
#[derive(Debug, Clone)]
pub struct GeometryDesc {
    pub name: String,
    /// Vertex positions in local space
    pub positions: Vec<Vec3>,
    /// Triangle list indices. `None` means consecutive position triples.
    pub indices: Option<Vec<u32>>,
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// Triangle-list geometry with bounding volumes.
#[derive(Debug, Clone)]
pub struct Geometry {
    name: String,
    positions: Vec<Vec3>,
    indices: Option<Vec<u32>>,
    bounding_box: AABB,
    bounding_sphere: Sphere,
}

impl Geometry {
    /// Create a geometry from a descriptor.
    ///
    /// # Errors
    ///
    /// - no positions
    /// - index count (or vertex count when non-indexed) not a multiple of 3
    /// - an index pointing past the last position
    pub fn from_desc(desc: GeometryDesc) -> Result<Self> {
        if desc.positions.is_empty() {
            engine_bail!("galaxy3d::Geometry", "Geometry '{}' has no vertices", desc.name);
        }

        match &desc.indices {
            Some(indices) => {
                if indices.len() % 3 != 0 {
                    engine_bail!("galaxy3d::Geometry",
                        "Geometry '{}': index count {} is not a multiple of 3",
                        desc.name, indices.len());
                }
                let vertex_count = desc.positions.len() as u32;
                if let Some(bad) = indices.iter().find(|&&i| i >= vertex_count) {
                    engine_bail!("galaxy3d::Geometry",
                        "Geometry '{}': index {} out of bounds ({} vertices)",
                        desc.name, bad, vertex_count);
                }
            }
            None => {
                if desc.positions.len() % 3 != 0 {
                    engine_bail!("galaxy3d::Geometry",
                        "Geometry '{}': non-indexed vertex count {} is not a multiple of 3",
                        desc.name, desc.positions.len());
                }
            }
        }

        // Both unwraps are guarded by the emptiness check above
        let bounding_box = AABB::from_points(&desc.positions)
            .unwrap_or(AABB { min: Vec3::ZERO, max: Vec3::ZERO });
        let bounding_sphere = Sphere::from_points(&desc.positions)
            .unwrap_or(Sphere::new(Vec3::ZERO, 0.0));

        Ok(Self {
            name: desc.name,
            positions: desc.positions,
            indices: desc.indices,
            bounding_box,
            bounding_sphere,
        })
    }

    /// Axis-aligned box centered on the origin, 12 outward-facing triangles.
    pub fn cuboid(name: &str, width: f32, height: f32, depth: f32) -> Result<Self> {
        let (x, y, z) = (width * 0.5, height * 0.5, depth * 0.5);
        let positions = vec![
            Vec3::new(-x, -y, -z), Vec3::new(x, -y, -z),
            Vec3::new(x, y, -z), Vec3::new(-x, y, -z),
            Vec3::new(-x, -y, z), Vec3::new(x, -y, z),
            Vec3::new(x, y, z), Vec3::new(-x, y, z),
        ];
        // Counter-clockwise when seen from outside
        let indices = vec![
            4, 5, 6, 4, 6, 7, // +Z
            1, 0, 3, 1, 3, 2, // -Z
            5, 1, 2, 5, 2, 6, // +X
            0, 4, 7, 0, 7, 3, // -X
            7, 6, 2, 7, 2, 3, // +Y
            0, 1, 5, 0, 5, 4, // -Y
        ];
        Self::from_desc(GeometryDesc {
            name: name.to_string(),
            positions,
            indices: Some(indices),
        })
    }

    // ===== ACCESSORS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn indices(&self) -> Option<&[u32]> {
        self.indices.as_deref()
    }

    pub fn bounding_box(&self) -> &AABB {
        &self.bounding_box
    }

    pub fn bounding_sphere(&self) -> &Sphere {
        &self.bounding_sphere
    }

    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    /// Vertex indices of triangle `index`.
    pub fn triangle(&self, index: usize) -> Option<[u32; 3]> {
        if index >= self.triangle_count() {
            return None;
        }
        let base = index * 3;
        Some(match &self.indices {
            Some(indices) => [indices[base], indices[base + 1], indices[base + 2]],
            None => [base as u32, base as u32 + 1, base as u32 + 2],
        })
    }

    /// Local-space corners of triangle `index`.
    pub fn triangle_positions(&self, index: usize) -> Option<[Vec3; 3]> {
        let [a, b, c] = self.triangle(index)?;
        Some([
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        ])
    }
}

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;
