/// Local TRS transform of a proxy.
///
/// Stored decomposed (position, rotation, scale) and composed into a
/// matrix on demand. Shear is not representable: composing a matrix
/// back from `from_matrix` drops it.

use glam::{Mat4, Quat, Vec3};

/// Translation, rotation and scale, applied in S → R → T order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self { position, ..Self::IDENTITY }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_uniform_scale(self, scale: f32) -> Self {
        self.with_scale(Vec3::splat(scale))
    }

    /// Decompose an affine matrix. Shear and projective terms are lost.
    pub fn from_matrix(matrix: &Mat4) -> Self {
        let (scale, rotation, position) = matrix.to_scale_rotation_translation();
        Self { position, rotation, scale }
    }

    /// Compose into a column-major matrix.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Arithmetic mean of the three scale axes.
    pub fn average_scale(&self) -> f32 {
        (self.scale.x + self.scale.y + self.scale.z) / 3.0
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Express `world` relative to a parent frame and rebuild it from its TRS parts.
///
/// This is the per-slot packing rule: `inverse(parent) * world`, decomposed
/// and recomposed so the slot only ever holds a clean TRS matrix.
pub fn relative_trs_matrix(inverse_parent: &Mat4, world: &Mat4) -> Mat4 {
    Transform::from_matrix(&(*inverse_parent * *world)).to_matrix()
}

/// Mean of the scale axes of a matrix (column lengths).
pub fn average_matrix_scale(matrix: &Mat4) -> f32 {
    let scale = Vec3::new(
        matrix.x_axis.truncate().length(),
        matrix.y_axis.truncate().length(),
        matrix.z_axis.truncate().length(),
    );
    (scale.x + scale.y + scale.z) / 3.0
}

/// Largest scale axis of a matrix (used to grow bounding spheres).
pub fn max_matrix_scale(matrix: &Mat4) -> f32 {
    matrix.x_axis.truncate().length()
        .max(matrix.y_axis.truncate().length())
        .max(matrix.z_axis.truncate().length())
}

#[cfg(test)]
#[path = "transform_tests.rs"]
mod tests;
