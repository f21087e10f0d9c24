/// Material state relevant to hit-testing.
///
/// Shader authoring lives with the host renderer. The instancing engine
/// only needs to know which triangle faces are rendered, so a raycast
/// honors the same culling as the draw call.

/// Which triangle faces are rendered (and therefore hittable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    /// Counter-clockwise faces only (back faces culled)
    #[default]
    Front,
    /// Clockwise faces only
    Back,
    /// No culling
    Double,
}

/// Descriptor for creating a Material
#[derive(Debug, Clone)]
pub struct MaterialDesc {
    pub name: String,
    pub side: Side,
}

/// Shared material of a collection
#[derive(Debug, Clone)]
pub struct Material {
    name: String,
    side: Side,
}

impl Material {
    pub fn from_desc(desc: MaterialDesc) -> Self {
        Self {
            name: desc.name,
            side: desc.side,
        }
    }

    /// Front-sided material with the given name
    pub fn named(name: &str) -> Self {
        Self::from_desc(MaterialDesc { name: name.to_string(), side: Side::Front })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn set_side(&mut self, side: Side) {
        self.side = side;
    }
}
