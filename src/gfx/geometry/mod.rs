//! # Geometry
//!
//! Vertex formats and procedurally generated meshes.
//!
//! - [`Vertex3D`] / [`InstanceRaw`]: GPU vertex and instance records
//! - [`generate_cube`]: unit cube used for the light markers

pub mod primitives;
pub mod vertex;

pub use primitives::generate_cube;
pub use vertex::{normal_matrix, InstanceRaw, Vertex3D};

/// Indexed triangle geometry ready for GPU upload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryData {
    pub vertices: Vec<Vertex3D>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
