//! Meshes and models resident on the GPU

use wgpu::util::DeviceExt;

use super::material::GpuMaterial;
use crate::gfx::geometry::Vertex3D;
use crate::gfx::program::{MeshId, Model, ShaderProgram};

/// Vertex and index buffers of one mesh, plus its material if it has one
pub struct GpuMesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    pub material: Option<GpuMaterial>,
}

impl GpuMesh {
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        vertices: &[Vertex3D],
        indices: &[u32],
        material: Option<GpuMaterial>,
    ) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", name)),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            material,
        }
    }
}

/// A model made of uploaded meshes, drawn in mesh order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GpuModel {
    meshes: Vec<MeshId>,
}

impl GpuModel {
    pub fn new(meshes: Vec<MeshId>) -> Self {
        Self { meshes }
    }

    pub fn meshes(&self) -> &[MeshId] {
        &self.meshes
    }
}

impl Model for GpuModel {
    fn draw(&self, program: &mut dyn ShaderProgram) {
        for mesh in &self.meshes {
            program.draw_mesh(*mesh);
        }
    }
}
