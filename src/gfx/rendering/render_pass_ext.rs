//! Render pass extensions for instanced mesh drawing

use std::ops::Range;

use crate::gfx::resources::GpuMesh;

/// Extension trait for RenderPass to draw uploaded meshes
pub trait DrawMeshInstanced {
    /// Binds the mesh's vertex and index buffers and draws `instances`
    ///
    /// The per-instance buffer must already be bound at slot 1.
    fn draw_mesh_instanced(&mut self, mesh: &GpuMesh, instances: Range<u32>);
}

impl DrawMeshInstanced for wgpu::RenderPass<'_> {
    fn draw_mesh_instanced(&mut self, mesh: &GpuMesh, instances: Range<u32>) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, instances);
    }
}
