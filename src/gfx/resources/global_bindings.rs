//! Per-program uniform bindings
//!
//! Each shader program owns one uniform block at bind group 0. The block is
//! filled by a program recorder during the frame and uploaded once before
//! the render pass.

use crate::{
    gfx::program::UniformBlock,
    wgpu_utils::{binding_types, uniform_buffer::UniformBuffer},
};

/// Uniform buffer, layout and bind group for one program's block
pub struct GlobalBindings<U: UniformBlock> {
    ubo: UniformBuffer<U>,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl<U: UniformBlock> GlobalBindings<U> {
    pub fn new(device: &wgpu::Device, label: &str) -> Self {
        let ubo = UniformBuffer::<U>::new(device);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{} Uniform Layout", label)),
            entries: &[binding_types::entry(
                0,
                wgpu::ShaderStages::VERTEX_FRAGMENT,
                binding_types::uniform(),
            )],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Uniform Bind Group", label)),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.binding_resource(),
            }],
        });

        Self {
            ubo,
            bind_group_layout,
            bind_group,
        }
    }

    /// Uploads `content` if it changed since the last upload
    pub fn update(&mut self, queue: &wgpu::Queue, content: &U) {
        self.ubo.update_content(queue, content);
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
