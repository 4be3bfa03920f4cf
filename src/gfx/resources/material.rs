//! Material textures for the lit-object program
//!
//! A material is a diffuse map and a specular map sampled by the lighting
//! shader at bind group 1. Meshes without a map fall back to solid textures:
//! white diffuse and black specular.

use std::path::Path;

use log::debug;

use super::texture_resource::TextureResource;
use crate::error::SceneError;
use crate::wgpu_utils::binding_types;

const FALLBACK_DIFFUSE: [u8; 4] = [255, 255, 255, 255];
const FALLBACK_SPECULAR: [u8; 4] = [0, 0, 0, 255];

/// Bind group layout shared by every material
pub struct MaterialBindings {
    bind_group_layout: wgpu::BindGroupLayout,
}

impl MaterialBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let visibility = wgpu::ShaderStages::FRAGMENT;
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Layout"),
            entries: &[
                binding_types::entry(0, visibility, binding_types::texture_2d()),
                binding_types::entry(1, visibility, binding_types::texture_2d()),
                binding_types::entry(
                    2,
                    visibility,
                    binding_types::sampler(wgpu::SamplerBindingType::Filtering),
                ),
            ],
        });
        Self { bind_group_layout }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }
}

/// Textures and bind group of one mesh's material
pub struct GpuMaterial {
    pub diffuse: TextureResource,
    pub specular: TextureResource,
    pub bind_group: wgpu::BindGroup,
}

impl GpuMaterial {
    /// Loads the material maps, substituting solid textures for absent ones
    ///
    /// # Errors
    /// [`SceneError::Texture`] if a referenced map cannot be decoded
    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bindings: &MaterialBindings,
        diffuse: Option<&Path>,
        specular: Option<&Path>,
        label: &str,
    ) -> Result<Self, SceneError> {
        let load = |path: Option<&Path>, fallback: [u8; 4], kind: &str| match path {
            Some(path) => TextureResource::from_path(device, queue, path),
            None => {
                debug!("{}: no {} map, using a solid texture", label, kind);
                Ok(TextureResource::solid_color(
                    device,
                    queue,
                    fallback,
                    &format!("{} {}", label, kind),
                ))
            }
        };

        let diffuse = load(diffuse, FALLBACK_DIFFUSE, "diffuse")?;
        let specular = load(specular, FALLBACK_SPECULAR, "specular")?;

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Material", label)),
            layout: bindings.bind_group_layout(),
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&diffuse.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&specular.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&diffuse.sampler),
                },
            ],
        });

        Ok(Self {
            diffuse,
            specular,
            bind_group,
        })
    }
}
