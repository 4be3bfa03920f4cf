//! Texture resource management for wgpu
//!
//! Creates GPU textures, views and samplers for the depth buffer and for
//! material maps decoded with the `image` crate.

use std::path::Path;

use crate::error::SceneError;

/// GPU texture resource containing texture, view, and sampler
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl TextureResource {
    /// Depth buffer format shared by every pipeline
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Color format for material maps. Texels are passed to the shader as
    /// stored, without sRGB decoding.
    pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Creates a depth texture matching the surface configuration
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        let texture = allocate(
            device,
            label,
            extent(config.width.max(1), config.height.max(1)),
            Self::DEPTH_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT,
        );
        Self::with_sampler(device, texture, label, wgpu::AddressMode::ClampToEdge)
    }

    /// Decodes an image file into a repeating, linearly filtered texture
    ///
    /// # Errors
    /// [`SceneError::Texture`] if the file cannot be read or decoded
    pub fn from_path(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
    ) -> Result<Self, SceneError> {
        let rgba = image::open(path)
            .map_err(|source| SceneError::Texture {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(Self::create_from_rgba_data(
            device,
            queue,
            &rgba,
            width,
            height,
            &path.display().to_string(),
        ))
    }

    /// 1x1 texture of a single color, used when a material has no map
    pub fn solid_color(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: [u8; 4],
        label: &str,
    ) -> Self {
        Self::create_from_rgba_data(device, queue, &rgba, 1, 1, label)
    }

    /// Uploads tightly packed RGBA8 pixels into a new 2D texture
    pub fn create_from_rgba_data(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        data: &[u8],
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let size = extent(width, height);
        let texture = allocate(
            device,
            label,
            size,
            Self::COLOR_FORMAT,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        );

        queue.write_texture(
            texture.as_image_copy(),
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        Self::with_sampler(device, texture, label, wgpu::AddressMode::Repeat)
    }

    fn with_sampler(
        device: &wgpu::Device,
        texture: wgpu::Texture,
        label: &str,
        address_mode: wgpu::AddressMode,
    ) -> Self {
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

fn allocate(
    device: &wgpu::Device,
    label: &str,
    size: wgpu::Extent3d,
    format: wgpu::TextureFormat,
    usage: wgpu::TextureUsages,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    })
}
