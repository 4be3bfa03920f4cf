//! WGPU-based rendering engine
//!
//! Owns the surface, device and every GPU resource of the scene. Scene code
//! never touches wgpu directly: it drives the two program recorders through
//! [`FrameBackend`], and [`RenderEngine::present`] turns what they recorded
//! into one render pass.

use std::sync::Arc;

use log::{debug, info, warn};

use super::pipeline_manager::{PipelineConfig, PipelineManager};
use super::render_pass_ext::DrawMeshInstanced;
use crate::{
    error::SceneError,
    gfx::{
        geometry::{generate_cube, GeometryData, InstanceRaw},
        program::{LightingUniforms, MarkerUniforms, MeshId, ProgramRecorder},
        resources::{
            GlobalBindings, GpuMaterial, GpuMesh, GpuModel, MaterialBindings, ModelData,
            TextureResource,
        },
    },
    scene::{DrawTargets, FrameBackend},
    wgpu_utils::ArrayBuffer,
};

const LIGHTING_PIPELINE: &str = "Lighting";
const MARKER_PIPELINE: &str = "Light Cube";

/// Initial room in each instance buffer
const INITIAL_INSTANCES: usize = 256;

/// Picks the present mode for the vsync setting among `supported` modes
///
/// Fifo is always available, so it is the fallback when tearing
/// presentation is not.
pub fn choose_present_mode(vsync: bool, supported: &[wgpu::PresentMode]) -> wgpu::PresentMode {
    if vsync {
        return wgpu::PresentMode::Fifo;
    }
    [wgpu::PresentMode::Immediate, wgpu::PresentMode::Mailbox]
        .into_iter()
        .find(|mode| supported.contains(mode))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
    pipeline_manager: PipelineManager,

    lighting_bindings: GlobalBindings<LightingUniforms>,
    marker_bindings: GlobalBindings<MarkerUniforms>,
    material_bindings: MaterialBindings,
    fallback_material: GpuMaterial,

    lighting: ProgramRecorder<LightingUniforms>,
    markers: ProgramRecorder<MarkerUniforms>,
    lighting_instances: ArrayBuffer<InstanceRaw>,
    marker_instances: ArrayBuffer<InstanceRaw>,

    meshes: Vec<GpuMesh>,
    model: GpuModel,
    marker_model: GpuModel,
    clear_color: wgpu::Color,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// Initializes wgpu, the depth buffer, both shader programs and the
    /// light marker cube. The scene model is uploaded separately with
    /// [`RenderEngine::upload_model`].
    ///
    /// # Errors
    /// Surface, adapter or device creation failures, and pipelines that
    /// could not be built.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<RenderEngine, SceneError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        let adapter_info = adapter.get_info();
        info!("Using adapter {} ({:?})", adapter_info.name, adapter_info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits {
                    max_texture_dimension_2d: adapter.limits().max_texture_dimension_2d,
                    ..wgpu::Limits::downlevel_defaults()
                },
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        // Shaders write final colors, so the surface must not re-encode them
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .unwrap_or(wgpu::TextureFormat::Bgra8Unorm);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: choose_present_mode(vsync, &surface_capabilities.present_modes),
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        debug!("Surface configured: {:?} {:?}", format, config.present_mode);

        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");

        let lighting_bindings = GlobalBindings::<LightingUniforms>::new(&device, "Lighting");
        let marker_bindings = GlobalBindings::<MarkerUniforms>::new(&device, "Light Cube");
        let material_bindings = MaterialBindings::new(&device);
        let fallback_material =
            GpuMaterial::load(&device, &queue, &material_bindings, None, None, "Fallback")?;

        let device_handle = Arc::new(device);
        let queue_handle = Arc::new(queue);

        let mut pipeline_manager = PipelineManager::new(device_handle.clone());
        pipeline_manager.load_shader("lighting", include_str!("shaders/lighting.wgsl"));
        pipeline_manager.load_shader("light_cube", include_str!("shaders/light_cube.wgsl"));

        pipeline_manager.register_pipeline(
            LIGHTING_PIPELINE,
            PipelineConfig::default()
                .with_label(LIGHTING_PIPELINE)
                .with_shader("lighting")
                // Model winding is not guaranteed, draw both faces
                .with_cull_mode(None)
                .with_depth_stencil(TextureResource::DEPTH_FORMAT)
                .with_color_format(format)
                .with_bind_group_layouts(vec![
                    lighting_bindings.bind_group_layout().clone(),
                    material_bindings.bind_group_layout().clone(),
                ]),
        );
        pipeline_manager.register_pipeline(
            MARKER_PIPELINE,
            PipelineConfig::default()
                .with_label(MARKER_PIPELINE)
                .with_shader("light_cube")
                .with_depth_stencil(TextureResource::DEPTH_FORMAT)
                .with_color_format(format)
                .with_bind_group_layouts(vec![marker_bindings.bind_group_layout().clone()]),
        );
        pipeline_manager
            .create_all_pipelines()
            .map_err(SceneError::Pipeline)?;

        let lighting_instances = ArrayBuffer::new(&device_handle, INITIAL_INSTANCES);
        let marker_instances = ArrayBuffer::new(&device_handle, INITIAL_INSTANCES);

        let mut engine = RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            depth_texture,
            pipeline_manager,
            lighting_bindings,
            marker_bindings,
            material_bindings,
            fallback_material,
            lighting: ProgramRecorder::new("lighting"),
            markers: ProgramRecorder::new("light cube"),
            lighting_instances,
            marker_instances,
            meshes: Vec::new(),
            model: GpuModel::default(),
            marker_model: GpuModel::default(),
            clear_color: wgpu::Color::BLACK,
        };

        let cube = engine.upload_geometry("Light Cube", &generate_cube());
        engine.marker_model = GpuModel::new(vec![cube]);

        Ok(engine)
    }

    /// Uploads an untextured mesh and returns its handle
    pub fn upload_geometry(&mut self, name: &str, geometry: &GeometryData) -> MeshId {
        let mesh = GpuMesh::new(&self.device, name, &geometry.vertices, &geometry.indices, None);
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    /// Uploads every mesh of `data` with its material and makes it the
    /// model drawn by the lighting program
    ///
    /// # Errors
    /// [`SceneError::Texture`] if a material map cannot be loaded
    pub fn upload_model(&mut self, data: &ModelData) -> Result<(), SceneError> {
        let mut ids = Vec::with_capacity(data.meshes.len());
        for mesh in &data.meshes {
            let material = GpuMaterial::load(
                &self.device,
                &self.queue,
                &self.material_bindings,
                mesh.diffuse_texture.as_deref(),
                mesh.specular_texture.as_deref(),
                &mesh.name,
            )?;
            self.meshes.push(GpuMesh::new(
                &self.device,
                &mesh.name,
                &mesh.vertices,
                &mesh.indices,
                Some(material),
            ));
            ids.push(MeshId(self.meshes.len() - 1));
        }
        info!("Uploaded {} meshes to the GPU", ids.len());
        self.model = GpuModel::new(ids);
        Ok(())
    }

    /// Resizes the rendering surface and depth buffer
    ///
    /// Zero sizes (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Returns current surface dimensions
    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Acquires the next surface texture
    ///
    /// Returns `Ok(None)` when the frame should be skipped: the surface was
    /// lost or outdated (it is reconfigured here) or acquisition timed out.
    fn acquire(&mut self) -> Result<Option<wgpu::SurfaceTexture>, SceneError> {
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(Some(texture)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Timed out acquiring a surface texture, skipping frame");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl FrameBackend for RenderEngine {
    fn clear(&mut self, color: [f32; 4]) {
        self.clear_color = wgpu::Color {
            r: color[0] as f64,
            g: color[1] as f64,
            b: color[2] as f64,
            a: color[3] as f64,
        };
        self.lighting.begin_frame();
        self.markers.begin_frame();
    }

    fn targets(&mut self) -> DrawTargets<'_> {
        DrawTargets {
            lighting: &mut self.lighting,
            markers: &mut self.markers,
            model: &self.model,
            marker_model: &self.marker_model,
        }
    }

    fn present(&mut self) -> Result<(), SceneError> {
        let Some(surface_texture) = self.acquire()? else {
            return Ok(());
        };
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.lighting_bindings
            .update(&self.queue, self.lighting.uniforms());
        self.marker_bindings.update(&self.queue, self.markers.uniforms());

        let (lit_instances, lit_ranges) = self.lighting.packed();
        let (marker_instances, marker_ranges) = self.markers.packed();
        self.lighting_instances
            .update_data(&self.device, &self.queue, &lit_instances);
        self.marker_instances
            .update_data(&self.device, &self.queue, &marker_instances);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let (false, Some(pipeline)) = (
                self.lighting_instances.is_empty(),
                self.pipeline_manager.get_pipeline(LIGHTING_PIPELINE),
            ) {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, self.lighting_bindings.bind_group(), &[]);
                render_pass.set_vertex_buffer(
                    1,
                    self.lighting_instances
                        .slice(0..self.lighting_instances.len() as u32),
                );

                for (mesh_id, instances) in lit_ranges {
                    let Some(mesh) = self.meshes.get(mesh_id.0) else {
                        continue;
                    };
                    let material = mesh.material.as_ref().unwrap_or(&self.fallback_material);
                    render_pass.set_bind_group(1, &material.bind_group, &[]);
                    render_pass.draw_mesh_instanced(mesh, instances);
                }
            }

            if let (false, Some(pipeline)) = (
                self.marker_instances.is_empty(),
                self.pipeline_manager.get_pipeline(MARKER_PIPELINE),
            ) {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, self.marker_bindings.bind_group(), &[]);
                render_pass.set_vertex_buffer(
                    1,
                    self.marker_instances
                        .slice(0..self.marker_instances.len() as u32),
                );

                for (mesh_id, instances) in marker_ranges {
                    if let Some(mesh) = self.meshes.get(mesh_id.0) {
                        render_pass.draw_mesh_instanced(mesh, instances);
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::PresentMode;

    #[test]
    fn test_vsync_always_uses_fifo() {
        assert_eq!(
            choose_present_mode(true, &[PresentMode::Immediate, PresentMode::Fifo]),
            PresentMode::Fifo
        );
    }

    #[test]
    fn test_no_vsync_prefers_immediate_then_mailbox() {
        let all = [PresentMode::Fifo, PresentMode::Mailbox, PresentMode::Immediate];
        assert_eq!(choose_present_mode(false, &all), PresentMode::Immediate);
        assert_eq!(
            choose_present_mode(false, &[PresentMode::Fifo, PresentMode::Mailbox]),
            PresentMode::Mailbox
        );
        assert_eq!(choose_present_mode(false, &[PresentMode::Fifo]), PresentMode::Fifo);
    }
}
