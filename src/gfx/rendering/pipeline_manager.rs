//! Named render pipelines
//!
//! A [`PipelineConfig`] describes one pipeline with builder calls. The
//! manager compiles shaders by name, queues configs and builds them all in
//! one pass once every shader is loaded.

use std::{collections::HashMap, sync::Arc};
use wgpu::*;

use crate::gfx::geometry::{InstanceRaw, Vertex3D};

/// Everything needed to build one render pipeline
///
/// Defaults to an instanced, unculled triangle list with per-vertex
/// [`Vertex3D`] and per-instance [`InstanceRaw`] buffers and no depth test.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub shader: String,
    pub bind_group_layouts: Vec<BindGroupLayout>,
    pub vertex_layouts: Vec<VertexBufferLayout<'static>>,
    pub cull_mode: Option<Face>,
    pub depth_format: Option<TextureFormat>,
    pub color_format: TextureFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: "Pipeline".to_string(),
            shader: String::new(),
            bind_group_layouts: Vec::new(),
            vertex_layouts: vec![Vertex3D::desc(), InstanceRaw::desc()],
            cull_mode: None,
            depth_format: None,
            color_format: TextureFormat::Bgra8Unorm,
        }
    }
}

impl PipelineConfig {
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    /// Name the shader module was loaded under
    pub fn with_shader(mut self, shader: &str) -> Self {
        self.shader = shader.to_owned();
        self
    }

    /// Bind group layouts in group order
    pub fn with_bind_group_layouts(mut self, layouts: Vec<BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }

    /// Enables depth testing against a depth buffer of `format`
    pub fn with_depth_stencil(mut self, format: TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }

    pub fn with_color_format(mut self, format: TextureFormat) -> Self {
        self.color_format = format;
        self
    }

    /// Depth writes on, nearer fragments win
    pub fn depth_stencil_state(&self) -> Option<DepthStencilState> {
        self.depth_format.map(|format| DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        })
    }

    /// Single opaque color target
    pub fn color_targets(&self) -> [Option<ColorTargetState>; 1] {
        [Some(ColorTargetState {
            format: self.color_format,
            blend: Some(BlendState::REPLACE),
            write_mask: ColorWrites::ALL,
        })]
    }
}

pub struct PipelineManager {
    device: Arc<Device>,
    shaders: HashMap<String, ShaderModule>,
    pending: Vec<(String, PipelineConfig)>,
    pipelines: HashMap<String, RenderPipeline>,
}

impl PipelineManager {
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            shaders: HashMap::new(),
            pending: Vec::new(),
            pipelines: HashMap::new(),
        }
    }

    /// Compiles a WGSL module under `name`
    pub fn load_shader(&mut self, name: &str, source: &str) {
        let module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        });
        self.shaders.insert(name.to_owned(), module);
    }

    /// Queues a pipeline for [`PipelineManager::create_all_pipelines`]
    pub fn register_pipeline(&mut self, name: &str, config: PipelineConfig) {
        self.pending.push((name.to_owned(), config));
    }

    pub fn get_pipeline(&self, name: &str) -> Option<&RenderPipeline> {
        self.pipelines.get(name)
    }

    /// Builds every queued pipeline
    ///
    /// # Returns
    /// One message per pipeline whose shader was never loaded. Those stay
    /// queued.
    pub fn create_all_pipelines(&mut self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for (name, config) in std::mem::take(&mut self.pending) {
            match self.build(&name, &config) {
                Some(pipeline) => {
                    log::debug!("Created pipeline '{}'", name);
                    self.pipelines.insert(name, pipeline);
                }
                None => {
                    errors.push(format!("pipeline '{}': shader '{}' not loaded", name, config.shader));
                    self.pending.push((name, config));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn build(&self, name: &str, config: &PipelineConfig) -> Option<RenderPipeline> {
        let shader = self.shaders.get(&config.shader)?;

        let layouts: Vec<&BindGroupLayout> = config.bind_group_layouts.iter().collect();
        let layout = self.device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: Some(&format!("{} Layout", name)),
            bind_group_layouts: &layouts,
            push_constant_ranges: &[],
        });
        let targets = config.color_targets();

        Some(self.device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(&config.label),
            layout: Some(&layout),
            vertex: VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &config.vertex_layouts,
                compilation_options: PipelineCompilationOptions::default(),
            },
            fragment: Some(FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &targets,
                compilation_options: PipelineCompilationOptions::default(),
            }),
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleList,
                front_face: FrontFace::Ccw,
                cull_mode: config.cull_mode,
                ..Default::default()
            },
            depth_stencil: config.depth_stencil_state(),
            multisample: MultisampleState::default(),
            multiview: None,
            cache: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_draws_instanced_meshes_without_culling() {
        let config = PipelineConfig::default();
        assert_eq!(config.vertex_layouts.len(), 2);
        assert_eq!(config.vertex_layouts[0].step_mode, VertexStepMode::Vertex);
        assert_eq!(config.vertex_layouts[1].step_mode, VertexStepMode::Instance);
        assert_eq!(config.cull_mode, None);
        assert!(config.depth_stencil_state().is_none());
    }

    #[test]
    fn test_depth_stencil_uses_less_with_writes() {
        let config = PipelineConfig::default()
            .with_label("Lit")
            .with_shader("lighting")
            .with_depth_stencil(TextureFormat::Depth32Float)
            .with_color_format(TextureFormat::Rgba8Unorm);

        let depth = config.depth_stencil_state().unwrap();
        assert_eq!(depth.format, TextureFormat::Depth32Float);
        assert_eq!(depth.depth_compare, CompareFunction::Less);
        assert!(depth.depth_write_enabled);
        assert_eq!(config.label, "Lit");
        assert_eq!(config.shader, "lighting");
        assert_eq!(
            config.color_targets()[0].as_ref().map(|target| target.format),
            Some(TextureFormat::Rgba8Unorm)
        );
    }
}
