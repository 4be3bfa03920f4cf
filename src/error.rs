//! Startup and frame errors

use std::path::PathBuf;

use crate::config::ConfigError;

/// Errors that end the application
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("failed to load model {path}: {source}")]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("model {0} contains no meshes")]
    EmptyModel(PathBuf),

    #[error("failed to load texture {path}: {source}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to build render pipelines: {}", .0.join("; "))]
    Pipeline(Vec<String>),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("surface frame failed: {0}")]
    SurfaceFrame(#[from] wgpu::SurfaceError),
}
