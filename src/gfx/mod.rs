//! # Graphics Module
//!
//! Everything between the scene and the GPU.
//!
//! - **Camera** ([`camera`]) - fly camera and its keyboard and mouse controls
//! - **Geometry** ([`geometry`]) - vertex and instance formats, the marker cube
//! - **Programs** ([`program`]) - named-uniform shader programs and drawable models
//! - **Rendering** ([`rendering`]) - wgpu device, pipelines and frame submission
//! - **Resources** ([`resources`]) - OBJ loading, textures and GPU buffers
//!
//! Scene code only sees the [`program::ShaderProgram`] and [`program::Model`]
//! traits. The [`RenderEngine`] records what the scene draws through them and
//! encodes it as one instanced render pass per frame.

pub mod camera;
pub mod geometry;
pub mod program;
pub mod rendering;
pub mod resources;

// Re-export commonly used types
pub use camera::FlyCamera;
pub use rendering::render_engine::RenderEngine;
