// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Handles model loading, textures, materials and uniform bind groups.

pub mod global_bindings;
pub mod gpu_model;
pub mod material;
pub mod model_loader;
pub mod texture_resource;

// Re-export main types
pub use global_bindings::GlobalBindings;
pub use gpu_model::{GpuMesh, GpuModel};
pub use material::{GpuMaterial, MaterialBindings};
pub use model_loader::{MeshData, ModelData};
pub use texture_resource::TextureResource;
