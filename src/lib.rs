//! Spinfield
//!
//! A lit 3D scene built on wgpu and winit. Left clicks spawn copies of a
//! textured mesh that grow in and spin around random axes while a fly camera
//! moves through the scene.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod lighting;
pub mod scene;
pub mod simulation;
pub mod timing;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::SpinfieldApp;
pub use config::SceneConfig;
pub use error::SceneError;
