// src/wgpu_utils/mod.rs
//! WGPU utility functions and helpers
//!
//! Typed buffer wrappers and binding layout shorthands.

pub mod binding_types;
pub mod uniform_buffer;

// Re-export main types
pub use binding_types::*;
pub use uniform_buffer::{ArrayBuffer, UniformBuffer};
