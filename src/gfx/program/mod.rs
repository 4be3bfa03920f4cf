//! Shader programs and drawable models
//!
//! Scene code talks to the GPU only through two traits: [`ShaderProgram`],
//! which takes GLSL-style named uniforms and draw requests, and [`Model`],
//! which draws itself with a program.

pub mod recorder;
pub mod uniforms;

pub use recorder::ProgramRecorder;
pub use uniforms::{
    LightField, LightingUniforms, MarkerUniforms, UniformBlock, UniformError, UniformKind,
    UniformSlot, UniformValue, MAX_POINT_LIGHTS,
};

use cgmath::{Matrix4, Vector3};

/// Handle of a mesh uploaded to the GPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub usize);

/// A shader program accepting named uniforms
///
/// Uniforms keep their value until set again. A draw uses whatever values
/// were set before it.
pub trait ShaderProgram {
    /// Makes this the program subsequent draws go through
    fn use_program(&mut self);

    fn set_float(&mut self, name: &str, value: f32);

    fn set_vec3(&mut self, name: &str, value: Vector3<f32>);

    fn set_mat4(&mut self, name: &str, value: &Matrix4<f32>);

    /// Draws `mesh` with the current uniform values
    fn draw_mesh(&mut self, mesh: MeshId);
}

/// Something that can draw itself with a shader program
pub trait Model {
    fn draw(&self, program: &mut dyn ShaderProgram);
}

/// A single mesh drawn as a model
impl Model for MeshId {
    fn draw(&self, program: &mut dyn ShaderProgram) {
        program.draw_mesh(*self);
    }
}
