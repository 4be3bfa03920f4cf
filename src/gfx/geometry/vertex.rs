//! # Vertex and Instance Data Structures
//!
//! GPU-compatible per-vertex and per-instance records for mesh rendering.

use cgmath::{Matrix, Matrix3, Matrix4, SquareMatrix, Vector3};

/// A mesh vertex with position, normal and texture coordinates.
///
/// # Memory Layout
///
/// `#[repr(C)]` keeps the field order and packing required for GPU buffers.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    /// Position [x, y, z]
    pub position: [f32; 3],
    /// Normal vector [nx, ny, nz]
    pub normal: [f32; 3],
    /// Texture coordinates [u, v]
    pub tex_coords: [f32; 2],
}

impl Vertex3D {
    /// Vertex buffer layout
    ///
    /// - Location 0: position (Float32x3)
    /// - Location 1: normal (Float32x3)
    /// - Location 2: texture coordinates (Float32x2)
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Per-instance data captured at each draw call
///
/// Holds the `model` matrix, its normal matrix (columns padded to vec4) and
/// the `lightColor` that was current when the draw was issued.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3],
    pub color: [f32; 4],
}

impl InstanceRaw {
    pub fn new(model: &Matrix4<f32>, color: Vector3<f32>) -> Self {
        let normal = normal_matrix(model);
        Self {
            model: (*model).into(),
            normal: [
                normal.x.extend(0.0).into(),
                normal.y.extend(0.0).into(),
                normal.z.extend(0.0).into(),
            ],
            color: color.extend(1.0).into(),
        }
    }

    /// Instance buffer layout, locations 3 to 10
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 8] = wgpu::vertex_attr_array![
            3 => Float32x4,
            4 => Float32x4,
            5 => Float32x4,
            6 => Float32x4,
            7 => Float32x4,
            8 => Float32x4,
            9 => Float32x4,
            10 => Float32x4
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Inverse-transpose of the upper 3x3 of `model`
///
/// Falls back to the plain 3x3 part when it is singular, which happens for
/// freshly spawned instances at zero scale.
pub fn normal_matrix(model: &Matrix4<f32>) -> Matrix3<f32> {
    let linear = Matrix3::from_cols(model.x.truncate(), model.y.truncate(), model.z.truncate());
    linear
        .invert()
        .map(|inverse| inverse.transpose())
        .unwrap_or(linear)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::{Deg, InnerSpace};

    #[test]
    fn test_layout_sizes() {
        assert_eq!(std::mem::size_of::<Vertex3D>(), 32);
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 128);
    }

    #[test]
    fn test_normal_matrix_undoes_non_uniform_scale() {
        let model = Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0);
        let normal = normal_matrix(&model);
        assert_relative_eq!(normal.x.x, 0.5);
        assert_relative_eq!(normal.y.y, 1.0);
    }

    #[test]
    fn test_normal_matrix_of_rotation_keeps_unit_length() {
        let model = Matrix4::from_angle_z(Deg(30.0)) * Matrix4::from_translation(Vector3::new(4.0, 0.0, 0.0));
        let n = normal_matrix(&model) * Vector3::unit_x();
        assert_relative_eq!(n.magnitude(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_scale_does_not_produce_nan() {
        let model = Matrix4::from_scale(0.0);
        let raw = InstanceRaw::new(&model, Vector3::new(1.0, 0.0, 0.0));
        assert!(raw.normal.iter().flatten().all(|v| v.is_finite()));
        assert_eq!(raw.color, [1.0, 0.0, 0.0, 1.0]);
    }
}
