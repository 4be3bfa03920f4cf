use cgmath::{perspective, Deg, Matrix4, Vector3};

/// Near clip plane distance
pub const Z_NEAR: f32 = 0.1;
/// Far clip plane distance
pub const Z_FAR: f32 = 100.0;

/// Maps OpenGL clip space depth (-1..1) onto wgpu's (0..1)
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Possible camera movement directions, independent of the input backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Viewer the scene is rendered from
pub trait Camera {
    fn position(&self) -> Vector3<f32>;

    /// Unit view direction
    fn front(&self) -> Vector3<f32>;

    /// Vertical field of view in degrees
    fn zoom(&self) -> f32;

    fn view_matrix(&self) -> Matrix4<f32>;

    fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32);

    /// Offsets are in pixels; positive y looks up
    fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32);

    fn process_mouse_scroll(&mut self, y_offset: f32);
}

/// Perspective projection for wgpu clip space
///
/// # Arguments
/// * `fovy_deg` - Vertical field of view in degrees
/// * `aspect` - Viewport width over height
pub fn projection_matrix(fovy_deg: f32, aspect: f32) -> Matrix4<f32> {
    OPENGL_TO_WGPU_MATRIX * perspective(Deg(fovy_deg), aspect, Z_NEAR, Z_FAR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::Vector4;

    fn clip_depth(z: f32) -> f32 {
        let clip = projection_matrix(45.0, 16.0 / 9.0) * Vector4::new(0.0, 0.0, z, 1.0);
        clip.z / clip.w
    }

    #[test]
    fn test_projection_maps_near_far_to_unit_depth() {
        assert_relative_eq!(clip_depth(-Z_NEAR), 0.0, epsilon = 1e-5);
        assert_relative_eq!(clip_depth(-Z_FAR), 1.0, epsilon = 1e-4);
    }
}
