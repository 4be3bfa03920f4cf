use cgmath::*;

use super::camera_utils::{Camera, CameraMovement};
use crate::config::CameraConfig;

/// Default yaw: looking down -Z
pub const YAW: f32 = -90.0;
pub const PITCH: f32 = 0.0;
pub const SPEED: f32 = 2.5;
pub const SENSITIVITY: f32 = 0.1;
pub const ZOOM: f32 = 45.0;

const MIN_ZOOM: f32 = 1.0;
const MAX_ZOOM: f32 = 45.0;
const PITCH_LIMIT: f32 = 89.0;

/// First-person camera driven by Euler angles
#[derive(Debug, Clone, Copy)]
pub struct FlyCamera {
    pub position: Vector3<f32>,
    front: Vector3<f32>,
    up: Vector3<f32>,
    right: Vector3<f32>,
    world_up: Vector3<f32>,
    /// Degrees
    pub yaw: f32,
    /// Degrees, kept within ±89
    pub pitch: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    zoom: f32,
}

impl FlyCamera {
    pub fn new(position: Vector3<f32>) -> Self {
        let mut camera = Self {
            position,
            front: -Vector3::unit_z(),
            up: Vector3::unit_y(),
            right: Vector3::unit_x(),
            world_up: Vector3::unit_y(),
            yaw: YAW,
            pitch: PITCH,
            movement_speed: SPEED,
            mouse_sensitivity: SENSITIVITY,
            zoom: ZOOM,
        };
        camera.update_vectors();
        camera
    }

    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self::new(Vector3::from(config.position));
        camera.movement_speed = config.movement_speed;
        camera.mouse_sensitivity = config.mouse_sensitivity;
        camera.zoom = config.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        camera
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    /// Recomputes the basis after changing `yaw` or `pitch`
    fn update_vectors(&mut self) {
        let (yaw_sin, yaw_cos) = Rad::from(Deg(self.yaw)).0.sin_cos();
        let (pitch_sin, pitch_cos) = Rad::from(Deg(self.pitch)).0.sin_cos();

        self.front = Vector3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(Vector3::new(0.0, 0.0, 3.0))
    }
}

impl Camera for FlyCamera {
    fn position(&self) -> Vector3<f32> {
        self.position
    }

    fn front(&self) -> Vector3<f32> {
        self.front
    }

    fn zoom(&self) -> f32 {
        self.zoom
    }

    fn view_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.position);
        Matrix4::look_to_rh(eye, self.front, self.up)
    }

    fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch = (self.pitch + y_offset * self.mouse_sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(MIN_ZOOM, MAX_ZOOM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_looks_down_negative_z() {
        let camera = FlyCamera::default();
        assert_relative_eq!(camera.front().x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(camera.front().z, -1.0, epsilon = 1e-6);
        assert_relative_eq!(camera.right().x, 1.0, epsilon = 1e-6);
        assert_eq!(camera.position(), Vector3::new(0.0, 0.0, 3.0));
        assert_eq!(camera.zoom(), 45.0);
    }

    #[test]
    fn test_keyboard_moves_along_basis() {
        let mut camera = FlyCamera::default();
        camera.process_keyboard(CameraMovement::Forward, 1.0);
        assert_relative_eq!(camera.position.z, 0.5, epsilon = 1e-5);

        camera.process_keyboard(CameraMovement::Right, 2.0);
        assert_relative_eq!(camera.position.x, 5.0, epsilon = 1e-5);

        camera.process_keyboard(CameraMovement::Left, 2.0);
        camera.process_keyboard(CameraMovement::Backward, 1.0);
        assert_relative_eq!(camera.position.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(camera.position.z, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_pitch_is_clamped() {
        let mut camera = FlyCamera::default();
        camera.process_mouse_movement(0.0, 10_000.0);
        assert_eq!(camera.pitch, 89.0);
        camera.process_mouse_movement(0.0, -100_000.0);
        assert_eq!(camera.pitch, -89.0);
    }

    #[test]
    fn test_mouse_applies_sensitivity() {
        let mut camera = FlyCamera::default();
        camera.process_mouse_movement(100.0, 50.0);
        assert_relative_eq!(camera.yaw, -80.0, epsilon = 1e-4);
        assert_relative_eq!(camera.pitch, 5.0, epsilon = 1e-4);
        assert_relative_eq!(camera.front().magnitude(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = FlyCamera::default();
        camera.process_mouse_scroll(-10.0);
        assert_eq!(camera.zoom(), 45.0);
        camera.process_mouse_scroll(30.0);
        assert_eq!(camera.zoom(), 15.0);
        camera.process_mouse_scroll(100.0);
        assert_eq!(camera.zoom(), 1.0);
    }

    #[test]
    fn test_view_matrix_moves_eye_to_origin() {
        let camera = FlyCamera::default();
        let eye = camera.view_matrix() * Vector4::new(0.0, 0.0, 3.0, 1.0);
        assert_relative_eq!(eye.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(eye.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(eye.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_from_config_applies_settings() {
        let config = CameraConfig {
            position: [1.0, 2.0, 3.0],
            movement_speed: 4.0,
            mouse_sensitivity: 0.2,
            zoom: 60.0,
        };
        let camera = FlyCamera::from_config(&config);
        assert_eq!(camera.position, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(camera.movement_speed, 4.0);
        assert_eq!(camera.zoom(), 45.0);
    }
}
