pub mod camera_controller;
pub mod camera_utils;
pub mod fly_camera;

// Re-export main types
pub use camera_controller::{scroll_lines, MouseLook, MovementState};
pub use camera_utils::{projection_matrix, Camera, CameraMovement};
pub use fly_camera::FlyCamera;
