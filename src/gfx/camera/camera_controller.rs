use winit::{
    event::{ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
};

use super::camera_utils::{Camera, CameraMovement};

/// Pixels per scroll line for touchpads reporting pixel deltas
const PIXELS_PER_LINE: f32 = 20.0;

/// Movement keys currently held down
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MovementState {
    /// Updates held state from a key event
    ///
    /// # Returns
    /// `true` if the key is one of W/A/S/D
    pub fn process_key_event(&mut self, event: &KeyEvent) -> bool {
        let PhysicalKey::Code(code) = event.physical_key else {
            return false;
        };
        self.set_key(code, event.state == ElementState::Pressed)
    }

    pub fn set_key(&mut self, code: KeyCode, pressed: bool) -> bool {
        let held = match code {
            KeyCode::KeyW => &mut self.forward,
            KeyCode::KeyS => &mut self.backward,
            KeyCode::KeyA => &mut self.left,
            KeyCode::KeyD => &mut self.right,
            _ => return false,
        };
        *held = pressed;
        true
    }

    /// Moves the camera for every held direction
    pub fn apply(&self, camera: &mut dyn Camera, delta_time: f32) {
        let directions = [
            (self.forward, CameraMovement::Forward),
            (self.backward, CameraMovement::Backward),
            (self.left, CameraMovement::Left),
            (self.right, CameraMovement::Right),
        ];
        for (held, direction) in directions {
            if held {
                camera.process_keyboard(direction, delta_time);
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Turns absolute cursor positions into look offsets
///
/// The first position after a reset only primes the tracker so the view does
/// not jump when the cursor enters the window.
#[derive(Debug, Clone, Copy, Default)]
pub struct MouseLook {
    last: Option<(f32, f32)>,
}

impl MouseLook {
    /// Returns `(x_offset, y_offset)` with y reversed so moving up looks up
    pub fn offset(&mut self, x: f32, y: f32) -> (f32, f32) {
        let (last_x, last_y) = self.last.unwrap_or((x, y));
        self.last = Some((x, y));
        (x - last_x, last_y - y)
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn is_primed(&self) -> bool {
        self.last.is_some()
    }
}

/// Scroll amount in lines, positive away from the user
pub fn scroll_lines(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => *y,
        MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::FlyCamera;
    use approx::assert_relative_eq;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn test_wasd_keys_toggle_state() {
        let mut state = MovementState::default();
        assert!(state.set_key(KeyCode::KeyW, true));
        assert!(state.set_key(KeyCode::KeyD, true));
        assert!(!state.set_key(KeyCode::KeyQ, true));
        assert!(state.forward && state.right);

        state.set_key(KeyCode::KeyW, false);
        assert!(!state.forward);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut camera = FlyCamera::default();
        let state = MovementState {
            forward: true,
            backward: true,
            ..Default::default()
        };
        state.apply(&mut camera, 1.0);
        assert_relative_eq!(camera.position.z, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_first_mouse_position_yields_no_offset() {
        let mut look = MouseLook::default();
        assert!(!look.is_primed());
        assert_eq!(look.offset(400.0, 300.0), (0.0, 0.0));
        assert_eq!(look.offset(410.0, 280.0), (10.0, 20.0));

        look.reset();
        assert_eq!(look.offset(0.0, 0.0), (0.0, 0.0));
    }

    #[test]
    fn test_scroll_lines() {
        assert_eq!(scroll_lines(&MouseScrollDelta::LineDelta(0.0, 2.0)), 2.0);
        let pixels = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 40.0));
        assert_eq!(scroll_lines(&pixels), 2.0);
    }
}
