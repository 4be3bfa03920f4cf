//! Spawned mesh instances and the per-frame update pass
//!
//! An [`Instance`] is one spawned copy of the scene mesh. Everything about it is
//! fixed at spawn time except the rotation angle, which the update pass advances
//! every frame. The scale factor is derived from the instance age and is never
//! stored.

use cgmath::{Deg, InnerSpace, Matrix4, SquareMatrix, Vector3};

/// Seconds an instance takes to grow from zero to full scale
pub const SCALE_IN_DURATION: f32 = 1.0;

/// Full turn in degrees
const FULL_TURN: f32 = 360.0;

/// One spawned copy of the mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instance {
    /// Clock time (seconds) at which the instance was spawned
    pub spawn_time: f32,
    /// World position
    pub position: Vector3<f32>,
    /// Current rotation around `rotation_axis`, in degrees
    pub rotation_deg: f32,
    /// Rotation axis as drawn at spawn time. Not normalized and may be zero.
    pub rotation_axis: Vector3<f32>,
    /// Angular speed in degrees per second, may be negative
    pub angular_speed: f32,
}

impl Instance {
    /// Creates an instance with a zero rotation angle
    pub fn new(
        spawn_time: f32,
        position: Vector3<f32>,
        rotation_axis: Vector3<f32>,
        angular_speed: f32,
    ) -> Self {
        Self {
            spawn_time,
            position,
            rotation_deg: 0.0,
            rotation_axis,
            angular_speed,
        }
    }

    /// Scale factor for the given clock time, without touching the rotation
    pub fn scale_at(&self, now: f32) -> f32 {
        scale_factor(now - self.spawn_time)
    }

    /// Advances the instance by one frame and returns its current scale factor
    ///
    /// The rotation is wrapped by a single step per frame, so an angle that
    /// overshoots by more than a full turn only catches up over later frames.
    /// Negative speeds wrap the same way from below zero.
    ///
    /// # Arguments
    /// * `now` - Current clock time in seconds
    /// * `delta_time` - Seconds since the previous frame
    pub fn advance(&mut self, now: f32, delta_time: f32) -> f32 {
        let scale = self.scale_at(now);

        self.rotation_deg += delta_time * self.angular_speed;
        if self.rotation_deg > FULL_TURN {
            self.rotation_deg -= FULL_TURN;
        } else if self.rotation_deg < 0.0 {
            self.rotation_deg += FULL_TURN;
        }

        scale
    }

    /// Builds `translate(position) * rotate(angle, axis) * scale(scale)`
    pub fn model_matrix(&self, scale: f32) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * rotation_matrix(Deg(self.rotation_deg), self.rotation_axis)
            * Matrix4::from_scale(scale)
    }
}

/// Linear grow-in: equals `elapsed` on `[0, 1]` and `1.0` afterwards
pub fn scale_factor(elapsed: f32) -> f32 {
    (elapsed / SCALE_IN_DURATION).clamp(0.0, 1.0)
}

/// Rotation around an arbitrary axis
///
/// A non-zero axis is normalized before use; a zero-length axis yields the
/// identity.
pub fn rotation_matrix(angle: Deg<f32>, axis: Vector3<f32>) -> Matrix4<f32> {
    if axis.magnitude2() <= f32::EPSILON {
        return Matrix4::identity();
    }
    Matrix4::from_axis_angle(axis.normalize(), angle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::Vector4;

    fn spinning(angle: f32, speed: f32) -> Instance {
        let mut instance = Instance::new(0.0, Vector3::new(0.0, 0.0, 0.0), Vector3::unit_y(), speed);
        instance.rotation_deg = angle;
        instance
    }

    #[test]
    fn test_scale_grows_linearly_then_holds() {
        assert_eq!(scale_factor(0.0), 0.0);
        assert_relative_eq!(scale_factor(0.25), 0.25);
        assert_relative_eq!(scale_factor(0.75), 0.75);
        assert_eq!(scale_factor(1.0), 1.0);
        assert_eq!(scale_factor(1.5), 1.0);
        assert_eq!(scale_factor(1000.0), 1.0);
    }

    #[test]
    fn test_scale_is_non_decreasing() {
        let mut previous = scale_factor(0.0);
        for step in 1..=300 {
            let current = scale_factor(step as f32 * 0.01);
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_scale_never_negative_before_spawn() {
        let instance = Instance::new(2.0, Vector3::new(0.0, 0.0, 0.0), Vector3::unit_x(), 10.0);
        assert_eq!(instance.scale_at(1.5), 0.0);
    }

    #[test]
    fn test_angle_wraps_once_past_full_turn() {
        let mut instance = spinning(350.0, 100.0);
        instance.advance(1.0, 0.5);
        assert_relative_eq!(instance.rotation_deg, 40.0);
    }

    #[test]
    fn test_large_overshoot_only_wraps_one_turn_per_frame() {
        let mut instance = spinning(0.0, 500.0);
        instance.advance(2.0, 2.0);
        assert_relative_eq!(instance.rotation_deg, 640.0);
        instance.advance(2.0, 0.0);
        assert_relative_eq!(instance.rotation_deg, 280.0);
    }

    #[test]
    fn test_negative_speed_wraps_below_zero() {
        let mut instance = spinning(10.0, -100.0);
        instance.advance(1.0, 0.5);
        assert_relative_eq!(instance.rotation_deg, 320.0);
    }

    #[test]
    fn test_zero_speed_never_rotates() {
        let mut instance = spinning(0.0, 0.0);
        for frame in 1..100 {
            instance.advance(frame as f32 * 0.1, 0.1);
            assert_eq!(instance.rotation_deg, 0.0);
        }
    }

    #[test]
    fn test_zero_axis_is_identity_rotation() {
        let rotation = rotation_matrix(Deg(73.0), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(rotation, Matrix4::identity());
    }

    #[test]
    fn test_unnormalized_axis_rotates_without_scaling() {
        let rotation = rotation_matrix(Deg(90.0), Vector3::new(0.0, 0.0, 3.0));
        let rotated = rotation * Vector4::new(1.0, 0.0, 0.0, 0.0);
        assert_relative_eq!(rotated.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(rotated.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(rotated.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_model_matrix_translates_origin_to_position() {
        let instance = Instance::new(0.0, Vector3::new(1.0, 2.0, 3.0), Vector3::new(0.5, 0.5, 0.5), 90.0);
        let origin = instance.model_matrix(0.5) * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(origin.x, 1.0);
        assert_relative_eq!(origin.y, 2.0);
        assert_relative_eq!(origin.z, 3.0);
    }

    #[test]
    fn test_stored_axis_is_left_unnormalized() {
        let axis = Vector3::new(0.5, 0.5, 0.5);
        let mut instance = Instance::new(0.0, Vector3::new(0.0, 0.0, 0.0), axis, 45.0);
        instance.advance(1.0, 1.0);
        assert_eq!(instance.rotation_axis, axis);
    }
}
