//! Scene context and per-frame render orchestration
//!
//! [`SceneContext`] owns all mutable scene state: the camera, the instance
//! pool, the spawn controller and frame timing. Each frame it advances the
//! instances and issues uniform updates and draws through the
//! [`ShaderProgram`] and [`Model`] traits, in a fixed order. A
//! [`FrameBackend`] supplies the programs and models and presents the result.

use log::info;

use crate::{
    config::SceneConfig,
    error::SceneError,
    gfx::{
        camera::{projection_matrix, Camera, FlyCamera, MouseLook, MovementState},
        program::{Model, ShaderProgram, UniformSlot},
    },
    lighting::{upload_lighting, LightTable},
    simulation::{InstancePool, SeededSource, SpawnController, SpawnSource},
    timing::{FrameStats, FrameTiming},
};

/// Framebuffer clear color
pub const CLEAR_COLOR: [f32; 4] = [0.1, 0.1, 0.1, 1.0];

/// Programs and models a frame draws with
pub struct DrawTargets<'a> {
    /// Lit, textured program used for the spawned instances
    pub lighting: &'a mut dyn ShaderProgram,
    /// Unlit program used for the light markers
    pub markers: &'a mut dyn ShaderProgram,
    /// Mesh drawn once per instance
    pub model: &'a dyn Model,
    /// Cube drawn once per light
    pub marker_model: &'a dyn Model,
}

/// What a frame is rendered into
pub trait FrameBackend {
    /// Starts a new frame cleared to `color`
    fn clear(&mut self, color: [f32; 4]);

    fn targets(&mut self) -> DrawTargets<'_>;

    /// Submits everything drawn since [`FrameBackend::clear`]
    fn present(&mut self) -> Result<(), SceneError>;
}

/// All per-scene state, passed explicitly to the event handlers
pub struct SceneContext<C: Camera = FlyCamera, S: SpawnSource = SeededSource> {
    camera: C,
    mouse: MouseLook,
    timing: FrameTiming,
    stats: FrameStats,
    pool: InstancePool,
    spawner: SpawnController<S>,
    lights: LightTable,
    aspect: f32,
    instance_scale: f32,
}

impl SceneContext {
    /// Builds the scene described by `config`
    ///
    /// The spawn source uses the configured seed, or the wall clock when
    /// none is given.
    pub fn new(config: &SceneConfig, aspect: f32) -> Self {
        let source = match config.seed {
            Some(seed) => SeededSource::from_seed(seed),
            None => SeededSource::from_clock(),
        };
        info!("Spawn seed: {}", source.seed());

        Self::with_parts(
            FlyCamera::from_config(&config.camera),
            SpawnController::new(config.spawn, source),
            config.pool_capacity,
            config.instance_scale,
            aspect,
        )
    }
}

impl<C: Camera, S: SpawnSource> SceneContext<C, S> {
    pub fn with_parts(
        camera: C,
        spawner: SpawnController<S>,
        capacity: usize,
        instance_scale: f32,
        aspect: f32,
    ) -> Self {
        Self {
            camera,
            mouse: MouseLook::default(),
            timing: FrameTiming::default(),
            stats: FrameStats::default(),
            pool: InstancePool::with_capacity(capacity),
            spawner,
            lights: LightTable,
            aspect,
            instance_scale,
        }
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn pool(&self) -> &InstancePool {
        &self.pool
    }

    pub fn timing(&self) -> &FrameTiming {
        &self.timing
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Spawns one instance at clock time `now`
    ///
    /// # Returns
    /// `false` if the pool is full and nothing was spawned
    pub fn spawn(&mut self, now: f32) -> bool {
        self.spawner.spawn(now, &mut self.pool)
    }

    /// Turns the camera toward cursor position `(x, y)`
    pub fn look(&mut self, x: f32, y: f32) {
        let (x_offset, y_offset) = self.mouse.offset(x, y);
        self.camera.process_mouse_movement(x_offset, y_offset);
    }

    pub fn scroll(&mut self, lines: f32) {
        self.camera.process_mouse_scroll(lines);
    }

    /// Updates the projection aspect; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Updates and draws one frame at clock time `now`
    ///
    /// # Errors
    /// Whatever [`FrameBackend::present`] reports
    pub fn frame(
        &mut self,
        now: f32,
        movement: &MovementState,
        backend: &mut dyn FrameBackend,
    ) -> Result<(), SceneError> {
        let delta_time = self.timing.tick(now);
        movement.apply(&mut self.camera, delta_time);

        backend.clear(CLEAR_COLOR);

        let projection = projection_matrix(self.camera.zoom(), self.aspect);
        let view = self.camera.view_matrix();
        let projection_name = UniformSlot::Projection.to_string();
        let view_name = UniformSlot::View.to_string();
        let model_name = UniformSlot::Model.to_string();

        let DrawTargets {
            lighting,
            markers,
            model,
            marker_model,
        } = backend.targets();

        lighting.use_program();
        upload_lighting(&mut *lighting, &self.lights, &self.camera);
        lighting.set_mat4(&projection_name, &projection);
        lighting.set_mat4(&view_name, &view);

        let base_scale = self.instance_scale;
        self.pool.for_each(|_, instance| {
            let scale = instance.advance(now, delta_time);
            lighting.set_mat4(&model_name, &instance.model_matrix(base_scale * scale));
            model.draw(&mut *lighting);
        });

        markers.use_program();
        markers.set_mat4(&projection_name, &projection);
        markers.set_mat4(&view_name, &view);
        let color_name = UniformSlot::LightColor.to_string();
        for light in self.lights.markers() {
            markers.set_mat4(&model_name, &light.marker_matrix());
            markers.set_vec3(&color_name, light.color);
            marker_model.draw(&mut *markers);
        }

        self.stats.record(now, self.pool.len());
        backend.present()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpawnConfig;
    use crate::gfx::program::MeshId;
    use crate::simulation::spawn::tests::ScriptedSource;
    use approx::assert_relative_eq;
    use cgmath::{InnerSpace, Matrix4, Vector3};
    use std::{cell::RefCell, rc::Rc};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Clear([f32; 4]),
        Use(&'static str),
        Float(&'static str, String),
        Vec3(&'static str, String, Vector3<f32>),
        Mat4(&'static str, String, Matrix4<f32>),
        Draw(&'static str, MeshId),
        Present,
    }

    type Log = Rc<RefCell<Vec<Call>>>;

    struct RecordingProgram {
        name: &'static str,
        log: Log,
    }

    impl ShaderProgram for RecordingProgram {
        fn use_program(&mut self) {
            self.log.borrow_mut().push(Call::Use(self.name));
        }

        fn set_float(&mut self, name: &str, _value: f32) {
            self.log
                .borrow_mut()
                .push(Call::Float(self.name, name.to_string()));
        }

        fn set_vec3(&mut self, name: &str, value: Vector3<f32>) {
            self.log
                .borrow_mut()
                .push(Call::Vec3(self.name, name.to_string(), value));
        }

        fn set_mat4(&mut self, name: &str, value: &Matrix4<f32>) {
            self.log
                .borrow_mut()
                .push(Call::Mat4(self.name, name.to_string(), *value));
        }

        fn draw_mesh(&mut self, mesh: MeshId) {
            self.log.borrow_mut().push(Call::Draw(self.name, mesh));
        }
    }

    struct RecordingBackend {
        log: Log,
        lighting: RecordingProgram,
        markers: RecordingProgram,
        model: MeshId,
        marker_model: MeshId,
    }

    impl RecordingBackend {
        fn new() -> Self {
            let log = Log::default();
            Self {
                lighting: RecordingProgram {
                    name: "lighting",
                    log: log.clone(),
                },
                markers: RecordingProgram {
                    name: "markers",
                    log: log.clone(),
                },
                model: MeshId(0),
                marker_model: MeshId(1),
                log,
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.log.borrow().clone()
        }

        /// Model matrices set on the lighting program, in order
        fn instance_models(&self) -> Vec<Matrix4<f32>> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    Call::Mat4("lighting", name, matrix) if name == "model" => Some(matrix),
                    _ => None,
                })
                .collect()
        }
    }

    impl FrameBackend for RecordingBackend {
        fn clear(&mut self, color: [f32; 4]) {
            self.log.borrow_mut().clear();
            self.log.borrow_mut().push(Call::Clear(color));
        }

        fn targets(&mut self) -> DrawTargets<'_> {
            DrawTargets {
                lighting: &mut self.lighting,
                markers: &mut self.markers,
                model: &self.model,
                marker_model: &self.marker_model,
            }
        }

        fn present(&mut self) -> Result<(), SceneError> {
            self.log.borrow_mut().push(Call::Present);
            Ok(())
        }
    }

    fn scene(values: &[f32]) -> SceneContext<FlyCamera, ScriptedSource> {
        let spawner = SpawnController::new(SpawnConfig::default(), ScriptedSource::new(values));
        SceneContext::with_parts(FlyCamera::default(), spawner, 16, 0.5, 16.0 / 9.0)
    }

    fn position_of(calls: &[Call], wanted: &Call) -> usize {
        calls.iter().position(|call| call == wanted).unwrap()
    }

    #[test]
    fn test_frame_follows_the_fixed_order() {
        let mut scene = scene(&[]);
        scene.spawn(0.0);
        scene.spawn(0.0);
        let mut backend = RecordingBackend::new();

        scene.frame(0.25, &MovementState::default(), &mut backend).unwrap();
        let calls = backend.calls();

        assert_eq!(calls.first(), Some(&Call::Clear(CLEAR_COLOR)));
        assert_eq!(calls.last(), Some(&Call::Present));

        let lighting_bound = position_of(&calls, &Call::Use("lighting"));
        let first_draw = position_of(&calls, &Call::Draw("lighting", MeshId(0)));
        let markers_bound = position_of(&calls, &Call::Use("markers"));
        let last_instance_draw = calls
            .iter()
            .rposition(|call| *call == Call::Draw("lighting", MeshId(0)))
            .unwrap();

        assert!(lighting_bound < first_draw);
        assert!(last_instance_draw < markers_bound);

        let globals_before_first_draw = calls[lighting_bound..first_draw]
            .iter()
            .filter(|call| !matches!(call, Call::Mat4(_, name, _) if name == "model"))
            .count();
        // use, viewPos, shininess, 4 dir, 4 x 7 point, 10 spot, projection, view
        assert_eq!(globals_before_first_draw, 1 + 1 + 1 + 4 + 28 + 10 + 2);

        let instance_draws = calls
            .iter()
            .filter(|call| **call == Call::Draw("lighting", MeshId(0)))
            .count();
        assert_eq!(instance_draws, 2);
    }

    #[test]
    fn test_seven_markers_with_cyclic_colors() {
        let mut scene = scene(&[]);
        let mut backend = RecordingBackend::new();
        scene.frame(0.1, &MovementState::default(), &mut backend).unwrap();
        let calls = backend.calls();

        let marker_draws = calls
            .iter()
            .filter(|call| **call == Call::Draw("markers", MeshId(1)))
            .count();
        assert_eq!(marker_draws, 7);

        let colors: Vec<Vector3<f32>> = calls
            .iter()
            .filter_map(|call| match call {
                Call::Vec3("markers", name, color) if name == "lightColor" => Some(*color),
                _ => None,
            })
            .collect();
        assert_eq!(colors.len(), 7);
        assert_eq!(colors[0], colors[4]);
        assert_eq!(colors[3], Vector3::new(1.0, 1.0, 1.0));

        let marker_models = calls
            .iter()
            .filter(|call| matches!(call, Call::Mat4("markers", name, _) if name == "model"))
            .count();
        assert_eq!(marker_models, 7);
    }

    #[test]
    fn test_spawned_instance_grows_and_turns() {
        let mut scene = scene(&[1.0, 2.0, 3.0, 0.5, 0.5, 0.5, 90.0]);
        let mut backend = RecordingBackend::new();
        assert!(scene.spawn(0.0));

        scene.frame(0.5, &MovementState::default(), &mut backend).unwrap();
        let instance = scene.pool().get(0).unwrap();
        assert_relative_eq!(instance.rotation_deg, 45.0, epsilon = 1e-4);
        let model = backend.instance_models()[0];
        assert_relative_eq!(model.x.truncate().magnitude(), 0.5 * 0.5, epsilon = 1e-5);
        assert_eq!(model.w, cgmath::Vector4::new(1.0, 2.0, 3.0, 1.0));

        scene.frame(2.0, &MovementState::default(), &mut backend).unwrap();
        let instance = scene.pool().get(0).unwrap();
        assert_relative_eq!(instance.rotation_deg, 180.0, epsilon = 1e-4);
        let model = backend.instance_models()[0];
        assert_relative_eq!(model.x.truncate().magnitude(), 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_zero_speed_instance_never_turns() {
        let mut scene = scene(&[0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        let mut backend = RecordingBackend::new();
        scene.spawn(0.0);

        for step in 1..=10 {
            scene
                .frame(step as f32 * 0.3, &MovementState::default(), &mut backend)
                .unwrap();
        }
        assert_eq!(scene.pool().get(0).unwrap().rotation_deg, 0.0);
    }

    #[test]
    fn test_held_keys_move_the_camera_by_frame_delta() {
        let mut scene = scene(&[]);
        let mut backend = RecordingBackend::new();
        let movement = MovementState {
            forward: true,
            ..Default::default()
        };

        scene.frame(1.0, &movement, &mut backend).unwrap();
        // 2.5 units/s along -Z for one second
        assert_relative_eq!(scene.camera().position().z, 0.5, epsilon = 1e-4);
        assert_relative_eq!(scene.timing().delta_time(), 1.0);
    }

    #[test]
    fn test_first_look_does_not_turn_the_camera() {
        let mut scene = scene(&[]);
        let front = scene.camera().front();
        scene.look(400.0, 300.0);
        assert!((scene.camera().front() - front).magnitude() < 1e-6);

        scene.look(410.0, 300.0);
        assert!((scene.camera().front() - front).magnitude() > 1e-4);
    }

    #[test]
    fn test_resize_ignores_minimized_window() {
        let mut scene = scene(&[]);
        scene.resize(800, 400);
        assert_relative_eq!(scene.aspect(), 2.0);
        scene.resize(800, 0);
        assert_relative_eq!(scene.aspect(), 2.0);
    }

    #[test]
    fn test_spawns_beyond_capacity_are_dropped() {
        let spawner = SpawnController::new(SpawnConfig::default(), ScriptedSource::new(&[]));
        let mut scene = SceneContext::with_parts(FlyCamera::default(), spawner, 1, 0.5, 1.0);
        assert!(scene.spawn(0.0));
        assert!(!scene.spawn(0.1));
        assert_eq!(scene.pool().len(), 1);
    }
}
