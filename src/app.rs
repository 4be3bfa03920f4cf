use std::sync::Arc;

use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowAttributes, WindowId},
};

use crate::{
    config::SceneConfig,
    error::SceneError,
    gfx::{
        camera::{scroll_lines, MovementState},
        resources::ModelData,
        RenderEngine,
    },
    scene::SceneContext,
    timing::SceneClock,
};

pub struct SpinfieldApp {
    event_loop: EventLoop<()>,
    app_state: AppState,
}

struct AppState {
    config: SceneConfig,
    clock: SceneClock,
    model: Option<ModelData>,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    scene: Option<SceneContext>,
    movement: MovementState,
    /// Virtual cursor position, accumulated from raw mouse motion
    cursor: (f32, f32),
    error: Option<SceneError>,
}

impl SpinfieldApp {
    /// Creates the event loop and loads the model named in `config`
    ///
    /// The window and GPU resources are created once the event loop starts.
    pub fn new(config: SceneConfig) -> Result<Self, SceneError> {
        let event_loop = EventLoop::new()?;
        let model = ModelData::load(&config.model_path)?;

        Ok(Self {
            event_loop,
            app_state: AppState {
                config,
                clock: SceneClock::start(),
                model: Some(model),
                window: None,
                render_engine: None,
                scene: None,
                movement: MovementState::default(),
                cursor: (0.0, 0.0),
                error: None,
            },
        })
    }

    /// Runs until the window closes or Escape is pressed
    ///
    /// # Errors
    /// Initialization failures inside the event loop and fatal frame errors
    pub fn run(self) -> Result<(), SceneError> {
        let SpinfieldApp {
            event_loop,
            mut app_state,
        } = self;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut app_state)?;

        match app_state.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SceneError> {
        let window_config = &self.config.window;
        let window = Arc::new(
            event_loop.create_window(
                WindowAttributes::default()
                    .with_title(window_config.title.clone())
                    .with_inner_size(PhysicalSize::new(window_config.width, window_config.height)),
            )?,
        );
        capture_cursor(&window);

        let (width, height): (u32, u32) = window.inner_size().into();
        let mut renderer = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            window_config.vsync,
        ))?;
        if let Some(model) = self.model.take() {
            renderer.upload_model(&model)?;
        }

        self.scene = Some(SceneContext::new(
            &self.config,
            width as f32 / height.max(1) as f32,
        ));
        self.cursor = (width as f32 / 2.0, height as f32 / 2.0);
        self.render_engine = Some(renderer);
        self.window = Some(window);

        info!("Scene ready at {}x{}", width, height);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: SceneError) {
        error!("{}", err);
        self.error = Some(err);
        event_loop.exit();
    }
}

/// Hides the cursor and keeps it inside the window
fn capture_cursor(window: &Window) {
    window.set_cursor_visible(false);
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(err) = grabbed {
        warn!("Could not grab the cursor: {}", err);
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.error.is_some() {
            return;
        }

        if let Err(err) = self.init(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let (Some(render_engine), Some(scene)) = (self.render_engine.as_mut(), self.scene.as_mut())
        else {
            return;
        };

        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                    && event.state == ElementState::Pressed
                {
                    event_loop.exit();
                    return;
                }
                self.movement.process_key_event(&event);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                scene.spawn(self.clock.now());
            }
            WindowEvent::MouseWheel { delta, .. } => {
                scene.scroll(scroll_lines(&delta));
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                render_engine.resize(width, height);
                scene.resize(width, height);
            }
            WindowEvent::Focused(false) => {
                self.movement.clear();
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = scene.frame(self.clock.now(), &self.movement, render_engine) {
                    self.fail(event_loop, err);
                }
            }
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        let (Some(scene), DeviceEvent::MouseMotion { delta: (dx, dy) }) = (self.scene.as_mut(), event)
        else {
            return;
        };

        self.cursor.0 += dx as f32;
        self.cursor.1 += dy as f32;
        scene.look(self.cursor.0, self.cursor.1);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
