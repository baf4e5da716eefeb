//! Native window host.
//!
//! Owns the winit event loop, the [`Stage`], the GPU presenter and the frame
//! clock. Per redraw: tick the clock, apply shortcuts and pointer presses,
//! tick the stage, present the scene canvas.
//!
//! | Key     | Action                                   |
//! |---------|------------------------------------------|
//! | `Space` | pause / resume                           |
//! | `R`     | re-activate the preset with its defaults |
//! | `S`     | save the current frame as a PNG          |
//! | `D`     | toggle the debug panel (`egui` feature)  |
//! | `Esc`   | quit                                     |

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::error::{GpuError, RunError};
use crate::gpu::Presenter;
use crate::input::{Input, KeyCode, Viewport};
use crate::preset::PresetId;
use crate::scene::{CanvasSlot, SceneConfig};
use crate::stage::Stage;
use crate::time::FrameClock;

#[cfg(feature = "egui")]
use crate::gpu::egui_integration::EguiIntegration;

/// Settings for [`run`].
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    /// Canvas width in pixels. The window opens at this logical size.
    pub width: u32,
    pub height: u32,
    /// Shown until a preset sets its own title.
    pub title: String,
    /// Open with the debug panel visible.
    pub debug_panel: bool,
    /// Fixed scene seed; `None` picks a new one at every activation.
    pub seed: Option<u64>,
    /// Step the scene by a constant delta instead of wall-clock time.
    pub fixed_delta: Option<f32>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 640,
            title: "shoal".to_string(),
            debug_panel: false,
            seed: None,
            fixed_delta: None,
        }
    }
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_debug_panel(mut self, enabled: bool) -> Self {
        self.debug_panel = enabled;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_fixed_delta(mut self, delta: Option<f32>) -> Self {
        self.fixed_delta = delta;
        self
    }

    fn scene_config(&self) -> SceneConfig {
        let config = SceneConfig::new();
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

/// Open a window and run the water preset until it is closed.
///
/// Fails with [`GpuError::CanvasTooLarge`] if the requested canvas does not
/// fit in a texture on the chosen device.
pub fn run(config: RunConfig) -> Result<(), RunError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct App {
    config: RunConfig,
    window: Option<Arc<Window>>,
    presenter: Option<Presenter>,
    stage: Option<Stage>,
    input: Input,
    clock: FrameClock,
    show_panel: bool,
    #[cfg(feature = "egui")]
    egui: Option<EguiIntegration>,
    error: Option<RunError>,
}

impl App {
    fn new(config: RunConfig) -> Self {
        let canvas = (config.width, config.height);
        let clock = FrameClock::new().with_fixed_delta(config.fixed_delta);
        Self {
            show_panel: config.debug_panel,
            input: Input::new(Viewport::new(canvas, canvas)),
            clock,
            config,
            window: None,
            presenter: None,
            stage: None,
            #[cfg(feature = "egui")]
            egui: None,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), RunError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.width,
                self.config.height,
            ));
        let window = Arc::new(event_loop.create_window(window_attrs)?);

        let presenter = pollster::block_on(Presenter::new(window.clone()))?;
        let max = presenter.max_canvas_dimension();
        if self.config.width > max || self.config.height > max {
            return Err(GpuError::CanvasTooLarge {
                width: self.config.width,
                height: self.config.height,
                max,
            }
            .into());
        }

        let slot = CanvasSlot::new("main", self.config.width, self.config.height);
        let mut stage = Stage::new(slot, self.config.scene_config());
        stage.activate(PresetId::Water)?;
        if let Some(preset) = stage.preset() {
            window.set_title(preset.title);
        }

        #[cfg(feature = "egui")]
        {
            self.egui = Some(EguiIntegration::new(
                presenter.device(),
                presenter.surface_format(),
                &window,
            ));
        }

        let size = window.inner_size();
        self.input.set_window_size(size.width, size.height);

        self.window = Some(window);
        self.presenter = Some(presenter);
        self.stage = Some(stage);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: RunError) {
        log::error!("{}", error);
        self.error = Some(error);
        self.shutdown(event_loop);
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(stage) = &mut self.stage {
            stage.shutdown();
        }
        event_loop.exit();
    }

    fn handle_shortcuts(&mut self, event_loop: &ActiveEventLoop) -> Result<(), RunError> {
        if self.input.key_pressed(KeyCode::Escape) {
            self.shutdown(event_loop);
            return Ok(());
        }
        if self.input.key_pressed(KeyCode::Space) {
            self.clock.toggle_pause();
        }
        if self.input.key_pressed(KeyCode::D) {
            self.show_panel = !self.show_panel;
            if cfg!(not(feature = "egui")) {
                log::info!("the debug panel needs the `egui` feature");
            }
        }

        let Some(stage) = &mut self.stage else {
            return Ok(());
        };
        if self.input.key_pressed(KeyCode::R) {
            stage.restart()?;
        }
        if self.input.key_pressed(KeyCode::S) {
            if let Some(presenter) = &self.presenter {
                let path = format!("shoal-{}.png", self.clock.frame());
                match presenter.save_png(&path) {
                    Ok(()) => log::info!("saved {}", path),
                    Err(e) => log::error!("{}", e),
                }
            }
        }
        Ok(())
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) -> Result<(), RunError> {
        let dt = self.clock.tick();
        self.handle_shortcuts(event_loop)?;

        if let Some(stage) = &mut self.stage {
            for event in self.input.take_scene_events() {
                stage.input(event);
            }
            stage.tick(dt)?;
        }

        self.present(event_loop);
        self.input.begin_frame();
        Ok(())
    }

    #[cfg(not(feature = "egui"))]
    fn present(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(presenter), Some(stage)) = (&mut self.presenter, &self.stage) else {
            return;
        };
        let Some(canvas) = stage.scene().and_then(|s| s.canvas()) else {
            return;
        };
        let result = presenter.present(canvas);
        handle_surface_result(presenter, result, event_loop);
    }

    #[cfg(feature = "egui")]
    fn present(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(presenter), Some(stage), Some(window)) =
            (&mut self.presenter, &self.stage, &self.window)
        else {
            return;
        };
        let Some(scene) = stage.scene() else {
            return;
        };
        let Some(canvas) = scene.canvas() else {
            return;
        };

        let result = match (&mut self.egui, stage.store(), self.show_panel) {
            (Some(egui), Some(store), true) => {
                let status = crate::panel::PanelStatus {
                    fps: self.clock.fps(),
                    elapsed: self.clock.elapsed(),
                    live_fish: scene.simulation().map_or(0, |s| s.live_count()),
                    captured: scene.simulation().map_or(0, |s| s.captured_count()),
                    paused: self.clock.is_paused(),
                };
                let title = stage.preset().map_or("shoal", |p| p.name);
                presenter.present_with(canvas, |target| {
                    egui.paint(window, target, |ctx| {
                        crate::panel::show(ctx, title, store, status);
                    });
                })
            }
            _ => presenter.present(canvas),
        };
        handle_surface_result(presenter, result, event_loop);
    }

    #[cfg(feature = "egui")]
    fn egui_consumed(&mut self, event: &WindowEvent) -> bool {
        if !self.show_panel {
            return false;
        }
        match (&mut self.egui, &self.window) {
            (Some(egui), Some(window)) => egui.on_window_event(window, event),
            _ => false,
        }
    }

    #[cfg(not(feature = "egui"))]
    fn egui_consumed(&mut self, _event: &WindowEvent) -> bool {
        false
    }
}

fn handle_surface_result(
    presenter: &mut Presenter,
    result: Result<(), wgpu::SurfaceError>,
    event_loop: &ActiveEventLoop,
) {
    match result {
        Ok(()) => {}
        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => presenter.reconfigure(),
        Err(wgpu::SurfaceError::OutOfMemory) => {
            log::error!("GPU out of memory");
            event_loop.exit();
        }
        Err(e) => log::warn!("render error: {:?}", e),
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if !self.egui_consumed(&event) {
            self.input.handle_event(&event);
        }

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(physical_size) => {
                if let Some(presenter) = &mut self.presenter {
                    presenter.resize(physical_size);
                }
                self.input
                    .set_window_size(physical_size.width, physical_size.height);
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.frame(event_loop) {
                    self.fail(event_loop, e);
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
