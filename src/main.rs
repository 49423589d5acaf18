use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec3;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use petal_field::cli::Cli;
use petal_field::config::SceneConfig;
use petal_field::core::Clock;
use petal_field::host::{FrameStats, SceneHost};
use petal_field::render::SceneRenderer;
use petal_field::scene::{LoadedModel, Mesh, ModelNode};

const STATS_INTERVAL: f32 = 2.0;
const PLACEHOLDER_COLOR: [f32; 4] = [0.45, 0.6, 0.35, 1.0];

struct App {
    config: SceneConfig,
    window: Option<Arc<Window>>,
    renderer: Option<SceneRenderer>,
    host: SceneHost,
    clock: Clock,
}

impl App {
    fn new(config: SceneConfig) -> Self {
        let mut host = SceneHost::new(config.clone(), config.width, config.height);
        host.on_load_progress(|percent| log::info!("loading model: {:.0}%", percent));

        Self {
            config,
            window: None,
            renderer: None,
            host,
            clock: Clock::new(),
        }
    }

    fn start_load(&mut self) {
        let Some(path) = self.config.model.clone() else {
            log::info!("no model given, using placeholder ground");
            self.install_placeholder();
            return;
        };

        if let Err(e) = self.host.load_model(&path) {
            log::error!("could not start loading {:?}: {}", path, e);
            self.install_placeholder();
        }
    }

    fn poll_load(&mut self) {
        if let Some(Err(e)) = self.host.poll_load() {
            log::warn!("falling back to placeholder geometry after load failure: {}", e);
            self.install_placeholder();
        }
    }

    fn install_placeholder(&mut self) {
        if let Err(e) = self.host.install_model(placeholder_model(&self.config.target)) {
            log::error!("could not install placeholder ground: {}", e);
        }
    }

    fn log_stats(&mut self, stats: FrameStats) {
        if let Some(fps) = self.clock.frame_rate(STATS_INTERVAL) {
            log::info!(
                "FPS: {:.1}, {} instances ({} excited), {} petals active",
                fps,
                stats.instances,
                stats.excited,
                stats.active_particles
            );
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        let released = self.host.dispose();
        if let Some(renderer) = &mut self.renderer {
            let buffers = renderer.release_meshes();
            log::debug!("released {} meshes and {} GPU mesh buffers", released, buffers);
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Petal Field")
                .with_inner_size(winit::dpi::LogicalSize::new(
                    self.config.width,
                    self.config.height,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let renderer = match pollster::block_on(SceneRenderer::new(window.clone())) {
            Ok(r) => r,
            Err(e) => {
                log::error!("Failed to initialize renderer: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.host.resize(size.width, size.height);
        self.window = Some(window);
        self.renderer = Some(renderer);
        self.clock.reset();
        self.start_load();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.shutdown(event_loop),
            WindowEvent::Resized(size) => {
                self.host.handle_window_event(&event);
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let delta = self.clock.tick();
                self.poll_load();
                let stats = self.host.update(delta);
                self.log_stats(stats);

                if let Some(renderer) = &mut self.renderer {
                    match renderer.render(&mut self.host) {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            if let Some(window) = &self.window {
                                let size = window.inner_size();
                                renderer.resize(size.width, size.height);
                            }
                        }
                        Err(e) => log::error!("Render error: {}", e),
                    }
                }
            }
            _ => {
                self.host.handle_window_event(&event);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

/// Flat ground standing in for a model that failed to load
fn placeholder_model(target: &str) -> LoadedModel {
    let half = 5.0;
    let ground = Mesh::new(
        "placeholder",
        vec![
            Vec3::new(-half, 0.0, -half),
            Vec3::new(-half, 0.0, half),
            Vec3::new(half, 0.0, half),
            Vec3::new(half, 0.0, -half),
        ],
        None,
        Some(vec![0, 1, 2, 0, 2, 3]),
        PLACEHOLDER_COLOR,
    );

    LoadedModel {
        root: ModelNode::new("placeholder").with_child(ModelNode::new(target).with_mesh(0)),
        meshes: vec![ground],
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.scene_config().context("Failed to load scene configuration")?;

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let mut app = App::new(config);

    log::info!("Petal Field - move the pointer over the ground; WASD/QE orbit, Escape to quit");
    event_loop.run_app(&mut app).context("Event loop terminated with an error")?;

    Ok(())
}
