use std::{sync::Arc, time::Instant};

use anyhow::Context;
use cgmath::Point3;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    config::RendererConfig,
    gfx::{
        camera::{CameraController, SceneCamera},
        rendering::Renderer,
        resources::GpuContext,
        scene::Scene,
    },
};

/// Window application driving the renderer lifecycle.
///
/// The renderer starts once the window exists, draws on every redraw and is
/// shut down when the event loop exits (window closed or Escape).
pub struct ExplorerApp {
    event_loop: EventLoop<()>,
    app_state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    renderer: Renderer,
    scene: Scene,
    controller: CameraController,
    started_at: Instant,
    error: Option<anyhow::Error>,
}

impl ExplorerApp {
    pub fn new(scene: Scene, config: RendererConfig) -> anyhow::Result<Self> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;

        let center = scene.scene_center;
        let eye = Point3::new(center.x + 6.0, center.y + 4.0, center.z + 8.0);
        let renderer = Renderer::new(config, SceneCamera::new(eye, center));

        Ok(Self {
            event_loop,
            app_state: AppState {
                window: None,
                gpu: None,
                renderer,
                scene,
                controller: CameraController::new(0.005, 0.5),
                started_at: Instant::now(),
                error: None,
            },
        })
    }

    /// Runs the event loop until the window closes.
    ///
    /// A failure during start-up (window, device or shader programs) ends the
    /// loop and is returned here.
    pub fn run(mut self) -> anyhow::Result<()> {
        self.event_loop.set_control_flow(ControlFlow::Poll);
        self.event_loop
            .run_app(&mut self.app_state)
            .context("event loop terminated abnormally")?;

        match self.app_state.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window = event_loop
            .create_window(
                WindowAttributes::default()
                    .with_title("Spectral Explorer")
                    .with_inner_size(winit::dpi::LogicalSize::new(1200, 800)),
            )
            .context("failed to create window")?;
        let window = Arc::new(window);
        self.window = Some(window.clone());

        let (width, height) = window.inner_size().into();
        let gpu = pollster::block_on(GpuContext::new(window, width, height))?;

        self.renderer
            .start(&gpu, &mut self.scene)
            .context("failed to start renderer")?;
        self.controller.set_home(*self.renderer.camera());
        self.gpu = Some(gpu);
        Ok(())
    }

    fn shutdown(&mut self) {
        if !self.renderer.is_running() {
            return;
        }
        if let Err(e) = self.renderer.shutdown(&mut self.scene) {
            log::warn!("Renderer shutdown failed: {e}");
        }
    }

    fn redraw(&mut self) {
        let (Some(gpu), Some(window)) = (self.gpu.as_mut(), self.window.as_ref()) else {
            return;
        };

        let (width, height) = gpu.surface_size();
        let elapsed = self.started_at.elapsed().as_secs_f32();
        self.renderer.update(&mut self.scene, width, height, elapsed);

        let Some(frame) = gpu.acquire_frame() else {
            return;
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.renderer.draw(gpu, &self.scene, &view);
        window.pre_present_notify();
        frame.present();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        if let Err(e) = self.initialize(event_loop) {
            log::error!("{e:#}");
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    ref key_event @ KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if key_code == KeyCode::Escape {
                    event_loop.exit();
                    return;
                }
                self.controller
                    .process_keyed_events(key_event, self.renderer.camera_mut());
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.resize(width, height);
                }
                if let Some(window) = self.window.as_ref() {
                    window.request_redraw();
                }
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        let Some(window) = self.window.as_ref() else {
            return;
        };
        self.controller
            .process_events(&event, window, self.renderer.camera_mut());
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}
