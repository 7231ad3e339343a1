//! Device, queue and presentation surface
//!
//! Owns the wgpu objects the renderer borrows every frame, plus the depth
//! buffer of the colour pass, which has to follow the surface size.

use std::sync::Arc;

use crate::{
    error::{RendererError, Result},
    gfx::rendering::frame::Viewport,
};

use super::texture_resource::TextureResource;

pub struct GpuContext {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: TextureResource,
}

impl GpuContext {
    /// Creates the device and configures the surface for the given window
    ///
    /// # Arguments
    /// * `window` - Window surface target for rendering
    /// * `width` - Initial surface width in pixels
    /// * `height` - Initial surface height in pixels
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window)
            .map_err(|e| RendererError::Gpu(format!("surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RendererError::Gpu(format!("adapter: {e}")))?;
        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Explorer Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| RendererError::Gpu(format!("device: {e}")))?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or_else(|| RendererError::Gpu("surface reports no formats".to_string()))?;
        let alpha_mode = surface_capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = TextureResource::create_depth_texture(&device, &config, "depth_texture");

        Ok(Self {
            surface,
            device: Arc::new(device),
            queue: Arc::new(queue),
            config,
            depth_texture,
        })
    }

    /// Reconfigures the surface and recreates the depth buffer.
    ///
    /// Zero-sized requests (minimised windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Acquires the next surface texture, reconfiguring once if the surface went stale
    pub fn acquire_frame(&mut self) -> Option<wgpu::SurfaceTexture> {
        match self.surface.get_current_texture() {
            Ok(frame) => Some(frame),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                self.surface.get_current_texture().ok()
            }
            Err(e) => {
                log::warn!("Dropped frame: {e}");
                None
            }
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Shared handle for owners that outlive a borrow of the context
    pub fn device_handle(&self) -> Arc<wgpu::Device> {
        Arc::clone(&self.device)
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_texture.view
    }

    pub fn depth_format(&self) -> wgpu::TextureFormat {
        TextureResource::DEPTH_FORMAT
    }

    /// Surface dimensions as (width, height) in pixels
    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Full-surface viewport, the one the colour pass renders with
    pub fn viewport(&self) -> Viewport {
        Viewport::new(0, 0, self.config.width, self.config.height)
    }
}
