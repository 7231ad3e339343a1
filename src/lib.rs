//! Spectral Explorer
//!
//! A small scene-inspection tool built on wgpu and winit: OBJ models and
//! primitives rendered with a directional light, a shadow map and a skybox.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::ExplorerApp;
pub use config::RendererConfig;
pub use error::{RendererError, Result};
pub use gfx::{rendering::Renderer, scene::Scene};
