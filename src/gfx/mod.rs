//! # Graphics Module
//!
//! Everything the explorer needs to put a scene on screen.
//!
//! - **Camera** ([`camera`]) - Look-at camera and mouse orbit controls
//! - **Geometry** ([`geometry`]) - Procedural primitives and the skybox cube
//! - **Rendering** ([`rendering`]) - Shadow pass, colour pass and shader programs
//! - **Resources** ([`resources`]) - Device/surface setup, depth buffers and the shadow map
//! - **Scene** ([`scene`]) - Models, materials and scene-wide parameters
//!
//! ## Usage
//!
//! The renderer is driven by [`ExplorerApp`](crate::app::ExplorerApp), but the
//! lifecycle can also be used directly:
//!
//! ```no_run
//! use spectral_explorer::config::RendererConfig;
//! use spectral_explorer::gfx::{camera::SceneCamera, rendering::Renderer, scene::Scene};
//!
//! let mut scene = Scene::new();
//! let mut renderer = Renderer::new(RendererConfig::from_env(), SceneCamera::default());
//! // renderer.start(&gpu, &mut scene)?;
//! renderer.update(&mut scene, 1280, 720, 0.0);
//! // renderer.draw(&gpu, &scene, &surface_view);
//! // renderer.shutdown(&mut scene)?;
//! ```

pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use camera::SceneCamera;
pub use rendering::Renderer;
