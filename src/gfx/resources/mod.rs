// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Device/surface ownership and the textures the render passes draw into.

pub mod gpu_context;
pub mod texture_resource;

// Re-export main types
pub use gpu_context::GpuContext;
pub use texture_resource::{ShadowMap, ShadowMapParams, TextureResource};
