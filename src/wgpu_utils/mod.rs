// src/wgpu_utils/mod.rs
//! WGPU utility functions and helpers
//!
//! Small wrappers for the uniform buffers and binding types the programs share.

pub mod binding_types;
pub mod uniform_buffer;

// Re-export main types
pub use binding_types::*;
pub use uniform_buffer::UniformBuffer;
