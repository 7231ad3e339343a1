//! Core rendering functionality
//!
//! Shader loading, per-frame matrix computation, the shadow/colour pass
//! sequence and the [`Renderer`] that ties them together.

pub mod frame;
pub mod pipeline_manager;
pub mod programs;
pub mod renderer;
pub mod transforms;

// Re-export main types
pub use frame::{FrameSequencer, PassState, RenderPhase, RenderTarget, Viewport};
pub use pipeline_manager::{PipelineConfig, PipelineManager, PipelineStats, ProgramSource};
pub use programs::{ModelProgram, ShadowProgram, SkyboxProgram};
pub use renderer::Renderer;
pub use transforms::FrameTransforms;
