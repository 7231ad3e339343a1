//! Error types for the renderer and its GPU setup

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by [`Renderer`](crate::gfx::rendering::Renderer) and the GPU context.
///
/// Only start-up and lifecycle failures are reported. Per-frame draw and
/// update calls never return errors.
#[derive(Debug, Error)]
pub enum RendererError {
    /// A shader program failed to load, parse, validate or compile.
    ///
    /// `errors` holds every diagnostic gathered for the program and is never empty.
    #[error("program '{program}' failed to start:\n{errors}")]
    ProgramLoad { program: String, errors: String },

    #[error("renderer has not been started")]
    NotStarted,

    #[error("renderer is already running")]
    AlreadyStarted,

    #[error("GPU initialisation failed: {0}")]
    Gpu(String),

    #[error("failed to load model '{}': {source}", path.display())]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
}

impl RendererError {
    /// Accumulated diagnostics for a failed program load, if this is one.
    pub fn program_errors(&self) -> Option<&str> {
        match self {
            RendererError::ProgramLoad { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

pub type Result<T, E = RendererError> = std::result::Result<T, E>;
