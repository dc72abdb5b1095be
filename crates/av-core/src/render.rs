//! Rendering surface trait

use thiserror::Error;

use crate::scene::SceneDescriptor;

/// Errors a rendering surface can report
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("map provider access token is missing")]
    MissingCredential,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Trait for components that draw scenes
///
/// A failing surface never affects engine state; the engine reports the
/// error and keeps going.
pub trait RenderSurface {
    /// Name used when reporting failures
    fn surface_name(&self) -> &str;

    /// Draw a freshly composed scene
    fn render(&mut self, scene: &SceneDescriptor) -> Result<(), RenderError>;
}
