//! Errors raised while assembling a scene.

use thiserror::Error;

use crate::{MaterialId, TextureId};

/// Errors that can occur while building a scene description.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("unknown material id {0:?} (scene has {1} materials)")]
    UnknownMaterial(MaterialId, usize),

    #[error("unknown texture id {0:?} (scene has {1} textures)")]
    UnknownTexture(TextureId, usize),

    #[error("invalid texture: {0}")]
    InvalidTexture(String),

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("invalid camera: {0}")]
    InvalidCamera(String),
}

pub type SceneResult<T> = Result<T, SceneError>;
