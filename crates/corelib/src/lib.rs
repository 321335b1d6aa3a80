//! Core types shared by loaders and hosts: math re-exports, the material
//! registry and the renderable sink.

pub use glam::{Vec3, vec3};

pub mod material;
pub mod render;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unknown material handle: {0:?}")]
    UnknownMaterial(material::MaterialHandle),
}

pub type CoreResult<T> = Result<T, CoreError>;
