//! Asset loading: ASE scene files into materials, meshes and draw lists.

pub mod ase;
pub mod draw_list;
pub mod error;
pub mod library;

pub use ase::{Model, load_model, parse_str};
pub use error::{AseError, AseResult};
pub use library::{ModelHandle, ModelLibrary};
