//! ASE (ASCII Scene Export) loader.
//!
//! Text -> tokens -> cursor -> section parsers -> [`Model`], then material
//! resolution against a [`MaterialRegistry`] and compilation into a
//! replayable [`DrawList`](crate::draw_list::DrawList).

mod builder;
mod cursor;
mod model;
mod parser;
mod resolve;
mod tokenizer;

use std::{fs, path::Path};

use corelib::material::MaterialRegistry;

use crate::error::{AseError, AseResult};

pub use cursor::Cursor;
pub use model::{
    DiffuseMap, Face, GeomObject, Material, MaterialRef, MaterialTable, Mesh, Model, TextureFace,
    TextureVertex, Vertex,
};
pub use tokenizer::{DELIMITERS, tokenize};

/// Parse ASE text into an unresolved model.
pub fn parse_str(text: &str) -> AseResult<Model> {
    let mut cursor = Cursor::new(tokenize(text));
    parser::parse_tokens(&mut cursor)
}

/// Read, parse, resolve and compile an ASE file.
///
/// On error nothing has been registered with `registry` unless the failure
/// happened while compiling the draw list.
pub fn load_model(path: impl AsRef<Path>, registry: &dyn MaterialRegistry) -> AseResult<Model> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| AseError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut model = parse_str(&text)?;
    model.resolve_materials(registry)?;
    model.compile()?;

    log::info!(
        "Loaded ASE {}: {} materials, {} objects, {} faces",
        path.display(),
        model.materials.len(),
        model.objects.len(),
        model.face_count()
    );
    Ok(model)
}
