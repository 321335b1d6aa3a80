//! Error type for ASE loading.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::library::ModelHandle;

#[derive(Debug, Error)]
pub enum AseError {
    #[error("Failed to read ASE file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Token stream ended at token {position} while reading {context}")]
    TruncatedStream {
        position: usize,
        context: &'static str,
    },

    #[error("Expected '{expected}' at token {position}, found '{found}'")]
    UnexpectedToken {
        position: usize,
        expected: &'static str,
        found: String,
    },

    #[error("Invalid number '{token}' at token {position} ({context})")]
    InvalidNumber {
        position: usize,
        token: String,
        context: &'static str,
    },

    #[error("'{keyword}' at token {position} appears before any {needs}")]
    MissingContext {
        position: usize,
        keyword: String,
        needs: &'static str,
    },

    #[error("{what} index {index} out of range (len={len}) at token {position}")]
    IndexOutOfRange {
        position: usize,
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error(
        "Object '{object}' references material {material_ref}, but only {material_count} are declared"
    )]
    UnresolvedReference {
        object: String,
        material_ref: usize,
        material_count: usize,
    },

    #[error("Material references were already resolved for this model")]
    DoubleResolution,

    #[error("Material references must be resolved before building draw lists")]
    Unresolved,

    #[error("Model has no compiled draw list")]
    NotCompiled,

    #[error("Index {index} into {what} out of range (len={len}) in object '{object}'")]
    BadMeshIndex {
        object: String,
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Unknown model handle: {0:?}")]
    UnknownModel(ModelHandle),
}

pub type AseResult<T> = Result<T, AseError>;
