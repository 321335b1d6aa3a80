//! Loaded models addressed by handle: the `load` / `draw` pair hosts use.

use std::{path::Path, sync::Arc};

use corelib::{material::MaterialRegistry, render::RenderableSink};
use parking_lot::RwLock;

use crate::{
    ase::{self, Model},
    error::{AseError, AseResult},
};

/// Handle of a model in a [`ModelLibrary`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModelHandle(u32);

/// Append-only store of compiled models. Loading happens outside the lock,
/// so independent files may be loaded in parallel.
#[derive(Default)]
pub struct ModelLibrary {
    models: RwLock<Vec<Arc<Model>>>,
}

impl ModelLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.models.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.read().is_empty()
    }

    /// Load an ASE file. A failed load leaves the library unchanged.
    pub fn load(
        &self,
        path: impl AsRef<Path>,
        registry: &dyn MaterialRegistry,
    ) -> AseResult<ModelHandle> {
        let model = ase::load_model(path, registry)?;
        Ok(self.insert(model))
    }

    /// Add an already compiled model.
    pub fn insert(&self, model: Model) -> ModelHandle {
        let mut models = self.models.write();
        let handle = ModelHandle(models.len() as u32);
        models.push(Arc::new(model));
        handle
    }

    pub fn get(&self, handle: ModelHandle) -> AseResult<Arc<Model>> {
        self.models
            .read()
            .get(handle.0 as usize)
            .cloned()
            .ok_or(AseError::UnknownModel(handle))
    }

    /// Replay a model's draw list into `sink`.
    pub fn draw(&self, handle: ModelHandle, sink: &mut dyn RenderableSink) -> AseResult<()> {
        self.get(handle)?.draw(sink)
    }
}
