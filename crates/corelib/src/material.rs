//! Material registry: turns a material description into a process-wide handle.

use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::{CoreError, CoreResult, Vec3};

/// Opaque, registry-issued material identifier. Comparable for equality only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialHandle(u32);

/// Everything a registry needs to know to create a material.
/// `texture` is the bitmap path exactly as authored in the source file.
#[derive(Clone, Copy, Debug)]
pub struct MaterialDesc<'a> {
    pub texture: &'a str,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shine: f32,
    pub shine_strength: f32,
    pub transparency: f32,
}

/// Consumer-side view of a material table.
///
/// Implementations must serialize registration internally: two loaders may
/// register concurrently and must never receive colliding handles.
pub trait MaterialRegistry {
    fn register(&self, desc: &MaterialDesc<'_>) -> MaterialHandle;
}

/// A registered material, owned by the library.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialEntry {
    pub texture: String,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shine: f32,
    pub shine_strength: f32,
    pub transparency: f32,
}

impl From<&MaterialDesc<'_>> for MaterialEntry {
    fn from(desc: &MaterialDesc<'_>) -> Self {
        Self {
            texture: desc.texture.to_owned(),
            ambient: desc.ambient,
            diffuse: desc.diffuse,
            specular: desc.specular,
            shine: desc.shine,
            shine_strength: desc.shine_strength,
            transparency: desc.transparency,
        }
    }
}

/// Append-only material table. Handles are dense indices in registration order.
#[derive(Default)]
pub struct MaterialLibrary {
    entries: Mutex<Vec<MaterialEntry>>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide library.
    pub fn global() -> &'static MaterialLibrary {
        static GLOBAL: OnceLock<MaterialLibrary> = OnceLock::new();
        GLOBAL.get_or_init(MaterialLibrary::new)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Snapshot of a registered material.
    pub fn get(&self, handle: MaterialHandle) -> CoreResult<MaterialEntry> {
        self.entries
            .lock()
            .get(handle.0 as usize)
            .cloned()
            .ok_or(CoreError::UnknownMaterial(handle))
    }
}

impl MaterialRegistry for MaterialLibrary {
    fn register(&self, desc: &MaterialDesc<'_>) -> MaterialHandle {
        let mut entries = self.entries.lock();
        let handle = MaterialHandle(entries.len() as u32);
        entries.push(MaterialEntry::from(desc));
        log::debug!("Registered material {:?} -> '{}'", handle, desc.texture);
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vec3;

    fn desc(texture: &str) -> MaterialDesc<'_> {
        MaterialDesc {
            texture,
            ambient: vec3(0.0, 0.0, 0.0),
            diffuse: vec3(150.0, 150.0, 150.0),
            specular: vec3(230.0, 230.0, 230.0),
            shine: 0.1,
            shine_strength: 0.0,
            transparency: 0.0,
        }
    }

    #[test]
    fn handles_are_distinct_and_ordered() {
        let lib = MaterialLibrary::new();
        let a = lib.register(&desc("a.tga"));
        let b = lib.register(&desc("b.tga"));
        assert_ne!(a, b);
        assert_eq!(lib.len(), 2);
        assert_eq!(lib.get(a).unwrap().texture, "a.tga");
        assert_eq!(lib.get(b).unwrap().diffuse, vec3(150.0, 150.0, 150.0));
    }

    #[test]
    fn unknown_handle_is_an_error() {
        let lib = MaterialLibrary::new();
        let other = MaterialLibrary::new();
        let handle = other.register(&desc("x.tga"));
        assert!(matches!(lib.get(handle), Err(CoreError::UnknownMaterial(h)) if h == handle));
    }

    #[test]
    fn concurrent_registration_never_collides() {
        let lib = MaterialLibrary::new();
        let shared = &lib;
        let handles: Vec<MaterialHandle> = std::thread::scope(|s| {
            let workers: Vec<_> = (0..4)
                .map(|_| {
                    s.spawn(move || {
                        (0..50)
                            .map(|_| shared.register(&desc("t.tga")))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            workers.into_iter().flat_map(|w| w.join().unwrap()).collect()
        });
        let unique: std::collections::HashSet<_> = handles.iter().copied().collect();
        assert_eq!(unique.len(), 200);
        assert_eq!(lib.len(), 200);
    }
}
