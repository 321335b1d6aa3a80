//! Local material indices -> registry handles.

use corelib::material::{MaterialDesc, MaterialRegistry};

use crate::error::{AseError, AseResult};

use super::model::{MaterialRef, Model};

impl Model {
    /// Register every material with `registry` and rewrite each object's
    /// local material reference to the returned handle.
    ///
    /// Runs once per model. All references are checked before the registry
    /// is touched, so a failure leaves both the model and the registry as
    /// they were.
    pub fn resolve_materials(&mut self, registry: &dyn MaterialRegistry) -> AseResult<()> {
        if self.resolved {
            return Err(AseError::DoubleResolution);
        }

        let material_count = self.materials.len();
        for object in &self.objects {
            match object.material_ref {
                MaterialRef::Local(local) if local < material_count => {}
                MaterialRef::Local(local) => {
                    return Err(AseError::UnresolvedReference {
                        object: object.name.clone(),
                        material_ref: local,
                        material_count,
                    });
                }
                MaterialRef::Global(_) => return Err(AseError::DoubleResolution),
            }
        }

        for material in self.materials.materials.iter_mut() {
            let handle = registry.register(&MaterialDesc {
                texture: &material.diffuse_map.bitmap,
                ambient: material.ambient,
                diffuse: material.diffuse,
                specular: material.specular,
                shine: material.shine,
                shine_strength: material.shine_strength,
                transparency: material.transparency,
            });
            material.handle = Some(handle);
        }

        for object in self.objects.iter_mut() {
            if let MaterialRef::Local(local) = object.material_ref {
                if let Some(handle) = self.materials.materials[local].handle {
                    object.material_ref = MaterialRef::Global(handle);
                }
            }
        }

        self.resolved = true;
        log::debug!(
            "Resolved {} materials for {} objects",
            material_count,
            self.objects.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use corelib::material::MaterialLibrary;

    use crate::ase::parse_str;

    use super::*;

    const TWO_MATERIALS: &str = r#"
        *MATERIAL_LIST {
            *MATERIAL_COUNT 2
            *MATERIAL 0 { *MATERIAL_NAME a *MAP_DIFFUSE { *BITMAP a.tga } }
            *MATERIAL 1 { *MATERIAL_NAME b *MAP_DIFFUSE { *BITMAP b.tga } }
        }
        *GEOMOBJECT { *NODE_NAME first *MATERIAL_REF 1 }
        *GEOMOBJECT { *NODE_NAME second *MATERIAL_REF 0 }
    "#;

    #[test]
    fn objects_get_registry_handles() {
        let registry = MaterialLibrary::new();
        let mut model = parse_str(TWO_MATERIALS).expect("parse");
        model.resolve_materials(&registry).expect("resolve");

        let a = model.materials.get(0).unwrap().handle.unwrap();
        let b = model.materials.get(1).unwrap().handle.unwrap();
        assert_eq!(model.objects[0].material_ref, MaterialRef::Global(b));
        assert_eq!(model.objects[1].material_ref, MaterialRef::Global(a));
        assert_eq!(registry.get(a).unwrap().texture, "a.tga");
        assert_eq!(registry.get(b).unwrap().texture, "b.tga");
        assert!(model.is_resolved());
    }

    #[test]
    fn resolving_twice_is_rejected() {
        let registry = MaterialLibrary::new();
        let mut model = parse_str(TWO_MATERIALS).expect("parse");
        model.resolve_materials(&registry).expect("resolve");
        let before: Vec<_> = model.objects.iter().map(|o| o.material_ref).collect();

        assert!(matches!(
            model.resolve_materials(&registry),
            Err(AseError::DoubleResolution)
        ));
        let after: Vec<_> = model.objects.iter().map(|o| o.material_ref).collect();
        assert_eq!(before, after);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn out_of_range_reference_fails_at_resolution() {
        let src = r#"
            *MATERIAL_LIST { *MATERIAL_COUNT 1 *MATERIAL 0 { *MATERIAL_NAME only } }
            *GEOMOBJECT { *NODE_NAME broken *MATERIAL_REF 1 }
        "#;
        let registry = MaterialLibrary::new();
        let mut model = parse_str(src).expect("parse succeeds");

        let err = model.resolve_materials(&registry).unwrap_err();
        assert!(matches!(
            err,
            AseError::UnresolvedReference {
                material_ref: 1,
                material_count: 1,
                ref object,
            } if object == "broken"
        ));
        assert!(registry.is_empty());
        assert!(!model.is_resolved());
    }

    #[test]
    fn object_without_material_ref_uses_material_zero() {
        let registry = MaterialLibrary::new();
        let src = r#"
            *MATERIAL_LIST { *MATERIAL_COUNT 1 *MATERIAL 0 { *MATERIAL_NAME only } }
            *GEOMOBJECT { *NODE_NAME bare }
        "#;
        let mut model = parse_str(src).expect("parse");
        assert_eq!(model.objects[0].material_ref, MaterialRef::Local(0));
        model.resolve_materials(&registry).expect("resolve");
        let only = model.materials.get(0).unwrap().handle.unwrap();
        assert_eq!(model.objects[0].material_ref, MaterialRef::Global(only));

        // Geometry with no material list has nothing to bind to.
        let mut bare = parse_str("*GEOMOBJECT { *NODE_NAME bare }").expect("parse");
        let err = bare.resolve_materials(&registry).unwrap_err();
        assert!(matches!(
            err,
            AseError::UnresolvedReference {
                material_ref: 0,
                material_count: 0,
                ..
            }
        ));
        assert_eq!(registry.len(), 1);
    }
}
