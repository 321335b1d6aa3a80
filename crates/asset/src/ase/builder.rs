//! Mesh builder: turns a resolved model into drawable primitives.

use corelib::{
    Vec3,
    material::MaterialHandle,
    render::{Primitive, RenderableSink},
};

use crate::{
    draw_list::DrawList,
    error::{AseError, AseResult},
};

use super::model::{GeomObject, MaterialRef, Model};

impl Model {
    /// Emit every face of every object to `sink`, in file order.
    /// Objects without faces are not emitted at all.
    ///
    /// Every object is fully validated before the sink sees any of it.
    pub fn emit(&self, sink: &mut dyn RenderableSink) -> AseResult<()> {
        self.build_draw_list()?.replay(sink);
        Ok(())
    }

    /// Build the draw list and keep it on the model for replay.
    pub fn compile(&mut self) -> AseResult<()> {
        let list = self.build_draw_list()?;
        log::debug!(
            "Compiled draw list: {} batches, {} primitives",
            list.batches().len(),
            list.primitive_count()
        );
        self.draw_list = Some(list);
        Ok(())
    }

    /// Replay the compiled draw list.
    pub fn draw(&self, sink: &mut dyn RenderableSink) -> AseResult<()> {
        let list = self.draw_list.as_ref().ok_or(AseError::NotCompiled)?;
        list.replay(sink);
        Ok(())
    }

    fn build_draw_list(&self) -> AseResult<DrawList> {
        if !self.resolved {
            return Err(AseError::Unresolved);
        }

        let mut list = DrawList::new();
        for object in &self.objects {
            if object.mesh.faces.is_empty() {
                log::debug!("Object '{}' has no faces, nothing to emit", object.name);
                continue;
            }
            let material = object_material(object)?;
            let primitives = object_primitives(object)?;

            list.begin_object(material);
            for primitive in &primitives {
                list.emit_face(primitive);
            }
            list.end_object();
        }
        Ok(list)
    }
}

fn object_material(object: &GeomObject) -> AseResult<MaterialHandle> {
    match object.material_ref {
        MaterialRef::Global(handle) => Ok(handle),
        MaterialRef::Local(_) => Err(AseError::Unresolved),
    }
}

/// One primitive per face. UVs come from the texture face at the same
/// position as the face; objects without texture faces get zero UVs.
fn object_primitives(object: &GeomObject) -> AseResult<Vec<Primitive>> {
    let mesh = &object.mesh;
    if mesh.tfaces.is_empty() {
        log::warn!("Object '{}' has no texture faces, using zero UVs", object.name);
    } else if mesh.tfaces.len() != mesh.faces.len() {
        log::warn!(
            "Object '{}' has {} faces but {} texture faces",
            object.name,
            mesh.faces.len(),
            mesh.tfaces.len()
        );
    }

    let bad_index = |what: &'static str, index: usize, len: usize| AseError::BadMeshIndex {
        object: object.name.clone(),
        what,
        index,
        len,
    };

    mesh.faces
        .iter()
        .enumerate()
        .map(|(j, face)| {
            let mut positions = [Vec3::ZERO; 3];
            for (slot, &index) in positions.iter_mut().zip(&face.vertices) {
                *slot = mesh
                    .vertices
                    .get(index)
                    .map(|v| v.position)
                    .ok_or_else(|| bad_index("vertex list", index, mesh.vertices.len()))?;
            }

            let mut uvs = [Vec3::ZERO; 3];
            if let Some(tface) = mesh.tfaces.get(j) {
                for (slot, &index) in uvs.iter_mut().zip(&tface.tvertices) {
                    *slot = mesh.tvertices.get(index).map(|t| t.coords).ok_or_else(|| {
                        bad_index("texture vertex list", index, mesh.tvertices.len())
                    })?;
                }
            }

            Ok(Primitive {
                normal: face.normal,
                positions,
                uvs,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use corelib::{material::MaterialLibrary, vec3};

    use crate::ase::parse_str;

    use super::*;

    /// Records the calls it receives.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        primitives: Vec<Primitive>,
    }

    impl RenderableSink for Recorder {
        fn begin_object(&mut self, material: MaterialHandle) {
            self.events.push(format!("begin {material:?}"));
        }
        fn emit_face(&mut self, primitive: &Primitive) {
            self.events.push("face".into());
            self.primitives.push(*primitive);
        }
        fn end_object(&mut self) {
            self.events.push("end".into());
        }
    }

    const QUAD: &str = r#"
        *MATERIAL_LIST { *MATERIAL_COUNT 1 *MATERIAL 0 { *MAP_DIFFUSE { *BITMAP quad.tga } } }
        *GEOMOBJECT {
            *NODE_NAME quad
            *MESH {
                *MESH_NUMVERTEX 4
                *MESH_NUMFACES 2
                *MESH_VERTEX_LIST {
                    *MESH_VERTEX 0 0.0 0.0 0.0
                    *MESH_VERTEX 1 1.0 0.0 0.0
                    *MESH_VERTEX 2 1.0 1.0 0.0
                    *MESH_VERTEX 3 0.0 1.0 0.0
                }
                *MESH_FACE_LIST {
                    *MESH_FACE 0: A: 0 B: 1 C: 2 AB: 1 BC: 1 CA: 0 *MESH_SMOOTHING 1 *MESH_MTLID 0
                    *MESH_FACE 1: A: 0 B: 2 C: 3 AB: 0 BC: 1 CA: 1 *MESH_SMOOTHING 1 *MESH_MTLID 0
                }
                *MESH_NUMTVERTEX 4
                *MESH_TVERTLIST {
                    *MESH_TVERT 0 0.0 0.0 0.0
                    *MESH_TVERT 1 1.0 0.0 0.0
                    *MESH_TVERT 2 1.0 1.0 0.0
                    *MESH_TVERT 3 0.0 1.0 0.0
                }
                *MESH_NUMTVFACES 2
                *MESH_TFACELIST {
                    *MESH_TFACE 1 3 2 1
                    *MESH_TFACE 0 0 1 2
                }
                *MESH_NORMALS {
                    *MESH_FACENORMAL 0 0.0 0.0 1.0
                    *MESH_FACENORMAL 1 0.0 0.0 -1.0
                }
            }
            *MATERIAL_REF 0
        }
        *GEOMOBJECT { *NODE_NAME empty *MESH { *MESH_NUMVERTEX 0 *MESH_NUMFACES 0 } *MATERIAL_REF 0 }
    "#;

    fn resolved(src: &str) -> (Model, MaterialLibrary) {
        let registry = MaterialLibrary::new();
        let mut model = parse_str(src).expect("parse");
        model.resolve_materials(&registry).expect("resolve");
        (model, registry)
    }

    #[test]
    fn one_primitive_per_face_in_order() {
        let (model, _registry) = resolved(QUAD);
        let mut sink = Recorder::default();
        model.emit(&mut sink).expect("emit");

        let handle = model.materials.get(0).unwrap().handle.unwrap();
        assert_eq!(
            sink.events,
            [
                format!("begin {handle:?}"),
                "face".into(),
                "face".into(),
                "end".into()
            ]
        );
        assert_eq!(sink.primitives[0].normal, vec3(0.0, 0.0, 1.0));
        assert_eq!(sink.primitives[1].normal, vec3(0.0, 0.0, -1.0));
        assert_eq!(sink.primitives[1].positions[2], vec3(0.0, 1.0, 0.0));
    }

    #[test]
    fn uvs_follow_texture_face_position_not_id() {
        let (model, _registry) = resolved(QUAD);
        let mut sink = Recorder::default();
        model.emit(&mut sink).expect("emit");

        // tface at position 0 carries id 1 and indices 3 2 1.
        assert_eq!(
            sink.primitives[0].uvs,
            [vec3(0.0, 1.0, 0.0), vec3(1.0, 1.0, 0.0), vec3(1.0, 0.0, 0.0)]
        );
        assert_eq!(
            sink.primitives[1].uvs,
            [vec3(0.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0), vec3(1.0, 1.0, 0.0)]
        );
    }

    #[test]
    fn emit_requires_resolution() {
        let model = parse_str(QUAD).expect("parse");
        let mut sink = Recorder::default();
        assert!(matches!(model.emit(&mut sink), Err(AseError::Unresolved)));
        assert!(sink.events.is_empty());
    }

    #[test]
    fn dangling_vertex_index_reaches_no_sink() {
        let src = r#"
            *MATERIAL_COUNT 1 *MATERIAL 0
            *GEOMOBJECT
            *MESH_NUMVERTEX 2
            *MESH_NUMFACES 1
            *MESH_FACE_LIST {
                *MESH_FACE 0: A: 0 B: 1 C: 7 AB: 1 BC: 1 CA: 1 *MESH_SMOOTHING *MESH_MTLID 0
            }
        "#;
        let (model, _registry) = resolved(src);
        let mut sink = Recorder::default();
        let err = model.emit(&mut sink).unwrap_err();
        assert!(matches!(err, AseError::BadMeshIndex { index: 7, len: 2, .. }));
        assert!(sink.events.is_empty());
    }

    #[test]
    fn compiled_list_replays_identically() {
        let (mut model, _registry) = resolved(QUAD);
        let mut sink = Recorder::default();
        assert!(matches!(model.draw(&mut sink), Err(AseError::NotCompiled)));

        model.compile().expect("compile");
        model.draw(&mut sink).expect("first replay");
        let first = sink.events.clone();
        model.draw(&mut sink).expect("second replay");
        assert_eq!(sink.events.len(), first.len() * 2);
        assert_eq!(&sink.events[first.len()..], first.as_slice());
    }
}
