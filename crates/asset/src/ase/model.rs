//! In-memory ASE model: materials, geometry objects and their meshes.

use std::fmt;

use corelib::{Vec3, material::MaterialHandle};

use crate::draw_list::DrawList;

/// Texture parameters of a material's diffuse map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DiffuseMap {
    pub name: String,
    pub class: String,
    pub sub_no: usize,
    pub amount: f32,
    pub bitmap: String,
    pub map_type: String,
    pub u_offset: f32,
    pub v_offset: f32,
    pub u_tiling: f32,
    pub v_tiling: f32,
    pub angle: f32,
    pub blur: f32,
    pub blur_offset: f32,
    pub noise_amount: f32,
    pub noise_size: f32,
    pub noise_level: f32,
    pub noise_phase: f32,
    pub bitmap_filter: String,
}

/// One `*MATERIAL` block. Colours are stored exactly as authored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
    pub name: String,
    pub class: String,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shine: f32,
    pub shine_strength: f32,
    pub transparency: f32,
    pub wire_size: f32,
    pub shading: String,
    pub xp_falloff: f32,
    pub self_illum: f32,
    pub falloff: String,
    pub xp_type: String,
    pub diffuse_map: DiffuseMap,
    /// Registry handle, set once materials are resolved.
    pub handle: Option<MaterialHandle>,
}

/// Materials of one file, indexed by their local (file) index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialTable {
    /// Value of `*MATERIAL_COUNT`.
    pub declared: usize,
    pub materials: Vec<Material>,
}

impl MaterialTable {
    pub fn with_count(count: usize) -> Self {
        Self {
            declared: count,
            materials: vec![Material::default(); count],
        }
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn get(&self, local: usize) -> Option<&Material> {
        self.materials.get(local)
    }
}

/// A mesh vertex. `id` is the file-assigned vertex id.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
    pub id: usize,
    pub position: Vec3,
    pub normal: Vec3,
}

/// A triangle of the mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Face {
    pub id: usize,
    /// A, B, C vertex indices.
    pub vertices: [usize; 3],
    /// AB, BC, CA edge visibility.
    pub edges: [bool; 3],
    /// `None` when the face entry carries no smoothing group.
    pub smoothing_group: Option<u32>,
    pub material_id: usize,
    pub normal: Vec3,
}

/// Texture vertex. Three components, the third usually unused.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextureVertex {
    pub id: usize,
    pub coords: Vec3,
}

/// Texture face: a, b, c indices into the texture-vertex list.
/// Matches the face at the same position in the face list.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextureFace {
    pub id: usize,
    pub tvertices: [usize; 3],
}

/// Four independently sized lists, each allocated from its `*MESH_NUMxxx` count.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Face>,
    pub tvertices: Vec<TextureVertex>,
    pub tfaces: Vec<TextureFace>,
}

/// Material reference of an object: a file-local index until resolution,
/// a registry handle afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaterialRef {
    Local(usize),
    Global(MaterialHandle),
}

/// Objects without `*MATERIAL_REF` use local material 0.
impl Default for MaterialRef {
    fn default() -> Self {
        MaterialRef::Local(0)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeomObject {
    pub name: String,
    pub mesh: Mesh,
    pub material_ref: MaterialRef,
}

impl GeomObject {
    /// Positions of a face's three corners.
    pub fn triangle(&self, face: &Face) -> Option<[Vec3; 3]> {
        let [a, b, c] = face.vertices;
        let v = &self.mesh.vertices;
        Some([v.get(a)?.position, v.get(b)?.position, v.get(c)?.position])
    }
}

/// Parse result of one ASE file.
#[derive(Debug, Default)]
pub struct Model {
    pub objects: Vec<GeomObject>,
    pub materials: MaterialTable,
    pub(crate) resolved: bool,
    pub(crate) draw_list: Option<DrawList>,
}

impl Model {
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Precompiled draw list, present after [`Model::compile`].
    pub fn draw_list(&self) -> Option<&DrawList> {
        self.draw_list.as_ref()
    }

    pub fn face_count(&self) -> usize {
        self.objects.iter().map(|o| o.mesh.faces.len()).sum()
    }

    /// Every face as a triangle of positions, for collision geometry.
    /// Faces with dangling vertex indices are skipped.
    pub fn collision_triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.objects
            .iter()
            .flat_map(|o| o.mesh.faces.iter().filter_map(move |f| o.triangle(f)))
    }
}

impl fmt::Display for DiffuseMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "    map '{}' class={} sub_no={} amount={}",
            self.name, self.class, self.sub_no, self.amount
        )?;
        writeln!(
            f,
            "    bitmap={} type={} filter={}",
            self.bitmap, self.map_type, self.bitmap_filter
        )?;
        writeln!(
            f,
            "    uvw offset=({}, {}) tiling=({}, {}) angle={} blur={} blur_offset={}",
            self.u_offset,
            self.v_offset,
            self.u_tiling,
            self.v_tiling,
            self.angle,
            self.blur,
            self.blur_offset
        )?;
        writeln!(
            f,
            "    noise amount={} size={} level={} phase={}",
            self.noise_amount, self.noise_size, self.noise_level, self.noise_phase
        )
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  '{}' class={} handle={:?}", self.name, self.class, self.handle)?;
        writeln!(
            f,
            "    ambient={} diffuse={} specular={}",
            self.ambient, self.diffuse, self.specular
        )?;
        writeln!(
            f,
            "    shine={} strength={} transparency={} wire={} shading={}",
            self.shine, self.shine_strength, self.transparency, self.wire_size, self.shading
        )?;
        writeln!(
            f,
            "    xp_falloff={} self_illum={} falloff={} xp_type={}",
            self.xp_falloff, self.self_illum, self.falloff, self.xp_type
        )?;
        write!(f, "{}", self.diffuse_map)
    }
}

impl fmt::Display for GeomObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.mesh;
        writeln!(
            f,
            "  '{}' material={:?} vertices={} faces={} tvertices={} tfaces={}",
            self.name,
            self.material_ref,
            m.vertices.len(),
            m.faces.len(),
            m.tvertices.len(),
            m.tfaces.len()
        )?;
        for v in &m.vertices {
            writeln!(f, "    v{} {} n={}", v.id, v.position, v.normal)?;
        }
        for face in &m.faces {
            writeln!(
                f,
                "    f{} {:?} edges={:?} smoothing={:?} mtl={} n={}",
                face.id,
                face.vertices,
                face.edges,
                face.smoothing_group,
                face.material_id,
                face.normal
            )?;
        }
        for tv in &m.tvertices {
            writeln!(f, "    vt{} {}", tv.id, tv.coords)?;
        }
        for tf in &m.tfaces {
            writeln!(f, "    ft{} {:?}", tf.id, tf.tvertices)?;
        }
        Ok(())
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "materials: {} (declared {})",
            self.materials.len(),
            self.materials.declared
        )?;
        for (i, m) in self.materials.materials.iter().enumerate() {
            write!(f, "  [{i}]{m}")?;
        }
        writeln!(f, "objects: {}", self.objects.len())?;
        for o in &self.objects {
            write!(f, "{o}")?;
        }
        Ok(())
    }
}
