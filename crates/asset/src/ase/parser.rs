//! Keyword dispatch and section parsers.
//!
//! The grammar is a superset: only keywords that matter for drawing are
//! handled, everything else is skipped one token at a time.

use crate::error::{AseError, AseResult};

use super::{
    cursor::Cursor,
    model::{
        DiffuseMap, Face, GeomObject, Material, MaterialRef, MaterialTable, Mesh, Model,
        TextureFace, TextureVertex, Vertex,
    },
};

const MESH_MTLID: &str = "*MESH_MTLID";
const BLOCK_OPEN: &str = "{";
const BLOCK_CLOSE: &str = "}";

// Fewest tokens one entry can take, used to bound declared counts.
// `*MATERIAL n`
const MATERIAL_TOKENS: usize = 2;
// `*MESH_VERTEX id x y z`, likewise `*MESH_TVERT` and `*MESH_TFACE`
const VERTEX_TOKENS: usize = 5;
const TVERTEX_TOKENS: usize = 5;
const TFACE_TOKENS: usize = 5;
// `*MESH_FACE id: A: a B: b C: c AB: e BC: e CA: e *MESH_SMOOTHING *MESH_MTLID m`
const FACE_TOKENS: usize = 17;

/// Node kinds that are not geometry. Their `*NODE_NAME` must not rename the
/// previous geometry object.
const NON_GEOMETRY_NODES: [&str; 5] = [
    "*HELPEROBJECT",
    "*SHAPEOBJECT",
    "*CAMERAOBJECT",
    "*LIGHTOBJECT",
    "*GROUP",
];

/// Parser state threaded through the dispatch loop.
#[derive(Default)]
struct ParseState {
    model: Model,
    current_material: Option<usize>,
    current_object: Option<usize>,
    material_blocks: usize,
    skipped: usize,
}

/// Parse a token stream into an unresolved [`Model`].
pub fn parse_tokens(cursor: &mut Cursor<'_>) -> AseResult<Model> {
    let mut state = ParseState::default();

    while let Some(token) = cursor.peek() {
        let position = cursor.position();
        cursor.advance(1, "keyword")?;
        state.dispatch(token, position, cursor)?;
    }

    state.finish()
}

impl ParseState {
    fn dispatch(
        &mut self,
        keyword: &str,
        position: usize,
        cursor: &mut Cursor<'_>,
    ) -> AseResult<()> {
        match keyword {
            "*MATERIAL_COUNT" => {
                let count = declared_count(cursor, MATERIAL_TOKENS, "material list")?;
                if self.material_blocks > 0 {
                    log::warn!(
                        "'*MATERIAL_COUNT' at token {position} after {} material blocks",
                        self.material_blocks
                    );
                }
                self.model.materials = MaterialTable::with_count(count);
                self.current_material = None;
                self.material_blocks = 0;
            }
            "*MATERIAL" => self.begin_material(position, cursor)?,

            "*MATERIAL_NAME" => {
                self.material(keyword, position)?.name = cursor.string("material name")?
            }
            "*MATERIAL_CLASS" => {
                self.material(keyword, position)?.class = cursor.string("material class")?
            }
            "*MATERIAL_AMBIENT" => {
                self.material(keyword, position)?.ambient = cursor.vec3("ambient colour")?
            }
            "*MATERIAL_DIFFUSE" => {
                self.material(keyword, position)?.diffuse = cursor.vec3("diffuse colour")?
            }
            "*MATERIAL_SPECULAR" => {
                self.material(keyword, position)?.specular = cursor.vec3("specular colour")?
            }
            "*MATERIAL_SHINE" => self.material(keyword, position)?.shine = cursor.float("shine")?,
            "*MATERIAL_SHINESTRENGTH" => {
                self.material(keyword, position)?.shine_strength = cursor.float("shine strength")?
            }
            "*MATERIAL_TRANSPARENCY" => {
                self.material(keyword, position)?.transparency = cursor.float("transparency")?
            }
            "*MATERIAL_WIRESIZE" => {
                self.material(keyword, position)?.wire_size = cursor.float("wire size")?
            }
            "*MATERIAL_SHADING" => {
                self.material(keyword, position)?.shading = cursor.string("shading")?
            }
            "*MATERIAL_XP_FALLOFF" => {
                self.material(keyword, position)?.xp_falloff = cursor.float("xp falloff")?
            }
            "*MATERIAL_SELFILLUM" => {
                self.material(keyword, position)?.self_illum = cursor.float("self illumination")?
            }
            "*MATERIAL_FALLOFF" => {
                self.material(keyword, position)?.falloff = cursor.string("falloff")?
            }
            "*MATERIAL_XP_TYPE" => {
                self.material(keyword, position)?.xp_type = cursor.string("xp type")?
            }

            "*MAP_NAME" => self.diffuse_map(keyword, position)?.name = cursor.string("map name")?,
            "*MAP_CLASS" => {
                self.diffuse_map(keyword, position)?.class = cursor.string("map class")?
            }
            "*MAP_SUBNO" => {
                self.diffuse_map(keyword, position)?.sub_no = cursor.index("map sub number")?
            }
            "*MAP_AMOUNT" => {
                self.diffuse_map(keyword, position)?.amount = cursor.float("map amount")?
            }
            "*BITMAP" => {
                self.diffuse_map(keyword, position)?.bitmap = cursor.string("bitmap path")?
            }
            "*MAP_TYPE" => {
                self.diffuse_map(keyword, position)?.map_type = cursor.string("map type")?
            }
            "*UVW_U_OFFSET" => {
                self.diffuse_map(keyword, position)?.u_offset = cursor.float("u offset")?
            }
            "*UVW_V_OFFSET" => {
                self.diffuse_map(keyword, position)?.v_offset = cursor.float("v offset")?
            }
            "*UVW_U_TILING" => {
                self.diffuse_map(keyword, position)?.u_tiling = cursor.float("u tiling")?
            }
            "*UVW_V_TILING" => {
                self.diffuse_map(keyword, position)?.v_tiling = cursor.float("v tiling")?
            }
            "*UVW_ANGLE" => self.diffuse_map(keyword, position)?.angle = cursor.float("uvw angle")?,
            "*UVW_BLUR" => self.diffuse_map(keyword, position)?.blur = cursor.float("uvw blur")?,
            "*UVW_BLUR_OFFSET" => {
                self.diffuse_map(keyword, position)?.blur_offset = cursor.float("uvw blur offset")?
            }
            // 3ds Max writes NOUSE; accept the corrected spelling too.
            "*UVW_NOUSE_AMT" | "*UVW_NOISE_AMT" => {
                self.diffuse_map(keyword, position)?.noise_amount = cursor.float("noise amount")?
            }
            "*UVW_NOISE_SIZE" => {
                self.diffuse_map(keyword, position)?.noise_size = cursor.float("noise size")?
            }
            "*UVW_NOISE_LEVEL" => {
                self.diffuse_map(keyword, position)?.noise_level = cursor.float("noise level")?
            }
            "*UVW_NOISE_PHASE" => {
                self.diffuse_map(keyword, position)?.noise_phase = cursor.float("noise phase")?
            }
            "*BITMAP_FILTER" => {
                self.diffuse_map(keyword, position)?.bitmap_filter = cursor.string("bitmap filter")?
            }

            "*GEOMOBJECT" => {
                self.model.objects.push(GeomObject::default());
                self.current_object = Some(self.model.objects.len() - 1);
            }
            node if NON_GEOMETRY_NODES.contains(&node) => self.current_object = None,
            "*NODE_NAME" => {
                let name = cursor.string("node name")?;
                match self.current_object {
                    Some(i) => self.model.objects[i].name = name,
                    None => log::trace!("Ignoring node name {name} outside a geometry object"),
                }
            }
            "*MATERIAL_REF" => {
                let local = cursor.index("material reference")?;
                match self.current_object {
                    Some(i) => self.model.objects[i].material_ref = MaterialRef::Local(local),
                    None => log::trace!("Ignoring material reference outside a geometry object"),
                }
            }

            "*MESH_NUMVERTEX" => {
                let mesh = self.mesh(keyword, position)?;
                let n = declared_count(cursor, VERTEX_TOKENS, "vertex list")?;
                mesh.vertices = (0..n)
                    .map(|id| Vertex {
                        id,
                        ..Default::default()
                    })
                    .collect();
            }
            "*MESH_NUMFACES" => {
                let mesh = self.mesh(keyword, position)?;
                let n = declared_count(cursor, FACE_TOKENS, "face list")?;
                mesh.faces = (0..n)
                    .map(|id| Face {
                        id,
                        ..Default::default()
                    })
                    .collect();
            }
            "*MESH_NUMTVERTEX" => {
                let mesh = self.mesh(keyword, position)?;
                let n = declared_count(cursor, TVERTEX_TOKENS, "texture vertex list")?;
                mesh.tvertices = (0..n)
                    .map(|id| TextureVertex {
                        id,
                        ..Default::default()
                    })
                    .collect();
            }
            "*MESH_NUMTVFACES" => {
                let mesh = self.mesh(keyword, position)?;
                let n = declared_count(cursor, TFACE_TOKENS, "texture face list")?;
                mesh.tfaces = (0..n)
                    .map(|id| TextureFace {
                        id,
                        ..Default::default()
                    })
                    .collect();
            }

            "*MESH_VERTEX_LIST" => parse_vertex_list(self.mesh(keyword, position)?, cursor)?,
            "*MESH_FACE_LIST" => parse_face_list(self.mesh(keyword, position)?, cursor)?,
            "*MESH_TVERTLIST" => parse_tvertex_list(self.mesh(keyword, position)?, cursor)?,
            "*MESH_TFACELIST" => parse_tface_list(self.mesh(keyword, position)?, cursor)?,

            "*MESH_FACENORMAL" => {
                let index_at = cursor.position();
                let index = cursor.index("face normal index")?;
                let normal = cursor.vec3("face normal")?;
                let faces = &mut self.mesh(keyword, position)?.faces;
                let len = faces.len();
                let face = faces.get_mut(index).ok_or(AseError::IndexOutOfRange {
                    position: index_at,
                    what: "face normal",
                    index,
                    len,
                })?;
                face.normal = normal;
            }
            "*MESH_VERTEXNORMAL" => {
                let index_at = cursor.position();
                let index = cursor.index("vertex normal index")?;
                let normal = cursor.vec3("vertex normal")?;
                let vertices = &mut self.mesh(keyword, position)?.vertices;
                let len = vertices.len();
                let vertex = vertices.get_mut(index).ok_or(AseError::IndexOutOfRange {
                    position: index_at,
                    what: "vertex normal",
                    index,
                    len,
                })?;
                vertex.normal = normal;
            }

            _ => self.skipped += 1,
        }
        Ok(())
    }

    /// `*MATERIAL n`: make local material `n` current.
    fn begin_material(&mut self, position: usize, cursor: &mut Cursor<'_>) -> AseResult<()> {
        let index = cursor.index("material index")?;
        let len = self.model.materials.len();
        if index >= len {
            return Err(AseError::IndexOutOfRange {
                position: position + 1,
                what: "material",
                index,
                len,
            });
        }
        if index != self.material_blocks {
            log::warn!(
                "Material block {index} at token {position} out of order (expected {})",
                self.material_blocks
            );
        }
        self.material_blocks += 1;
        self.current_material = Some(index);
        Ok(())
    }

    fn material(&mut self, keyword: &str, position: usize) -> AseResult<&mut Material> {
        match self.current_material {
            Some(i) => Ok(&mut self.model.materials.materials[i]),
            None => Err(missing_context(keyword, position, "*MATERIAL block")),
        }
    }

    fn diffuse_map(&mut self, keyword: &str, position: usize) -> AseResult<&mut DiffuseMap> {
        self.material(keyword, position).map(|m| &mut m.diffuse_map)
    }

    fn object(&mut self, keyword: &str, position: usize) -> AseResult<&mut GeomObject> {
        match self.current_object {
            Some(i) => Ok(&mut self.model.objects[i]),
            None => Err(missing_context(keyword, position, "*GEOMOBJECT")),
        }
    }

    fn mesh(&mut self, keyword: &str, position: usize) -> AseResult<&mut Mesh> {
        self.object(keyword, position).map(|o| &mut o.mesh)
    }

    fn finish(self) -> AseResult<Model> {
        let materials = &self.model.materials;
        if self.material_blocks != materials.declared {
            log::warn!(
                "'*MATERIAL_COUNT' declares {} materials but {} blocks were found",
                materials.declared,
                self.material_blocks
            );
        }
        log::trace!("Skipped {} unrecognised tokens", self.skipped);
        Ok(self.model)
    }
}

fn missing_context(keyword: &str, position: usize, needs: &'static str) -> AseError {
    AseError::MissingContext {
        position,
        keyword: keyword.to_owned(),
        needs,
    }
}

/// Read a `*MESH_NUMxxx` or `*MATERIAL_COUNT` value. A count the rest of
/// the file cannot hold is a truncation, caught before anything is allocated.
fn declared_count(
    cursor: &mut Cursor<'_>,
    entry_tokens: usize,
    context: &'static str,
) -> AseResult<usize> {
    let position = cursor.position();
    let count = cursor.index(context)?;
    if count > cursor.remaining() / entry_tokens {
        return Err(AseError::TruncatedStream { position, context });
    }
    Ok(count)
}

/// Open a list block: the list keyword has been consumed, `{` must follow.
fn open_block(cursor: &mut Cursor<'_>) -> AseResult<()> {
    cursor.expect(BLOCK_OPEN)
}

/// Consume the per-item keyword of list entry. A closing brace or another
/// keyword here means the block holds fewer entries than declared.
fn begin_item(cursor: &mut Cursor<'_>, item: &'static str, context: &'static str) -> AseResult<()> {
    let position = cursor.position();
    match cursor.peek() {
        Some(token) if token == item => cursor.advance(1, context),
        Some(token) if token == BLOCK_CLOSE || token.starts_with('*') => {
            Err(AseError::TruncatedStream { position, context })
        }
        Some(token) => Err(AseError::UnexpectedToken {
            position,
            expected: item,
            found: token.to_owned(),
        }),
        None => Err(AseError::TruncatedStream { position, context }),
    }
}

fn parse_vertex_list(mesh: &mut Mesh, cursor: &mut Cursor<'_>) -> AseResult<()> {
    open_block(cursor)?;
    for vertex in mesh.vertices.iter_mut() {
        begin_item(cursor, "*MESH_VERTEX", "vertex list")?;
        vertex.id = cursor.index("vertex id")?;
        vertex.position = cursor.vec3("vertex position")?;
    }
    Ok(())
}

fn parse_tvertex_list(mesh: &mut Mesh, cursor: &mut Cursor<'_>) -> AseResult<()> {
    open_block(cursor)?;
    for tvertex in mesh.tvertices.iter_mut() {
        begin_item(cursor, "*MESH_TVERT", "texture vertex list")?;
        tvertex.id = cursor.index("texture vertex id")?;
        tvertex.coords = cursor.vec3("texture coordinates")?;
    }
    Ok(())
}

fn parse_tface_list(mesh: &mut Mesh, cursor: &mut Cursor<'_>) -> AseResult<()> {
    open_block(cursor)?;
    for tface in mesh.tfaces.iter_mut() {
        begin_item(cursor, "*MESH_TFACE", "texture face list")?;
        tface.id = cursor.index("texture face id")?;
        for slot in tface.tvertices.iter_mut() {
            *slot = cursor.index("texture face index")?;
        }
    }
    Ok(())
}

fn parse_face_list(mesh: &mut Mesh, cursor: &mut Cursor<'_>) -> AseResult<()> {
    open_block(cursor)?;
    for face in mesh.faces.iter_mut() {
        begin_item(cursor, "*MESH_FACE", "face list")?;
        parse_face(face, cursor)?;
    }
    Ok(())
}

/// `*MESH_FACE` has been consumed. Layout:
/// `0: A: 0 B: 1 C: 2 AB: 1 BC: 1 CA: 0 *MESH_SMOOTHING [g] *MESH_MTLID m`.
/// The normal is left alone; `*MESH_FACENORMAL` may have set it already.
fn parse_face(face: &mut Face, cursor: &mut Cursor<'_>) -> AseResult<()> {
    face.id = face_id(cursor)?;

    for (slot, label) in face.vertices.iter_mut().zip(["A:", "B:", "C:"]) {
        cursor.expect(label)?;
        *slot = cursor.index("face vertex index")?;
    }
    for (slot, label) in face.edges.iter_mut().zip(["AB:", "BC:", "CA:"]) {
        cursor.expect(label)?;
        *slot = cursor.index("face edge flag")? != 0;
    }

    cursor.expect("*MESH_SMOOTHING")?;
    face.smoothing_group = smoothing_group(cursor)?;

    cursor.expect(MESH_MTLID)?;
    face.material_id = cursor.index("face material id")?;
    Ok(())
}

/// Face ids are written with a trailing colon: `12:`.
fn face_id(cursor: &mut Cursor<'_>) -> AseResult<usize> {
    let position = cursor.position();
    let token = cursor.next_token("face id")?;
    token
        .strip_suffix(':')
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| AseError::UnexpectedToken {
            position,
            expected: "<face id>:",
            found: token.to_owned(),
        })
}

/// The smoothing group after `*MESH_SMOOTHING` is optional.
///
/// Lookahead: if the next token is already `*MESH_MTLID`, the face has no
/// smoothing group and nothing is consumed. Otherwise the token is the group.
/// Exporters may write a comma list (`1,3`); the first group is kept.
fn smoothing_group(cursor: &mut Cursor<'_>) -> AseResult<Option<u32>> {
    let lookahead = cursor.peek();
    if lookahead == Some(MESH_MTLID) {
        return Ok(None);
    }

    let position = cursor.position();
    let token = cursor.next_token("smoothing group")?;
    token
        .split(',')
        .next()
        .and_then(|group| group.parse().ok())
        .map(Some)
        .ok_or_else(|| AseError::InvalidNumber {
            position,
            token: token.to_owned(),
            context: "smoothing group",
        })
}
