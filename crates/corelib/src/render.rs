//! Renderable sink: the consumer of finished meshes.

use crate::{Vec3, material::MaterialHandle};

/// One drawable triangle: a face normal plus three (position, uv) corners.
/// UVs keep the third component the format carries.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Primitive {
    pub normal: Vec3,
    pub positions: [Vec3; 3],
    pub uvs: [Vec3; 3],
}

/// Receives objects in file order: `begin_object`, any number of
/// `emit_face`, then `end_object`.
pub trait RenderableSink {
    fn begin_object(&mut self, material: MaterialHandle);
    fn emit_face(&mut self, primitive: &Primitive);
    fn end_object(&mut self);
}
