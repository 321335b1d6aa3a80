//! Recorded draw list: the precompiled, replayable output of the mesh builder.

use bytemuck::{Pod, Zeroable};
use corelib::{
    material::MaterialHandle,
    render::{Primitive, RenderableSink},
};

/// Flattened vertex with position/normal/uv, ready for a vertex buffer.
/// The normal is the face normal of the primitive it came from.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 3],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 3]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

/// All primitives of one object, drawn with one material.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawBatch {
    pub material: MaterialHandle,
    pub primitives: Vec<Primitive>,
}

/// Sink that records what it receives and can replay it any number of times.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DrawList {
    batches: Vec<DrawBatch>,
    recording: bool,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> &[DrawBatch] {
        &self.batches
    }

    pub fn primitive_count(&self) -> usize {
        self.batches.iter().map(|b| b.primitives.len()).sum()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Feed the recorded sequence to `sink`.
    pub fn replay(&self, sink: &mut dyn RenderableSink) {
        for batch in &self.batches {
            sink.begin_object(batch.material);
            for primitive in &batch.primitives {
                sink.emit_face(primitive);
            }
            sink.end_object();
        }
    }

    /// Three vertices per primitive, batch by batch.
    pub fn vertices(&self) -> Vec<MeshVertex> {
        let mut out = Vec::with_capacity(self.primitive_count() * 3);
        for primitive in self.batches.iter().flat_map(|b| &b.primitives) {
            let normal = primitive.normal.to_array();
            for (position, uv) in primitive.positions.iter().zip(&primitive.uvs) {
                out.push(MeshVertex::new(position.to_array(), normal, uv.to_array()));
            }
        }
        out
    }
}

/// View vertices as raw bytes for upload.
pub fn vertex_bytes(vertices: &[MeshVertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

impl RenderableSink for DrawList {
    fn begin_object(&mut self, material: MaterialHandle) {
        self.batches.push(DrawBatch {
            material,
            primitives: Vec::new(),
        });
        self.recording = true;
    }

    fn emit_face(&mut self, primitive: &Primitive) {
        match self.batches.last_mut() {
            Some(batch) if self.recording => batch.primitives.push(*primitive),
            _ => log::warn!("Face emitted outside begin_object/end_object, dropped"),
        }
    }

    fn end_object(&mut self) {
        self.recording = false;
    }
}
