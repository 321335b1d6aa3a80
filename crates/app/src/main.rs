//! Demo host for the ASE loader.
//! Loads models, replays their draw lists into a counting sink, logs stats.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use asset::ModelLibrary;
use corelib::{
    material::{MaterialHandle, MaterialLibrary},
    render::{Primitive, RenderableSink},
};

fn parse_model_args() -> Vec<PathBuf> {
    // Accept: --model=<path> (repeatable) or bare paths
    let mut paths = Vec::new();
    for arg in std::env::args().skip(1) {
        if let Some(val) = arg.strip_prefix("--model=") {
            paths.push(PathBuf::from(val));
        } else if !arg.starts_with("--") {
            paths.push(PathBuf::from(arg));
        }
    }
    paths
}

fn parse_dump_arg() -> bool {
    std::env::args().any(|arg| arg == "--dump")
}

fn parse_replays_arg() -> usize {
    for arg in std::env::args() {
        if let Some(val) = arg.strip_prefix("--replays=") {
            match val.parse::<usize>() {
                Ok(n) => return n.max(1),
                Err(_) => log::warn!("Invalid --replays value '{}', using 1.", val),
            }
        }
    }
    1
}

/// Counts what a renderer would draw.
#[derive(Default)]
struct StatsSink {
    objects: usize,
    faces: usize,
    materials: Vec<MaterialHandle>,
}

impl RenderableSink for StatsSink {
    fn begin_object(&mut self, material: MaterialHandle) {
        self.objects += 1;
        if !self.materials.contains(&material) {
            self.materials.push(material);
        }
    }

    fn emit_face(&mut self, _primitive: &Primitive) {
        self.faces += 1;
    }

    fn end_object(&mut self) {}
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let paths = parse_model_args();
    let dump = parse_dump_arg();
    let replays = parse_replays_arg();
    if paths.is_empty() {
        bail!("Usage: app [--dump] [--replays=N] <model.ase>... | --model=<model.ase>");
    }

    let registry = MaterialLibrary::global();
    let library = ModelLibrary::new();

    for path in &paths {
        let handle = library
            .load(path, registry)
            .with_context(|| format!("Failed to load model {}", path.display()))?;
        let model = library.get(handle)?;

        if dump {
            log::info!("{}:\n{}", path.display(), model);
        }

        let mut stats = StatsSink::default();
        for _ in 0..replays {
            library.draw(handle, &mut stats)?;
        }
        log::info!(
            "{}: {} replays, {} objects, {} faces, {} materials, {} collision triangles",
            path.display(),
            replays,
            stats.objects,
            stats.faces,
            stats.materials.len(),
            model.collision_triangles().count()
        );
    }

    log::info!(
        "Done. {} models, {} registered materials.",
        library.len(),
        registry.len()
    );
    Ok(())
}
