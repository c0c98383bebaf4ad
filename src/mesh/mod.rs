//! Object meshes: locating model files, decoding them, and caching the
//! result per object/part id.

mod cache;
mod obj;
mod ply;

pub use cache::MeshCache;
pub use obj::ObjDecoder;
pub use ply::PlyDecoder;

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Triangle mesh geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<[f32; 3]>,
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

/// Turns a model file into a [`Mesh`].
pub trait MeshDecoder: Send + Sync {
    fn decode(&self, path: &Path) -> Result<Mesh>;
}

/// Picks [`ObjDecoder`] or [`PlyDecoder`] by file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelDecoder;

impl MeshDecoder for ModelDecoder {
    fn decode(&self, path: &Path) -> Result<Mesh> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("obj") => ObjDecoder.decode(path),
            Some("ply") => PlyDecoder.decode(path),
            _ => Err(Error::UnsupportedMesh(path.to_path_buf())),
        }
    }
}

/// The single model file inside `dir` whose extension is one of
/// `extensions`.
///
/// # Errors
/// Returns [`Error::MeshSource`] when there are zero or several candidates,
/// and an IO error when `dir` cannot be listed.
pub fn locate_model(dir: &Path, extensions: &[String]) -> Result<PathBuf> {
    let entries = fs::read_dir(dir).map_err(|source| Error::File {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut candidates = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)));
        if matches {
            candidates.push(path);
        }
    }
    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        found => Err(Error::MeshSource {
            dir: dir.to_path_buf(),
            found,
        }),
    }
}

/// Where and how object models are read from disk.
pub struct MeshSource {
    roots: Vec<PathBuf>,
    extensions: Vec<String>,
    decoder: Box<dyn MeshDecoder>,
}

impl MeshSource {
    /// `roots` are searched in order; each holds one directory per
    /// object/part id.
    pub fn new(roots: Vec<PathBuf>, extensions: Vec<String>, decoder: Box<dyn MeshDecoder>) -> Self {
        Self {
            roots,
            extensions,
            decoder,
        }
    }

    pub fn set_decoder(&mut self, decoder: Box<dyn MeshDecoder>) {
        self.decoder = decoder;
    }

    /// Find and decode the model for `obj_id`. A root is skipped only when
    /// it has no directory for `obj_id`.
    pub fn load(&self, obj_id: &str) -> Result<Mesh> {
        for root in &self.roots {
            let dir = root.join(obj_id);
            if dir.is_dir() {
                let path = locate_model(&dir, &self.extensions)?;
                return self.decoder.decode(&path);
            }
        }
        Err(Error::ObjectNotFound(obj_id.to_string()))
    }
}

impl std::fmt::Debug for MeshSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshSource")
            .field("roots", &self.roots)
            .field("extensions", &self.extensions)
            .finish()
    }
}
