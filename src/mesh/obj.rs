use std::fs;
use std::path::Path;

use crate::mesh::{Mesh, MeshDecoder};
use crate::{Error, Result};

/// Decoder for Wavefront OBJ geometry.
///
/// Only vertex positions (`v`) and faces (`f`) are read; polygons are fan
/// triangulated and materials, normals and texture coordinates are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjDecoder;

impl ObjDecoder {
    pub fn parse(text: &str) -> std::result::Result<Mesh, String> {
        let mut mesh = Mesh::default();
        for (lineno, line) in text.lines().enumerate() {
            let mut tokens = line.split_whitespace();
            match tokens.next() {
                Some("v") => {
                    let coords = tokens
                        .take(3)
                        .map(|t| t.parse::<f32>())
                        .collect::<std::result::Result<Vec<_>, _>>()
                        .map_err(|e| format!("line {}: {e}", lineno + 1))?;
                    if coords.len() != 3 {
                        return Err(format!("line {}: vertex needs 3 coordinates", lineno + 1));
                    }
                    mesh.vertices.push([coords[0], coords[1], coords[2]]);
                }
                Some("f") => {
                    let count = mesh.vertices.len() as i64;
                    let indices = tokens
                        .map(|t| resolve_index(t, count))
                        .collect::<Option<Vec<u32>>>()
                        .ok_or_else(|| format!("line {}: bad face index", lineno + 1))?;
                    if indices.len() < 3 {
                        return Err(format!("line {}: face needs 3 vertices", lineno + 1));
                    }
                    for i in 1..indices.len() - 1 {
                        mesh.faces.push([indices[0], indices[i], indices[i + 1]]);
                    }
                }
                _ => {}
            }
        }
        Ok(mesh)
    }
}

/// OBJ indices are 1-based; negative values count back from the last vertex.
fn resolve_index(token: &str, vertex_count: i64) -> Option<u32> {
    let raw: i64 = token.split('/').next()?.parse().ok()?;
    let index = match raw {
        0 => return None,
        r if r > 0 => r - 1,
        r => vertex_count + r,
    };
    (0..vertex_count).contains(&index).then_some(index as u32)
}

impl MeshDecoder for ObjDecoder {
    fn decode(&self, path: &Path) -> Result<Mesh> {
        let is_obj = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("obj"));
        if !is_obj {
            return Err(Error::UnsupportedMesh(path.to_path_buf()));
        }
        let text = fs::read_to_string(path).map_err(|source| Error::File {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|message| Error::MeshDecode {
            path: path.to_path_buf(),
            message,
        })
    }
}
