use std::collections::HashMap;
use std::sync::Arc;

use crate::mesh::Mesh;
use crate::{zlog_debug, zlog_trace, Result};

/// Loaded meshes keyed by object/part id.
///
/// Owned by one dataset index and passed by `&mut` into hydration. Entries
/// are never evicted; [`MeshCache::clear`] drops every entry and resets the
/// hit and miss counters.
#[derive(Debug, Default)]
pub struct MeshCache {
    entries: HashMap<String, Arc<Mesh>>,
    hits: u64,
    misses: u64,
}

impl MeshCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached mesh for `id`, loading it with `load` on a miss.
    /// A failed load caches nothing.
    pub fn get_or_load<F>(&mut self, id: &str, load: F) -> Result<Arc<Mesh>>
    where
        F: FnOnce() -> Result<Mesh>,
    {
        if let Some(mesh) = self.entries.get(id) {
            self.hits += 1;
            zlog_trace!("MeshCache hit id={}", id);
            return Ok(Arc::clone(mesh));
        }
        self.misses += 1;
        zlog_debug!("MeshCache miss id={}", id);
        let mesh = Arc::new(load()?);
        self.entries.insert(id.to_string(), Arc::clone(&mesh));
        Ok(mesh)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Mesh>> {
        self.entries.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}
