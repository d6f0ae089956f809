// pipeline/cache.rs — size-budgeted LRU cache for raw shape vertices
//
// Keyed by a hash of the canonical (shape, machine) snapshot. Values are
// stored behind `Rc` so hits return a cheap reference-count bump instead of
// cloning vertex lists that can run to tens of thousands of points.
//
// The budget is measured as the sum of stored vertex-list lengths, not
// entry count — lists vary wildly in size, so total vertices approximates
// memory cost far better.

use crate::error::PipelineError;
use crate::geometry::Vertex;
use crate::state::{Layer, Machine};
use lru::LruCache;
use rustc_hash::FxHasher;
use serde::Serialize;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use tracing::debug;

/// Default vertex budget: enough for a full table of dense layers.
pub const DEFAULT_VERTEX_BUDGET: usize = 250_000;

/// The canonical snapshot a cache key is built from. `machine` is included
/// only when the layer's geometry depends on it, so machine edits can never
/// invalidate machine-independent shapes. The `rev` stamps on both values
/// are `skip_serializing`, keeping identity out of content keys.
#[derive(Serialize)]
struct KeySnapshot<'a> {
    shape: &'a Layer,
    machine: Option<&'a Machine>,
}

/// Build the cache key for a layer's raw vertices.
///
/// Two logically equal snapshots serialize identically (struct fields are
/// emitted in declaration order and all maps are `BTreeMap`s), so equal
/// snapshots always collapse to the same key.
pub fn cache_key(layer: &Layer, machine: &Machine) -> Result<u64, PipelineError> {
    let snapshot = KeySnapshot {
        shape: layer,
        machine: layer.uses_machine.then_some(machine),
    };
    let canonical = serde_json::to_string(&snapshot)?;
    let mut hasher = FxHasher::default();
    canonical.hash(&mut hasher);
    Ok(hasher.finish())
}

/// Capacity-bounded store of previously generated raw vertex lists.
///
/// Only layers flagged `should_cache` consult it; cheap or volatile shapes
/// bypass it entirely.
pub struct VertexCache {
    entries: LruCache<u64, Rc<Vec<Vertex>>>,
    budget: usize,
    /// Sum of the lengths of all stored lists.
    stored: usize,
}

impl VertexCache {
    pub fn new(budget: usize) -> Self {
        Self {
            entries: LruCache::unbounded(),
            budget: budget.max(1),
            stored: 0,
        }
    }

    /// Fetch a previously stored list. Counts as a use for recency, and
    /// returns the stored value itself — hits never recompute or clone.
    pub fn get(&mut self, key: u64) -> Option<Rc<Vec<Vertex>>> {
        self.entries.get(&key).cloned()
    }

    /// Store a list, evicting least-recently-used entries until the budget
    /// fits. A single list larger than the whole budget is kept alone —
    /// evicting it too would make the cache useless for its key.
    pub fn put(&mut self, key: u64, value: Vec<Vertex>) -> Rc<Vec<Vertex>> {
        let value = Rc::new(value);
        if let Some(old) = self.entries.put(key, Rc::clone(&value)) {
            self.stored -= old.len();
        }
        self.stored += value.len();

        while self.stored > self.budget && self.entries.len() > 1 {
            match self.entries.pop_lru() {
                Some((evicted_key, evicted)) => {
                    self.stored -= evicted.len();
                    debug!(
                        key = evicted_key,
                        vertices = evicted.len(),
                        "evicted least-recently-used vertex list"
                    );
                }
                None => break,
            }
        }
        value
    }

    /// Number of cached lists.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total vertices currently stored.
    pub fn stored_vertices(&self) -> usize {
        self.stored
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.stored = 0;
    }
}
