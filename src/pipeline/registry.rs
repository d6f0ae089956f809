// pipeline/registry.rs — one memoized computation node per (stage, layer)
//
// Recomputation is keyed by version stamps, not structural comparison: the
// external store bumps a value's `rev` whenever it logically changes, and a
// node's input stamp hashes those revision numbers. A matching stamp means
// the previous output is returned without rerunning the stage body.
//
// Registry entries are never evicted — they are bounded by layer count,
// which is assumed small.

use crate::geometry::Vertex;
use rustc_hash::{FxHashMap, FxHasher};
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use tracing::trace;

/// The three chained per-layer stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Raw,
    Transformed,
    Computed,
}

/// Accumulates the revision stamps a stage declares as inputs and hashes
/// them into a single `u64`. Only identity stamps and structural facts
/// (order position, ids) go in — never vertex data.
pub struct InputStamp {
    hasher: FxHasher,
}

impl InputStamp {
    pub fn new(kind: StageKind) -> Self {
        let mut hasher = FxHasher::default();
        kind.hash(&mut hasher);
        Self { hasher }
    }

    pub fn rev(&mut self, rev: u64) -> &mut Self {
        rev.hash(&mut self.hasher);
        self
    }

    pub fn flag(&mut self, flag: bool) -> &mut Self {
        flag.hash(&mut self.hasher);
        self
    }

    pub fn text(&mut self, s: &str) -> &mut Self {
        s.hash(&mut self.hasher);
        self
    }

    pub fn finish(&self) -> u64 {
        self.hasher.finish()
    }
}

struct Node {
    stamp: u64,
    output: Rc<Vec<Vertex>>,
}

/// Holds exactly one computation node per `(stage, layer id)` pair for the
/// lifetime of the process, so every consumer of a per-layer stage shares
/// one memoized result. One map per stage keeps lookups borrowed: a memo
/// hit costs a hash probe, no allocation.
#[derive(Default)]
pub struct Registry {
    nodes: [FxHashMap<String, Node>; 3],
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The node's previous output, if its input stamp is unchanged.
    pub fn lookup(&self, kind: StageKind, id: &str, stamp: u64) -> Option<Rc<Vec<Vertex>>> {
        let node = self.nodes[kind as usize].get(id)?;
        if node.stamp == stamp {
            trace!(stage = ?kind, layer = id, "memoized output reused");
            Some(Rc::clone(&node.output))
        } else {
            None
        }
    }

    /// Record a freshly computed output against its input stamp. Reuses the
    /// node slot for the pair, so at most one node exists per pair.
    pub fn store(
        &mut self,
        kind: StageKind,
        id: &str,
        stamp: u64,
        output: Rc<Vec<Vertex>>,
    ) -> Rc<Vec<Vertex>> {
        self.nodes[kind as usize].insert(
            id.to_string(),
            Node {
                stamp,
                output: Rc::clone(&output),
            },
        );
        output
    }

    /// Number of nodes that exist across all stages.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(FxHashMap::len).sum()
    }

    pub fn clear(&mut self) {
        for map in &mut self.nodes {
            map.clear();
        }
    }
}
