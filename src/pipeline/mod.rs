// pipeline/mod.rs — the per-layer raw → transformed → computed chain
//
// Data flows strictly downward: raw → transformed → computed per layer,
// then aggregated across the visible order (see views.rs). Machine settings
// and layer state are the only external inputs; every output is a pure
// function of them.
//
// Evaluation is single-threaded and synchronous: every stage and cache
// access runs to completion before returning. `PipelineContext` is an
// explicit, injectable object — created once by the host and shared across
// all evaluations, never a global.

pub mod cache;
pub mod registry;
mod stitch;
mod views;

pub use views::PathStats;

use crate::error::PipelineError;
use crate::geometry::Vertex;
use crate::host::{Host, PathEnds};
use crate::state::{DrawingState, Layer};
use cache::{VertexCache, DEFAULT_VERTEX_BUDGET};
use registry::{InputStamp, Registry, StageKind};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{trace, warn};

/// Owns the long-lived memoization state: the computation registry and the
/// raw-vertex cache. Both are mutated only from the evaluating thread.
pub struct PipelineContext {
    registry: RefCell<Registry>,
    cache: RefCell<VertexCache>,
}

impl Default for PipelineContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineContext {
    pub fn new() -> Self {
        Self::with_budget(DEFAULT_VERTEX_BUDGET)
    }

    /// Create a context whose raw-vertex cache holds at most `budget`
    /// total vertices.
    pub fn with_budget(budget: usize) -> Self {
        Self {
            registry: RefCell::new(Registry::new()),
            cache: RefCell::new(VertexCache::new(budget)),
        }
    }

    /// Nodes currently held by the registry.
    pub fn node_count(&self) -> usize {
        self.registry.borrow().node_count()
    }

    /// Vertex lists currently held by the raw cache.
    pub fn cached_lists(&self) -> usize {
        self.cache.borrow().len()
    }

    // ── Stage 1: raw vertices ───────────────────────────────────────

    /// A layer's raw geometry, straight from the external generator (or
    /// the cache). Depends on the layer, plus the machine when the layer's
    /// geometry uses it.
    pub fn raw_vertices(
        &self,
        state: &DrawingState,
        host: &Host<'_>,
        id: &str,
    ) -> Result<Rc<Vec<Vertex>>, PipelineError> {
        let layer = state.layer(id)?;
        let stamp = raw_stamp(StageKind::Raw, state, layer);
        if let Some(hit) = self.registry.borrow().lookup(StageKind::Raw, id, stamp) {
            return Ok(hit);
        }
        let vertices = self.generate_raw(state, host, layer);
        Ok(self
            .registry
            .borrow_mut()
            .store(StageKind::Raw, id, stamp, vertices))
    }

    fn generate_raw(
        &self,
        state: &DrawingState,
        host: &Host<'_>,
        layer: &Layer,
    ) -> Rc<Vec<Vertex>> {
        let machine = layer.uses_machine.then_some(&state.machine);

        if layer.should_cache {
            match cache::cache_key(layer, &state.machine) {
                Ok(key) => {
                    if let Some(hit) = self.cache.borrow_mut().get(key) {
                        trace!(layer = %layer.id, "raw vertices served from cache");
                        return hit;
                    }
                    let generated = host.shapes.vertices(layer, machine);
                    return self.cache.borrow_mut().put(key, generated);
                }
                Err(err) => {
                    warn!(layer = %layer.id, %err, "cache key unavailable, generating uncached");
                    return Rc::new(host.shapes.vertices(layer, machine));
                }
            }
        }

        // Uncached shapes that carry an active effect are skipped entirely
        // unless the user is dragging them: their path only matters while
        // interactively visible.
        if !layer.dragging && layer.has_active_effect() {
            return Rc::new(Vec::new());
        }
        Rc::new(host.shapes.vertices(layer, machine))
    }

    // ── Stage 2: transformed vertices ───────────────────────────────

    /// The shape after user-visible edits (transform parameters and effect
    /// stack) but before any machine-specific finishing.
    pub fn transformed_vertices(
        &self,
        state: &DrawingState,
        host: &Host<'_>,
        id: &str,
    ) -> Result<Rc<Vec<Vertex>>, PipelineError> {
        let layer = state.layer(id)?;
        let stamp = raw_stamp(StageKind::Transformed, state, layer);
        if let Some(hit) = self
            .registry
            .borrow()
            .lookup(StageKind::Transformed, id, stamp)
        {
            return Ok(hit);
        }
        let raw = self.raw_vertices(state, host, id)?;
        let transformed = host.transforms.transform_shapes(&raw, layer, &layer.effects);
        Ok(self
            .registry
            .borrow_mut()
            .store(StageKind::Transformed, id, stamp, Rc::new(transformed)))
    }

    // ── Stage 3: computed (machine-bound) vertices ──────────────────

    /// The machine-bound path for one layer: its transformed vertices plus
    /// the stitch to the next visible layer, polished with flags marking
    /// whether this layer starts and/or ends the whole drawing.
    ///
    /// Layers outside the visible order contribute nothing.
    pub fn computed_vertices(
        &self,
        state: &DrawingState,
        host: &Host<'_>,
        id: &str,
    ) -> Result<Rc<Vec<Vertex>>, PipelineError> {
        let layer = state.layer(id)?;
        let Some(index) = state.visible_layer_order.iter().position(|v| v == id) else {
            return Ok(Rc::new(Vec::new()));
        };
        let total = state.visible_layer_order.len();

        let stamp = computed_stamp(state, layer, index)?;
        if let Some(hit) = self.registry.borrow().lookup(StageKind::Computed, id, stamp) {
            return Ok(hit);
        }

        let transformed = self.transformed_vertices(state, host, id)?;
        let mut path = (*transformed).clone();

        if index + 1 < total {
            let next_id = &state.visible_layer_order[index + 1];
            stitch::append_bridge(self, state, host, layer, index, next_id, &mut path)?;
        }

        let polished = host.polisher.polish(
            path,
            &state.machine,
            PathEnds {
                start: index == 0,
                end: index + 1 == total,
            },
        );
        Ok(self
            .registry
            .borrow_mut()
            .store(StageKind::Computed, id, stamp, Rc::new(polished)))
    }
}

/// Stamp for the raw and transformed stages: the layer's revision, plus the
/// machine's when the layer's geometry uses it. Effects live inline on the
/// layer, so the layer revision already covers them.
fn raw_stamp(kind: StageKind, state: &DrawingState, layer: &Layer) -> u64 {
    let mut stamp = InputStamp::new(kind);
    stamp.rev(layer.rev).flag(layer.uses_machine);
    if layer.uses_machine {
        stamp.rev(state.machine.rev);
    }
    stamp.finish()
}

/// Stamp for the computed stage. Stitching reaches transitively forward
/// through the visible order, so every visible layer's revision is an
/// input, along with the order itself and the machine.
fn computed_stamp(
    state: &DrawingState,
    layer: &Layer,
    index: usize,
) -> Result<u64, PipelineError> {
    let mut stamp = InputStamp::new(StageKind::Computed);
    stamp
        .rev(layer.rev)
        .rev(state.machine.rev)
        .rev(index as u64)
        .rev(state.visible_layer_order.len() as u64);
    for id in &state.visible_layer_order {
        stamp.text(id).rev(state.layer(id)?.rev);
    }
    Ok(stamp.finish())
}

// ── Test fixtures shared by the pipeline test modules ───────────────
