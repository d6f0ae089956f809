// error.rs — pipeline error kinds

use thiserror::Error;

/// Errors surfaced by the pipeline. None are retried automatically; callers
/// of the aggregate views decide whether to present a partial result or
/// abort. Dragging-layer exclusions and empty-vertex short-circuits are
/// silent policy branches, not errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A referenced layer id is absent from the layer map. Fatal for the
    /// requesting computation.
    #[error("layer `{0}` is not present in the layer map")]
    LayerNotFound(String),

    /// Perimeter resolution found no nearest point (e.g. an empty
    /// perimeter) while bridging a layer to its neighbor.
    #[error("no perimeter point near ({x}, {y}) while connecting layer `{layer}`")]
    InvalidConnectionGeometry { layer: String, x: f64, y: f64 },

    /// A (shape, machine) snapshot could not be canonically serialized.
    /// The raw stage treats this as non-fatal and falls back to uncached
    /// generation.
    #[error("cache key serialization failed: {0}")]
    CacheKey(#[from] serde_json::Error),
}
