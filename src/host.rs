// host.rs — interfaces to the external collaborators
//
// Shape generation, transform/effect application, machine geometry, path
// polishing, and slider bounds resolution all live outside the pipeline.
// Each must be a pure function of its arguments: the cache and the
// memoization layer both rely on that.

use crate::geometry::Vertex;
use crate::state::{Effect, Layer, Machine};

/// Produces a shape's raw geometry. `machine` is supplied only for layers
/// whose geometry depends on machine settings.
pub trait ShapeGenerator {
    fn vertices(&self, layer: &Layer, machine: Option<&Machine>) -> Vec<Vertex>;
}

/// Applies a layer's transform parameters and effect stack.
pub trait ShapeTransformer {
    fn transform_shapes(
        &self,
        vertices: &[Vertex],
        layer: &Layer,
        effects: &[Effect],
    ) -> Vec<Vertex>;

    /// Single-point variant used for preview-track vertices.
    fn transform_shape(
        &self,
        layer: &Layer,
        base: Vertex,
        loop_index: u32,
        total_loops: u32,
    ) -> Vertex;
}

/// Low-level machine geometry: perimeter lookup and tracing.
pub trait PerimeterGeometry {
    /// Nearest point on the drawable perimeter, or `None` if the perimeter
    /// is degenerate.
    fn nearest_perimeter_vertex(&self, machine: &Machine, point: Vertex) -> Option<Vertex>;

    /// The perimeter-following points strictly between `a` and `b`
    /// (exclusive of both endpoints).
    fn trace_perimeter(&self, machine: &Machine, a: Vertex, b: Vertex) -> Vec<Vertex>;
}

/// Whether a layer's path sits at the true start and/or end of the whole
/// drawing. Start/end-specific finishing (e.g. machine homing) applies only
/// at the true path boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathEnds {
    pub start: bool,
    pub end: bool,
}

/// Final machine-specific finishing of a layer's path.
pub trait PathPolisher {
    fn polish(&self, vertices: Vec<Vertex>, machine: &Machine, ends: PathEnds) -> Vec<Vertex>;
}

/// Maps a slider value onto an index range of the flattened path.
pub trait SliderBoundsResolver {
    /// Returns `(start, end)` as a half-open range.
    fn slider_bounds(&self, vertices: &[Vertex], value: f64) -> (usize, usize);
}

/// All collaborators bundled for one evaluation. Cheap to copy; holds
/// borrows only.
#[derive(Clone, Copy)]
pub struct Host<'a> {
    pub shapes: &'a dyn ShapeGenerator,
    pub transforms: &'a dyn ShapeTransformer,
    pub perimeter: &'a dyn PerimeterGeometry,
    pub polisher: &'a dyn PathPolisher,
    pub slider: &'a dyn SliderBoundsResolver,
}
