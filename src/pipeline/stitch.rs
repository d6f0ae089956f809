// pipeline/stitch.rs — perimeter bridge between consecutive visible layers
//
// The machine cannot lift its pen, so the end of one layer's path must be
// physically connected to the start of the next. The stitch either follows
// the drawable perimeter (along-perimeter connection) or takes a single
// straight step to the next layer's first vertex.

use crate::error::PipelineError;
use crate::geometry::Vertex;
use crate::host::Host;
use crate::state::{ConnectionMethod, DrawingState, Layer};
use smallvec::SmallVec;

use super::PipelineContext;

/// Append the bridge from `layer`'s path to the next visible layer.
///
/// No bridge is added when the next layer is being dragged (its path is
/// transient and must not be baked into a neighbor's memoized result) or
/// when its computed path is empty. Otherwise the next layer's computed
/// vertices are obtained recursively through the registry; the visible
/// order only ever advances, so the recursion is a finite forward walk.
pub(super) fn append_bridge(
    ctx: &PipelineContext,
    state: &DrawingState,
    host: &Host<'_>,
    layer: &Layer,
    index: usize,
    next_id: &str,
    path: &mut Vec<Vertex>,
) -> Result<(), PipelineError> {
    let next = state.layer(next_id)?;
    if next.dragging {
        return Ok(());
    }

    debug_assert!(
        state.visible_layer_order.get(index + 1).map(String::as_str) == Some(next_id),
        "stitch target must be the following entry in the visible order"
    );

    let next_path = ctx.computed_vertices(state, host, next_id)?;
    let Some(&end) = next_path.first() else {
        return Ok(());
    };

    // Most stitches are a single vertex; perimeter bridges spill.
    let mut tail: SmallVec<[Vertex; 4]> = SmallVec::new();

    match (layer.connection_method, path.last()) {
        (ConnectionMethod::AlongPerimeter, Some(&start)) => {
            let machine = &state.machine;
            let start_perimeter = host
                .perimeter
                .nearest_perimeter_vertex(machine, start)
                .ok_or(PipelineError::InvalidConnectionGeometry {
                    layer: layer.id.clone(),
                    x: start.x,
                    y: start.y,
                })?;
            let end_perimeter = host
                .perimeter
                .nearest_perimeter_vertex(machine, end)
                .ok_or(PipelineError::InvalidConnectionGeometry {
                    layer: layer.id.clone(),
                    x: end.x,
                    y: end.y,
                })?;
            tail.push(start_perimeter);
            tail.extend(host.perimeter.trace_perimeter(machine, start_perimeter, end_perimeter));
            tail.push(end_perimeter);
            tail.push(end);
        }
        // An empty path has no start to bridge from; fall back to the
        // plain stitch. The next shape's own vertices arrive separately
        // when its turn comes in the aggregate view, so only the single
        // linking vertex is appended here.
        _ => tail.push(end),
    }

    path.extend(tail);
    Ok(())
}
