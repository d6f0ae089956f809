// pipeline/views.rs — whole-drawing outputs built from per-layer paths
//
// Aggregates the visible layers' computed vertices into the flattened path
// the machine actually traces, plus the derived views the UI consumes:
// per-layer offsets, path statistics, the progress-slider color gradient,
// and the loop-count track preview.

use crate::error::PipelineError;
use crate::geometry::{path_length, Vertex};
use crate::host::Host;
use crate::state::{DrawingState, Layer};
use rustc_hash::FxHashMap;
use serde::Serialize;

use super::PipelineContext;

/// Point count and total traced length of the flattened path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PathStats {
    pub point_count: usize,
    /// Sum of consecutive Euclidean distances, floored.
    pub total_length: u64,
}

/// The fade applied across a gradient range: 3/8 of full brightness,
/// divided evenly across the range.
const FADE_SPAN: f64 = 3.0 / 8.0;

/// Base trail color (full-brightness yellow).
const BASE_COLOR: (u8, u8, u8) = (0xff, 0xff, 0x00);

impl PipelineContext {
    /// Every visible layer's computed path, concatenated in visible order.
    pub fn flattened_path(
        &self,
        state: &DrawingState,
        host: &Host<'_>,
    ) -> Result<Vec<Vertex>, PipelineError> {
        let mut path = Vec::new();
        for id in &state.visible_layer_order {
            let computed = self.computed_vertices(state, host, id)?;
            path.extend(computed.iter().copied());
        }
        Ok(path)
    }

    /// Each visible layer's starting index in the flattened path. A
    /// non-final layer's computed path already ends with its stitch vertex,
    /// so the offsets are exact concatenation indices.
    pub fn vertex_offsets(
        &self,
        state: &DrawingState,
        host: &Host<'_>,
    ) -> Result<FxHashMap<String, usize>, PipelineError> {
        let mut offsets = FxHashMap::default();
        let mut offset = 0;
        for id in &state.visible_layer_order {
            offsets.insert(id.clone(), offset);
            offset += self.computed_vertices(state, host, id)?.len();
        }
        Ok(offsets)
    }

    /// Point count and floored total length of the flattened path.
    pub fn path_stats(
        &self,
        state: &DrawingState,
        host: &Host<'_>,
    ) -> Result<PathStats, PipelineError> {
        let path = self.flattened_path(state, host)?;
        Ok(PathStats {
            point_count: path.len(),
            total_length: path_length(&path).floor() as u64,
        })
    }

    /// Colors for the progress-slider trail: a map from flattened-path
    /// index to hex color over `[start, end)`, brightest at the head and
    /// fading by `3/8` spread evenly across the range.
    ///
    /// With the slider at rest (value ≤ 0) the range is the current
    /// layer's whole span; otherwise the external bounds resolver maps the
    /// slider value onto the path.
    pub fn slider_gradient(
        &self,
        state: &DrawingState,
        host: &Host<'_>,
    ) -> Result<FxHashMap<usize, String>, PipelineError> {
        let path = self.flattened_path(state, host)?;
        let value = state.preview_slider.value;

        let (start, end) = if value > 0.0 {
            host.slider.slider_bounds(&path, value)
        } else {
            let Some(current) = state.current_layer.as_deref() else {
                return Ok(FxHashMap::default());
            };
            let offsets = self.vertex_offsets(state, host)?;
            let Some(&start) = offsets.get(current) else {
                return Ok(FxHashMap::default());
            };
            let len = self.computed_vertices(state, host, current)?.len();
            (start, start + len)
        };

        Ok(gradient_colors(start, end))
    }

    /// Simplified loop-count preview of a layer's track: one vertex per
    /// loop, independent of the cache and stitch pipeline.
    pub fn preview_track_vertices(&self, layer: &Layer, host: &Host<'_>) -> Vec<Vertex> {
        if !layer.track_enabled || layer.num_loops == 0 {
            return Vec::new();
        }
        (0..layer.num_loops)
            .map(|i| {
                host.transforms
                    .transform_shape(layer, Vertex::ORIGIN, i, layer.num_loops)
            })
            .collect()
    }
}

/// Hex colors for `[start, end)`: index `end - 1` keeps the base color and
/// each step away from the head darkens by `FADE_SPAN / range_len`.
fn gradient_colors(start: usize, end: usize) -> FxHashMap<usize, String> {
    let mut colors = FxHashMap::default();
    if end <= start {
        return colors;
    }
    let step = FADE_SPAN / (end - start) as f64;
    for index in start..end {
        let amount = step * (end - 1 - index) as f64;
        colors.insert(index, darkened_hex(BASE_COLOR, amount));
    }
    colors
}

fn darkened_hex((r, g, b): (u8, u8, u8), amount: f64) -> String {
    let factor = (1.0 - amount).clamp(0.0, 1.0);
    let scale = |c: u8| (f64::from(c) * factor).round() as u8;
    format!("#{:02x}{:02x}{:02x}", scale(r), scale(g), scale(b))
}
