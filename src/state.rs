// state.rs — snapshot types owned by the external application state
//
// The pipeline never mutates these; each evaluation sees an immutable
// snapshot. The store bumps a value's `rev` whenever it logically changes —
// memoization compares those revision stamps, never vertex data. `rev` is
// identity, not content, so it is skipped when serializing cache keys.

use crate::error::PipelineError;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// How a layer's path is linked to the next visible layer's path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionMethod {
    /// A single stitch vertex: a straight line to the next layer's start.
    #[default]
    None,
    /// Follow the machine's drawable perimeter to the next layer's start.
    AlongPerimeter,
}

/// One entry in a layer's effect stack. Effects are applied by the external
/// transform function; the pipeline only inspects the `active` flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Effect {
    pub kind: String,
    pub active: bool,
    /// Effect parameters, keyed in sorted order so cache keys stay canonical.
    pub params: BTreeMap<String, Value>,
}

/// One user-configured shape instance in the drawing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Layer {
    pub id: String,
    /// Shape kind name, resolved by the external generator.
    pub shape: String,
    /// Shape-specific parameters. A `BTreeMap` keeps serialization order
    /// deterministic, which is what makes the cache key canonical.
    pub params: BTreeMap<String, Value>,

    pub offset_x: f64,
    pub offset_y: f64,
    pub rotation: f64,
    pub starting_width: f64,
    pub starting_height: f64,
    pub autosize: bool,

    /// True while the user is interactively moving this layer. Dragging
    /// layers are never baked into a neighbor's stitched path.
    pub dragging: bool,

    pub effects: Vec<Effect>,
    pub connection_method: ConnectionMethod,

    /// Does this shape's geometry depend on machine settings? When false,
    /// machine edits must not invalidate this layer.
    pub uses_machine: bool,
    /// Is raw generation expensive enough to cache?
    pub should_cache: bool,

    pub track_enabled: bool,
    pub num_loops: u32,

    /// Version stamp assigned by the external store; bumped on every
    /// logical change. Never serialized into cache keys.
    #[serde(skip_serializing)]
    pub rev: u64,
}

impl Default for Layer {
    fn default() -> Self {
        Self {
            id: String::new(),
            shape: String::new(),
            params: BTreeMap::new(),
            offset_x: 0.0,
            offset_y: 0.0,
            rotation: 0.0,
            starting_width: 100.0,
            starting_height: 100.0,
            autosize: true,
            dragging: false,
            effects: Vec::new(),
            connection_method: ConnectionMethod::None,
            uses_machine: false,
            should_cache: true,
            track_enabled: false,
            num_loops: 1,
            rev: 0,
        }
    }
}

impl Layer {
    /// Does the effect stack contain at least one active effect?
    pub fn has_active_effect(&self) -> bool {
        self.effects.iter().any(|e| e.active)
    }
}

/// The physical drawable area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MachineShape {
    #[serde(rename_all = "camelCase")]
    Rectangular {
        min_x: f64,
        max_x: f64,
        min_y: f64,
        max_y: f64,
    },
    #[serde(rename_all = "camelCase")]
    Polar { max_radius: f64 },
}

/// Machine settings relevant to path generation. Compared by content for
/// cache keys; compared by `rev` for memoization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub shape: MachineShape,
    pub minimize_moves: bool,
    #[serde(skip_serializing, default)]
    pub rev: u64,
}

/// Progress-slider position, in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PreviewSlider {
    pub value: f64,
}

/// The full input snapshot: everything the pipeline reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawingState {
    pub layers: FxHashMap<String, Layer>,
    /// Drawing order. Determines stitching direction (current → next, next
    /// meaning the following index, skipping nothing).
    pub visible_layer_order: Vec<String>,
    pub machine: Machine,
    #[serde(default)]
    pub preview_slider: PreviewSlider,
    /// The layer the UI currently has focused; the slider gradient
    /// highlights its range when the slider sits at zero.
    #[serde(default)]
    pub current_layer: Option<String>,
}

impl DrawingState {
    /// Look up a layer by id.
    pub fn layer(&self, id: &str) -> Result<&Layer, PipelineError> {
        self.layers
            .get(id)
            .ok_or_else(|| PipelineError::LayerNotFound(id.to_string()))
    }
}
