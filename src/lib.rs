// lib.rs — sandpath: incremental vertex pipeline for single-pen machines
//
// Turns declarative per-layer shape descriptions into one continuous
// sequence of 2D vertices a drawing machine traces without lifting its
// pen. Shape generation, transforms, machine geometry, and path polishing
// are external collaborators (see `host`); this crate owns the memoized
// computation graph, the cache-key discipline, cross-layer perimeter
// stitching, and the aggregate views built on top.

pub mod error;
pub mod geometry;
pub mod host;
pub mod pipeline;
pub mod state;

pub use error::PipelineError;
pub use geometry::Vertex;
pub use pipeline::{PathStats, PipelineContext};
