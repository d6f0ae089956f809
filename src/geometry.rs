// geometry.rs — 2D vertex type and path length helpers

use serde::{Deserialize, Serialize};

/// An immutable (x, y) point. Sequences of vertices are ordered: order
/// encodes drawing order and is preserved exactly through every stage.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another vertex.
    pub fn distance(self, other: Self) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Total length of a path: the sum of consecutive Euclidean distances.
/// A path with one or zero points has length 0.
pub fn path_length(vertices: &[Vertex]) -> f64 {
    vertices
        .windows(2)
        .map(|pair| pair[0].distance(pair[1]))
        .sum()
}
