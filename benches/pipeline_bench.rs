//! Benchmarks for the vertex pipeline.
//!
//! Measures:
//!   1. Cold evaluation: fresh context, every stage runs
//!   2. Warm re-read: unchanged snapshot, everything memoized
//!   3. Identity churn: revision bumps with unchanged content, answered
//!      by the vertex cache instead of the generator
//!
//! Run with:
//!   cargo bench --bench pipeline_bench
//!
//! Results are written to `target/criterion/` with HTML reports.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sandpath::host::{
    Host, PathEnds, PathPolisher, PerimeterGeometry, ShapeGenerator, ShapeTransformer,
    SliderBoundsResolver,
};
use sandpath::state::{DrawingState, Effect, Layer, Machine, MachineShape};
use sandpath::{PipelineContext, Vertex};

// ── Host fakes ─────────────────────────────────────────────────────

/// Generates a dense circle; cost scales with the vertex count encoded in
/// the shape name ("circle:<n>").
struct CircleShapes;

impl ShapeGenerator for CircleShapes {
    fn vertices(&self, layer: &Layer, _machine: Option<&Machine>) -> Vec<Vertex> {
        let n = layer
            .shape
            .strip_prefix("circle:")
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(0);
        (0..n)
            .map(|i| {
                let angle = std::f64::consts::TAU * f64::from(i) / f64::from(n.max(1));
                Vertex::new(angle.cos() * 100.0, angle.sin() * 100.0)
            })
            .collect()
    }
}

struct OffsetTransforms;

impl ShapeTransformer for OffsetTransforms {
    fn transform_shapes(
        &self,
        vertices: &[Vertex],
        layer: &Layer,
        _effects: &[Effect],
    ) -> Vec<Vertex> {
        vertices
            .iter()
            .map(|v| Vertex::new(v.x + layer.offset_x, v.y + layer.offset_y))
            .collect()
    }

    fn transform_shape(
        &self,
        _layer: &Layer,
        base: Vertex,
        loop_index: u32,
        _total_loops: u32,
    ) -> Vertex {
        Vertex::new(base.x + f64::from(loop_index), base.y)
    }
}

struct EdgePerimeter;

impl PerimeterGeometry for EdgePerimeter {
    fn nearest_perimeter_vertex(&self, _machine: &Machine, point: Vertex) -> Option<Vertex> {
        Some(Vertex::new(point.x, -250.0))
    }

    fn trace_perimeter(&self, _machine: &Machine, a: Vertex, b: Vertex) -> Vec<Vertex> {
        vec![Vertex::new((a.x + b.x) / 2.0, -250.0)]
    }
}

struct PassthroughPolish;

impl PathPolisher for PassthroughPolish {
    fn polish(&self, vertices: Vec<Vertex>, _machine: &Machine, _ends: PathEnds) -> Vec<Vertex> {
        vertices
    }
}

struct LinearBounds;

impl SliderBoundsResolver for LinearBounds {
    fn slider_bounds(&self, vertices: &[Vertex], value: f64) -> (usize, usize) {
        (((vertices.len() as f64) * value) as usize, vertices.len())
    }
}

struct BenchHost {
    shapes: CircleShapes,
    transforms: OffsetTransforms,
    perimeter: EdgePerimeter,
    polisher: PassthroughPolish,
    slider: LinearBounds,
}

impl BenchHost {
    fn new() -> Self {
        Self {
            shapes: CircleShapes,
            transforms: OffsetTransforms,
            perimeter: EdgePerimeter,
            polisher: PassthroughPolish,
            slider: LinearBounds,
        }
    }

    fn host(&self) -> Host<'_> {
        Host {
            shapes: &self.shapes,
            transforms: &self.transforms,
            perimeter: &self.perimeter,
            polisher: &self.polisher,
            slider: &self.slider,
        }
    }
}

fn drawing(layer_count: usize, vertices_per_layer: u32) -> DrawingState {
    let layers: Vec<Layer> = (0..layer_count)
        .map(|i| Layer {
            id: format!("layer{i}"),
            shape: format!("circle:{vertices_per_layer}"),
            offset_x: i as f64 * 10.0,
            ..Layer::default()
        })
        .collect();
    DrawingState {
        visible_layer_order: layers.iter().map(|l| l.id.clone()).collect(),
        layers: layers.into_iter().map(|l| (l.id.clone(), l)).collect(),
        machine: Machine {
            shape: MachineShape::Rectangular {
                min_x: -250.0,
                max_x: 250.0,
                min_y: -250.0,
                max_y: 250.0,
            },
            minimize_moves: false,
            rev: 0,
        },
        preview_slider: Default::default(),
        current_layer: None,
    }
}

// ── Benchmarks ─────────────────────────────────────────────────────

fn bench_cold_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("cold_evaluation");
    let bench_host = BenchHost::new();

    for layer_count in [1usize, 8, 32] {
        let state = drawing(layer_count, 1000);
        group.throughput(Throughput::Elements(layer_count as u64 * 1000));
        group.bench_with_input(
            BenchmarkId::from_parameter(layer_count),
            &state,
            |b, state| {
                b.iter(|| {
                    let ctx = PipelineContext::new();
                    black_box(ctx.flattened_path(state, &bench_host.host()).unwrap())
                });
            },
        );
    }
    group.finish();
}

fn bench_warm_reread(c: &mut Criterion) {
    let mut group = c.benchmark_group("warm_reread");
    let bench_host = BenchHost::new();

    for layer_count in [1usize, 8, 32] {
        let state = drawing(layer_count, 1000);
        let ctx = PipelineContext::new();
        ctx.flattened_path(&state, &bench_host.host()).unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(layer_count),
            &state,
            |b, state| {
                b.iter(|| black_box(ctx.flattened_path(state, &bench_host.host()).unwrap()));
            },
        );
    }
    group.finish();
}

fn bench_identity_churn(c: &mut Criterion) {
    let bench_host = BenchHost::new();
    let mut state = drawing(8, 1000);
    let ctx = PipelineContext::new();
    ctx.flattened_path(&state, &bench_host.host()).unwrap();

    let mut rev = 0u64;
    c.bench_function("identity_churn", |b| {
        b.iter(|| {
            // New identity, identical content: the cache answers, the
            // generator does not run
            rev += 1;
            state.layers.get_mut("layer0").unwrap().rev = rev;
            black_box(ctx.flattened_path(&state, &bench_host.host()).unwrap())
        });
    });
}

criterion_group!(
    benches,
    bench_cold_evaluation,
    bench_warm_reread,
    bench_identity_churn
);
criterion_main!(benches);
