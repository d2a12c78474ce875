//! Benchmarks for the world → target pipeline.
//!
//! Measures:
//! - Automatic setup per projection
//! - Forward mapping of a point grid
//! - Inverse mapping after a cache refresh
//! - Size propagation through coordinate system chains

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use glam::DVec3;
use vantage_geometry::{AxisRole, Mapping, ProjectionKind};
use vantage_test_utils::{SCENARIO_DOMAIN, chain_tree, grid_points, scenario_config, scenario_mapping};

const PROJECTIONS: [ProjectionKind; 4] = [
    ProjectionKind::Central,
    ProjectionKind::Parallel,
    ProjectionKind::Isometric,
    ProjectionKind::TwoDimensional,
];

fn bench_setup(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapping/setup");

    for kind in PROJECTIONS {
        let config = scenario_config(kind);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{:?}", kind)), &config, |b, config| {
            b.iter(|| Mapping::new(black_box(config.clone()), black_box(SCENARIO_DOMAIN)));
        });
    }

    group.finish();
}

fn bench_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapping/map");
    let points = grid_points(SCENARIO_DOMAIN, 10);

    for kind in PROJECTIONS {
        let mapping = scenario_mapping(kind);
        group.bench_with_input(BenchmarkId::from_parameter(format!("{:?}", kind)), &points, |b, points| {
            b.iter(|| {
                let mut sum = DVec3::ZERO;
                for &p in points {
                    sum += mapping.map(black_box(p));
                }
                sum
            });
        });
    }

    group.finish();
}

fn bench_unmap(c: &mut Criterion) {
    let mut mapping = scenario_mapping(ProjectionKind::Central);
    let targets: Vec<DVec3> = grid_points(SCENARIO_DOMAIN, 10)
        .into_iter()
        .map(|p| mapping.map(p))
        .collect();

    c.bench_function("mapping/unmap_central", |b| {
        b.iter(|| {
            let inverse = mapping.inverse().expect("scenario mapping is invertible");
            let mut sum = DVec3::ZERO;
            for &t in &targets {
                sum += inverse.unmap(black_box(t));
            }
            sum
        });
    });
}

fn bench_adjust_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("coordinate_system/adjust_size");

    for depth in [4, 16, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let (mut tree, ids) = chain_tree(depth, DVec3::splat(5.0));
            tree.adjust_size().expect("initial layout");
            let deepest = ids[depth];
            let mut length = 100.0;

            b.iter(|| {
                length += 1.0;
                tree.axis_mut(deepest, AxisRole::X)
                    .expect("deepest system exists")
                    .set_ics_length(length);
                tree.adjust_size().expect("layout")
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_setup, bench_map, bench_unmap, bench_adjust_size);
criterion_main!(benches);
