//! Benchmarks for the per-frame CPU work: simulation update and building
//! the frame's shape list.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shoal::canvas::DrawList;
use shoal::params::ParameterStore;
use shoal::preset::water;
use shoal::render::render;
use shoal::simulation::{SimParams, SimulationState};
use shoal::Vec2;

fn params_with_count(store: &ParameterStore, count: f32) -> SimParams {
    store.set(water::keys::FISH_COUNT, count).unwrap();
    SimParams::from_snapshot(&store.snapshot()).unwrap()
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");
    let store = water::init_parameter_store();

    for count in [1.0, 18.0, 60.0] {
        let params = params_with_count(&store, count);
        let mut state = SimulationState::new(Vec2::new(960.0, 640.0), &params, 7);
        state.set_strict_invariants(false);

        group.bench_with_input(BenchmarkId::from_parameter(count as u32), &params, |b, params| {
            b.iter(|| black_box(state.update(1.0 / 60.0, params).unwrap()))
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let store = water::init_parameter_store();
    let params = params_with_count(&store, 18.0);

    for (width, height) in [(320, 240), (960, 640)] {
        let state = SimulationState::new(Vec2::new(width as f32, height as f32), &params, 7);
        let mut canvas = DrawList::new(width, height);

        group.bench_function(format!("{}x{}", width, height), |b| {
            b.iter(|| {
                render(&state, &params, &mut canvas);
                black_box(canvas.len())
            })
        });
    }

    let trails = SimParams { trails: 0.8, ..params };
    let state = SimulationState::new(Vec2::new(960.0, 640.0), &trails, 7);
    let mut canvas = DrawList::new(960, 640);
    group.bench_function("960x640_trails", |b| {
        b.iter(|| {
            render(&state, &trails, &mut canvas);
            black_box(canvas.len())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_update, bench_render);
criterion_main!(benches);
