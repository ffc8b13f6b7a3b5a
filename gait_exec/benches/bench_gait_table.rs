//! # Gait Table Benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use gait_lib::{
    gait_ctrl::{build_trajectory_table, GaitManager, GaitTable},
    kinematics::LegGeometry,
};

fn gait_table_benchmark(c: &mut Criterion) {
    let geometry = LegGeometry::default();
    let gaits = GaitTable::default();

    // ---- Trajectory table build, per gait ----

    let mut group = c.benchmark_group("build_trajectory_table");

    for gait in gaits.0.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(&gait.name), &gait.params, |b, p| {
            b.iter(|| build_trajectory_table(black_box(&geometry), black_box(p)).unwrap())
        });
    }

    group.finish();

    // ---- One tick of a loaded gait ----

    let mut mgr = GaitManager::default();
    mgr.load_gait("TROT").unwrap();
    mgr.start_movement(comms_if::tc::DirectionSymbol::Forward)
        .unwrap();

    c.bench_function("gait_manager_tick", |b| b.iter(|| mgr.tick().unwrap()));
}

criterion_group!(benches, gait_table_benchmark);
criterion_main!(benches);
