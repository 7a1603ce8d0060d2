//! Benchmarks for the full Runge-Kutta substage over a patch.
//!
//! Run with: `cargo bench --bench advance_rk_bench`
//!
//! Compares the inviscid fast path against the full viscous stencil, and
//! the serial sweep against the thread-parallel one.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use fv_rs::{
    compute_conserved_euler_2d, compute_rk_substage_euler_2d, AdvanceConfig, EquationOfState,
    ExecutionMode, PointMass, SinkModel, StructuredMesh, NCONS, NUM_GUARD,
};

fn disk_setup(resolution: usize) -> (StructuredMesh, Vec<f64>, Vec<f64>) {
    let mesh = StructuredMesh::square(8.0, resolution);
    let nj = mesh.nj() + 2 * NUM_GUARD;
    let ng = NUM_GUARD as i64;
    let mut prim = vec![0.0; (mesh.ni() + 2 * NUM_GUARD) * nj * NCONS];
    for (z, zone) in prim.chunks_mut(NCONS).enumerate() {
        let i = (z / nj) as i64 - ng;
        let j = (z % nj) as i64 - ng;
        let (x, y) = mesh.cell_center(i, j);
        let r = (x * x + y * y).sqrt().max(0.1);
        let vphi = (1.0 / r).sqrt();
        zone.copy_from_slice(&[1.0, -vphi * y / r, vphi * x / r, 0.01]);
    }
    let mut cons = vec![0.0; mesh.total_zones() * NCONS];
    compute_conserved_euler_2d(&mesh, &prim, &mut cons, ExecutionMode::Serial);
    (mesh, prim, cons)
}

fn bench_rk_substage(c: &mut Criterion) {
    let (mesh, prim, cons) = disk_setup(128);
    let masses = [PointMass {
        mass: 1.0,
        sink_rate: 10.0,
        sink_model: SinkModel::TorqueFree,
        ..PointMass::default()
    }];
    let mut out = prim.clone();

    let mut group = c.benchmark_group("rk_substage_128");
    group.sample_size(20);

    for (label, alpha) in [("inviscid", 0.0), ("viscous", 0.1)] {
        let config = AdvanceConfig::new(EquationOfState::GammaLaw)
            .with_masses(&masses)
            .with_alpha(alpha)
            .with_dt(1e-4);

        group.bench_with_input(BenchmarkId::new(label, "serial"), &config, |b, config| {
            b.iter(|| {
                compute_rk_substage_euler_2d(
                    &mesh,
                    &cons,
                    &prim,
                    &mut out,
                    config,
                    ExecutionMode::Serial,
                );
            })
        });

        #[cfg(feature = "parallel")]
        group.bench_with_input(BenchmarkId::new(label, "threads"), &config, |b, config| {
            b.iter(|| {
                compute_rk_substage_euler_2d(
                    &mesh,
                    &cons,
                    &prim,
                    &mut out,
                    config,
                    ExecutionMode::ThreadParallel,
                );
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rk_substage);
criterion_main!(benches);
