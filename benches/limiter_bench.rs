//! Benchmarks for the PLM slope limiter.
//!
//! Run with: `cargo bench --bench limiter_bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fv_rs::plm_gradient;
use fv_rs::Primitive;

fn generate_stencils(n: usize) -> Vec<[Primitive; 3]> {
    (0..n)
        .map(|k| {
            let s = k as f64 * 0.1;
            [
                Primitive::new(1.0 + 0.2 * s.sin(), 0.3 * s.cos(), -0.1, 1.0),
                Primitive::new(1.0 + 0.2 * (s + 0.1).sin(), 0.3 * (s + 0.1).cos(), -0.1, 1.0),
                Primitive::new(1.0 + 0.2 * (s + 0.2).sin(), 0.3 * (s + 0.2).cos(), -0.1, 1.0),
            ]
        })
        .collect()
}

fn bench_plm_gradient(c: &mut Criterion) {
    let stencils = generate_stencils(1000);

    c.bench_function("plm_gradient_1000_zones", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for [yl, y0, yr] in &stencils {
                let g = plm_gradient(black_box(yl), black_box(y0), black_box(yr));
                acc += g.rho;
            }
            acc
        })
    });
}

criterion_group!(benches, bench_plm_gradient);
criterion_main!(benches);
