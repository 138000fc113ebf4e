//! Benchmarks for the layout packer.
//!
//! Measures the skyline primitive and the full rotation search at various
//! group sizes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_molding_layout::{Footprint, LayoutPacker, RectPacker, SkylinePacker};

fn footprints(n: usize) -> Vec<Footprint> {
    (0..n)
        .map(|i| {
            let w = 60.0 + (i as f64 * 37.0) % 180.0;
            let l = 40.0 + (i as f64 * 53.0) % 150.0;
            Footprint::new(w, l)
        })
        .collect()
}

fn bench_layout_packer(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_packer");
    group.sample_size(20);

    for &n in &[2, 4, 8, 16] {
        let fps = footprints(n);
        let packer = LayoutPacker::default_config();
        group.bench_with_input(BenchmarkId::new("pack", n), &fps, |b, fps| {
            b.iter(|| black_box(packer.pack(black_box(fps))))
        });
    }
    group.finish();
}

fn bench_skyline(c: &mut Criterion) {
    let boxes = footprints(32);
    let primitive = SkylinePacker::new();
    c.bench_function("skyline_32", |b| {
        b.iter(|| black_box(primitive.pack(black_box(&boxes))))
    });
}

criterion_group!(benches, bench_layout_packer, bench_skyline);
criterion_main!(benches);
