use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use rastio::{BlockWindows, Intersection, Union, Window};

// Sentinel-2 sized grid with the default GeoTIFF tile layout.
const RASTER_SHAPE: (usize, usize) = (10980, 10980);
const BLOCK_SHAPE: (usize, usize) = (1024, 1024);

fn bench_window_algebra(c: &mut Criterion) {
    let a = Window::new(10., 100., 490., 400.).unwrap();
    let b = Window::new(50., 10., 200., 140.).unwrap();
    c.bench_function("window_union", |bencher| {
        bencher.iter(|| black_box(a).union(&black_box(b)))
    });
    c.bench_function("window_intersection", |bencher| {
        bencher.iter(|| black_box(a).intersection(&black_box(b)).unwrap())
    });
}

fn bench_block_iteration(c: &mut Criterion) {
    c.bench_function("block_windows_full_grid", |bencher| {
        bencher.iter(|| {
            BlockWindows::new(black_box(RASTER_SHAPE), black_box(BLOCK_SHAPE))
                .unwrap()
                .map(|(_, window)| window.width() * window.height())
                .sum::<f64>()
        })
    });
}

criterion_group!(benches, bench_window_algebra, bench_block_iteration);
criterion_main!(benches);
