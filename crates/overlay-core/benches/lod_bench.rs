use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use overlay_core::lod::{bucket_count_for, downsample_candles_min_max, downsample_line_min_max, slice_by_time_window};
use overlay_core::{CandleLike, LinePoint};

fn gen_candles(n: usize) -> Vec<CandleLike> {
    let mut v = Vec::with_capacity(n);
    let mut price = 100.0f64;
    for i in 0..n {
        let o = price;
        let c = o + (i as f64 * 0.01).sin();
        v.push(CandleLike { time: i as f64 * 60.0, open: o, high: o.max(c) + 0.5, low: o.min(c) - 0.5, close: c, volume: 1.0 });
        price = c;
    }
    v
}

fn gen_line(n: usize) -> Vec<LinePoint> {
    (0..n).map(|i| LinePoint { time: i as f64, value: (i as f64 * 0.01).sin() * 10.0 + i as f64 * 0.0001 }).collect()
}

fn bench_candles(c: &mut Criterion) {
    let mut group = c.benchmark_group("downsample_candles");
    for &n in &[100_000usize, 1_000_000usize] {
        let data = gen_candles(n);
        for &width in &[800.0f64, 1920.0f64] {
            let target = bucket_count_for(width, 3.0);
            group.bench_with_input(BenchmarkId::from_parameter(format!("n{n}_w{width}")), &target, |b, &t| {
                b.iter(|| black_box(downsample_candles_min_max(black_box(&data), t).len()));
            });
        }
    }
    group.finish();
}

fn bench_line(c: &mut Criterion) {
    let mut group = c.benchmark_group("downsample_line");
    for &n in &[100_000usize, 1_000_000usize] {
        let data = gen_line(n);
        group.bench_with_input(BenchmarkId::from_parameter(format!("n{n}")), &640usize, |b, &t| {
            b.iter_batched(
                || data.clone(),
                |d| { let _ = black_box(downsample_line_min_max(&d, t).len()); },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_window(c: &mut Criterion) {
    let data = gen_line(1_000_000);
    c.bench_function("slice_by_time_window_1m", |b| {
        b.iter(|| black_box(slice_by_time_window(&data, black_box(250_000.0), black_box(750_000.0)).len()));
    });
}

criterion_group!(benches, bench_candles, bench_line, bench_window);
criterion_main!(benches);
