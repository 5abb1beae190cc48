// Benchmark 测试：单调队列窗口极值 vs 朴素重算
//
// 对比：
// - windowed_min (单调双端队列，摊还 O(1))
// - 每个窗口重新扫描 (O(n·k))
// - Welford 单遍方差
//
// 运行方式：
// cargo bench --bench window_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qastream::seq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 生成随机价格序列 (固定种子，保证可复现)
fn create_test_prices(n: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(20240101);
    (0..n).map(|_| rng.gen_range(3500.0..3600.0)).collect()
}

fn naive_windowed_min(values: &[f64], k: usize) -> Vec<f64> {
    values
        .windows(k)
        .map(|w| w.iter().copied().fold(f64::INFINITY, f64::min))
        .collect()
}

/// Benchmark: 不同窗口大小下的窗口最小值
fn bench_windowed_min(c: &mut Criterion) {
    let prices = create_test_prices(100_000);
    let mut group = c.benchmark_group("windowed_min");
    group.throughput(Throughput::Elements(prices.len() as u64));

    for k in [8usize, 64, 512] {
        group.bench_with_input(BenchmarkId::new("monotonic_deque", k), &k, |b, &k| {
            b.iter(|| {
                let out = seq(prices.iter().copied()).windowed_min(k).unwrap().count();
                black_box(out)
            });
        });

        group.bench_with_input(BenchmarkId::new("naive_rescan", k), &k, |b, &k| {
            b.iter(|| black_box(naive_windowed_min(&prices, k).len()));
        });
    }

    group.finish();
}

/// Benchmark: 单遍方差与滑动窗口
fn bench_streaming_stats(c: &mut Criterion) {
    let prices = create_test_prices(100_000);

    c.bench_function("welford_variance", |b| {
        b.iter(|| black_box(seq(prices.iter().copied()).variance()));
    });

    c.bench_function("ewma_0_1", |b| {
        b.iter(|| black_box(seq(prices.iter().copied()).ewma(0.1).unwrap().count()));
    });

    c.bench_function("window_32_mean", |b| {
        b.iter(|| {
            let out = seq(prices.iter().copied())
                .window(32)
                .unwrap()
                .map(|w| w.iter().sum::<f64>() / w.len() as f64)
                .count();
            black_box(out)
        });
    });
}

criterion_group!(benches, bench_windowed_min, bench_streaming_stats);
criterion_main!(benches);
