use criterion::{criterion_group, criterion_main, Criterion};
use netgauge::{
    device::CounterSample,
    graph::{Deflection, GraphBuffer},
    stats::StatisticsEngine,
    units::{format_rate, Unit},
};
use std::hint::black_box;
use std::time::{Duration, SystemTime};

fn sample_at(tick: u64, bytes_in: u64, bytes_out: u64) -> CounterSample {
    CounterSample::at(
        SystemTime::UNIX_EPOCH + Duration::from_millis(tick * 500),
        bytes_in,
        bytes_out,
    )
    .with_packets(bytes_in / 1000, bytes_out / 1000)
}

fn engine() -> StatisticsEngine {
    StatisticsEngine::new(Duration::from_secs(300), Duration::from_millis(500))
}

fn benchmark_single_sample(c: &mut Criterion) {
    c.bench_function("stats_single_sample", |b| {
        let mut engine = engine();
        let mut tick = 0;
        b.iter(|| {
            tick += 1;
            engine.add_sample(black_box(sample_at(tick, tick * 1_000, tick * 500)));
        });
    });
}

fn benchmark_full_window(c: &mut Criterion) {
    c.bench_function("stats_full_window_recompute", |b| {
        // 300 s at 500 ms keeps 601 rates in the window
        let mut engine = engine();
        for tick in 0..1_000 {
            engine.add_sample(sample_at(tick, tick * 1_000, tick * 500));
        }
        let mut tick = 1_000;

        b.iter(|| {
            tick += 1;
            engine.add_sample(black_box(sample_at(tick, tick * 1_000, tick * 500)));
            black_box(engine.stats());
        });
    });
}

fn benchmark_counter_reset_handling(c: &mut Criterion) {
    c.bench_function("counter_reset_calculation", |b| {
        let mut engine = engine();
        engine.add_sample(sample_at(0, u32::MAX as u64 - 1000, u32::MAX as u64 - 500));
        let mut tick = 0;

        b.iter(|| {
            tick += 1;
            // Alternate between high and low readings so every other delta is a reset
            let base = if tick % 2 == 0 { u32::MAX as u64 - 1000 } else { 1000 };
            engine.add_sample(black_box(sample_at(tick, base, base)));
        });
    });
}

fn benchmark_graph_render(c: &mut Criterion) {
    c.bench_function("graph_push_and_render", |b| {
        let mut graph = GraphBuffer::new(200, Deflection::default());
        let mut value = 0.0;

        b.iter(|| {
            value += 1_000.0;
            graph.push(black_box(value));
            black_box(graph.render(black_box(20)));
        });
    });
}

fn benchmark_rate_formatting(c: &mut Criterion) {
    c.bench_function("format_rate_human", |b| {
        b.iter(|| {
            for bits in [999.0, 1_500_000.0, 2.5e9, 7.0e12] {
                black_box(format_rate(black_box(bits), Unit::HumanBit));
                black_box(format_rate(black_box(bits), Unit::HumanByte));
            }
        });
    });
}

criterion_group!(
    benches,
    benchmark_single_sample,
    benchmark_full_window,
    benchmark_counter_reset_handling,
    benchmark_graph_render,
    benchmark_rate_formatting
);
criterion_main!(benches);
