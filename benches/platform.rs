use criterion::{criterion_group, criterion_main, Criterion};
use netgauge::platform::SourceFactory;
use std::hint::black_box;

fn benchmark_discovery(c: &mut Criterion) {
    c.bench_function("discover_network_devices", |b| {
        let factory = SourceFactory::host();

        b.iter(|| {
            black_box(factory.discover());
        });
    });
}

fn benchmark_counter_reading(c: &mut Criterion) {
    let discovery = SourceFactory::host().discover();

    if let Some((name, source)) = discovery.iter().next() {
        c.bench_function("read_device_counters", |b| {
            b.iter(|| {
                // A device may vanish mid-run; errors are part of the measurement
                let _ = black_box(source.read(name));
            });
        });
    }
}

fn benchmark_all_devices_reading(c: &mut Criterion) {
    let discovery = SourceFactory::host().discover();

    if !discovery.is_empty() {
        c.bench_function("read_all_devices", |b| {
            b.iter(|| {
                for (name, source) in &discovery {
                    let _ = black_box(source.read(name));
                }
            });
        });
    }
}

criterion_group!(
    benches,
    benchmark_discovery,
    benchmark_counter_reading,
    benchmark_all_devices_reading
);
criterion_main!(benches);
