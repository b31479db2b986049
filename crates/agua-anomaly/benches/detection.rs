//! Benchmark for rolling detection
//! Run: cargo bench -p agua-anomaly --bench detection

use agua_anomaly::{DetectionConfig, Method, detect};
use agua_core::Measurement;
use chrono::{Duration, TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

const METERS: [&str; 3] = ["SETOR-A-01", "SETOR-A-02", "SETOR-B-01"];

// deterministic pseudo-noise around 20 L/min with an occasional spike
fn readings(per_meter: usize) -> Vec<Measurement> {
    let start = Utc.with_ymd_and_hms(2025, 11, 2, 16, 0, 0).unwrap();
    let mut out = Vec::with_capacity(per_meter * METERS.len());

    for i in 0..per_meter {
        for (m, meter) in METERS.iter().enumerate() {
            let noise = ((i * 7 + m * 13) % 17) as f64 / 4.0;
            let spike = if (i + m) % 97 == 0 { 25.0 } else { 0.0 };
            out.push(Measurement::new(
                *meter,
                start + Duration::seconds(5 * i as i64),
                18.0 + noise + spike,
            ));
        }
    }
    out
}

fn bench_methods(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect");

    for size in [200usize, 1_000, 5_000] {
        let input = readings(size / METERS.len());
        group.throughput(Throughput::Elements(input.len() as u64));

        for method in [Method::ZScore, Method::Iqr] {
            let config = DetectionConfig::new(method, 20, 3.0);
            group.bench_with_input(BenchmarkId::new(method.as_str(), size), &input, |b, input| {
                b.iter(|| detect(black_box(input), &config))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_methods);
criterion_main!(benches);
