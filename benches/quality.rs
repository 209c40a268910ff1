use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_data_transform::quality::report;
use rust_data_transform::types::{DataSet, Record, Value};

fn readings(n: usize) -> DataSet {
    (0..n)
        .map(|i| {
            let value = if i % 50 == 0 {
                Value::from(10_000)
            } else {
                Value::from((i % 100) as f64 / 3.0)
            };
            let note = if i % 9 == 0 {
                Value::Null
            } else {
                Value::from("ok")
            };
            Record::from_iter([
                ("sensor", Value::from(format!("s{}", i % 25))),
                ("reading", value),
                ("note", note),
            ])
        })
        .collect()
}

fn bench_quality(c: &mut Criterion) {
    let small = readings(1_000);
    let large = readings(50_000);

    c.bench_function("quality_report_1k", |b| b.iter(|| report(black_box(&small))));
    c.bench_function("quality_report_50k", |b| b.iter(|| report(black_box(&large))));
}

criterion_group!(benches, bench_quality);
criterion_main!(benches);
