use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_data_transform::execution::TransformationEngine;
use rust_data_transform::step::{StepKind, TransformationStep};
use rust_data_transform::types::{DataSet, Record, Value};
use serde_json::json;

fn orders(n: usize) -> DataSet {
    (0..n)
        .map(|i| {
            Record::from_iter([
                ("id", Value::from(i as i64)),
                ("region", Value::from(["north", "south", "east", "west"][i % 4])),
                ("price", Value::from(format!(" {}.{} ", i % 97, i % 10))),
                ("qty", Value::from((i % 7) as i64)),
            ])
        })
        .collect()
}

fn pipeline() -> Vec<TransformationStep> {
    vec![
        TransformationStep::new(StepKind::TrimWhitespace, "Trim"),
        TransformationStep::new(StepKind::ChangeDataTypes, "Price as number")
            .with_parameter("column", json!("price"))
            .with_parameter("target_type", json!("number")),
        TransformationStep::new(StepKind::FilterRows, "Ordered something")
            .with_parameter("condition", json!("qty > 0 AND region != 'west'")),
        TransformationStep::new(StepKind::FeatureEngineering, "Total")
            .with_parameter("new_column", json!("total"))
            .with_parameter("formula", json!("price * qty")),
        TransformationStep::new(StepKind::GroupByAggregation, "Total per region")
            .with_parameter("group_by_columns", json!(["region"]))
            .with_parameter("agg_column", json!("total"))
            .with_parameter("agg_function", json!("sum")),
    ]
}

fn bench_pipelines(c: &mut Criterion) {
    let engine = TransformationEngine::default();
    let steps = pipeline();

    let mut group = c.benchmark_group("execute_pipeline");
    for rows in [1_000usize, 10_000] {
        let ds = orders(rows);
        group.bench_with_input(BenchmarkId::new("full", rows), &ds, |b, ds| {
            b.iter(|| engine.execute(black_box(ds), black_box(&steps), false))
        });
        group.bench_with_input(BenchmarkId::new("preview", rows), &ds, |b, ds| {
            b.iter(|| engine.execute(black_box(ds), black_box(&steps), true))
        });
    }
    group.finish();
}

fn bench_one_hot(c: &mut Criterion) {
    let engine = TransformationEngine::default();
    let ds = orders(10_000);
    let steps = vec![TransformationStep::new(StepKind::OneHotEncoding, "Encode region")
        .with_parameter("columns", json!(["region"]))];
    c.bench_function("one_hot_10k", |b| b.iter(|| engine.execute(black_box(&ds), &steps, false)));
}

criterion_group!(benches, bench_pipelines, bench_one_hot);
criterion_main!(benches);
