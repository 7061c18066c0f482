use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::sync::Arc;
use stmtkit::{EntitySchema, FieldDescriptor, MySql, Postgres, QueryBuilder, SelectArg, SqlType};

/// Schema with an id and `n` integer columns named col0, col1, ...
fn wide_schema(n: usize) -> Arc<EntitySchema> {
    let mut builder = EntitySchema::builder("Wide", "wide")
        .field(FieldDescriptor::generated_id("id", SqlType::BigInt));
    for i in 0..n {
        builder = builder.field(FieldDescriptor::new(format!("col{i}"), SqlType::Integer));
    }
    builder.build().unwrap()
}

/// SELECT col0, ... FROM wide WHERE col0 = $1 AND col1 = $2 ...
fn build_select(schema: &Arc<EntitySchema>, n: usize) -> QueryBuilder {
    let columns: Vec<String> = (0..n).map(|i| format!("col{i}")).collect();
    let mut qb = QueryBuilder::new(Arc::new(Postgres), schema.clone());
    qb.select_columns(&columns).unwrap();
    let filter = qb.filter();
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            filter.and().unwrap();
        }
        filter.eq(column, SelectArg::with_value(i as i32)).unwrap();
    }
    qb
}

fn bench_prepare(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/prepare");

    for n in [1, 5, 10, 50] {
        let schema = wide_schema(n);
        let qb = build_select(&schema, n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &qb, |b, qb| {
            b.iter(|| black_box(qb.prepare().unwrap()));
        });
    }

    group.finish();
}

fn bench_build_and_prepare(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/build_and_prepare");

    for n in [1, 5, 10, 50] {
        let schema = wide_schema(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let qb = build_select(&schema, n);
                black_box(qb.prepare().unwrap());
            });
        });
    }

    group.finish();
}

fn bench_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/in_list");
    let schema = wide_schema(1);

    for n in [5, 20, 100, 500] {
        let values: Vec<i32> = (0..n).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &values, |b, values| {
            b.iter(|| {
                let mut qb = QueryBuilder::new(Arc::new(MySql), schema.clone());
                qb.filter().in_list("col0", values.iter().copied()).unwrap();
                black_box(qb.to_sql().unwrap());
            });
        });
    }

    group.finish();
}

fn bench_sub_query(c: &mut Criterion) {
    let schema = wide_schema(2);
    let mut inner = QueryBuilder::new(Arc::new(MySql), schema.clone());
    inner.select_raw("MAX(col1)").unwrap();
    inner.filter().gt("col0", 10).unwrap();

    c.bench_function("render/sub_query", |b| {
        b.iter(|| {
            let mut qb = QueryBuilder::new(Arc::new(MySql), schema.clone());
            qb.filter().in_query("col1", &inner).unwrap();
            qb.set_count_of(true);
            black_box(qb.prepare().unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_prepare,
    bench_build_and_prepare,
    bench_in_list,
    bench_sub_query
);
criterion_main!(benches);
