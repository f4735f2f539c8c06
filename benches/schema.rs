//! Benchmarks for parsing and formatting the schema document.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use appwrite_erd::schema::{format_source, parse};

fn bench_parse_fixture(c: &mut Criterion) {
    let raw = include_str!("../tests/fixtures/appwrite.config.json");
    c.bench_function("parse_fixture", |b| b.iter(|| parse(black_box(raw)).unwrap()));
}

fn bench_format_fixture(c: &mut Criterion) {
    let raw = include_str!("../tests/fixtures/appwrite.config.json");
    c.bench_function("format_fixture", |b| {
        b.iter(|| format_source(black_box(raw)).unwrap())
    });
}

criterion_group!(benches, bench_parse_fixture, bench_format_fixture);
criterion_main!(benches);
