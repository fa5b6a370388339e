//! Benchmarks for markdown parsing and serialization.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use newsdesk::document::BlockDocument;

fn bench_parse_simple(c: &mut Criterion) {
    let md = "# Hello\n\nWorld";
    c.bench_function("parse_simple", |b| {
        b.iter(|| BlockDocument::from_markdown(black_box(md)))
    });
}

fn bench_parse_article(c: &mut Criterion) {
    let md = include_str!("../tests/fixtures/article.md");
    c.bench_function("parse_article", |b| {
        b.iter(|| BlockDocument::from_markdown(black_box(md)))
    });
}

fn bench_serialize_article(c: &mut Criterion) {
    let doc = BlockDocument::from_markdown(include_str!("../tests/fixtures/article.md"));
    c.bench_function("serialize_article", |b| b.iter(|| black_box(&doc).to_markdown()));
}

criterion_group!(
    benches,
    bench_parse_simple,
    bench_parse_article,
    bench_serialize_article
);
criterion_main!(benches);
