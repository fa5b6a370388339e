//! Benchmarks for rendering markdown to a node tree and HTML.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use newsdesk::render::{render, to_html};

fn bench_render_article(c: &mut Criterion) {
    let md = include_str!("../tests/fixtures/article.md");
    c.bench_function("render_article", |b| b.iter(|| render(black_box(md))));
}

fn bench_render_html(c: &mut Criterion) {
    let tree = render(include_str!("../tests/fixtures/article.md"));
    c.bench_function("render_html", |b| b.iter(|| to_html(black_box(&tree))));
}

criterion_group!(benches, bench_render_article, bench_render_html);
criterion_main!(benches);
