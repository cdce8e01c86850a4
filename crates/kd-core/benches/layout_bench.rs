//! Criterion benchmarks for [`FluidLayout`] parsing and traversal.
//!
//! Run with:
//! ```bash
//! cargo bench --package kd-core --bench layout_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kd_core::{ColSize, Column, Content, FluidLayout, ObjQualifier, PersistedWidget, Row, Size};

// ── Layout fixture builders ───────────────────────────────────────────────────

/// Builds a layout `depth` levels deep.  Every level has two rows of three
/// widget columns plus one column holding the next level.
fn build_layout(depth: usize) -> FluidLayout {
    let widget = |n: usize| Column {
        content: Some(Content::Widget(PersistedWidget::new(ObjQualifier::Identifier {
            identifier: format!("insight-{}", n),
        }))),
        size: ColSize::xl(Size::width(4.0)),
        style: None,
    };

    let mut rows: Vec<Row> = (0..2)
        .map(|r| Row {
            columns: (0..3).map(|c| widget(r * 3 + c)).collect(),
            style: None,
            header: None,
        })
        .collect();

    if depth > 1 {
        rows[0].columns.push(Column {
            content: Some(Content::Layout(build_layout(depth - 1))),
            size: ColSize::xl(Size::width(12.0)),
            style: None,
        });
    }

    FluidLayout::new(rows)
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_parse");

    for depth in [1usize, 4, 8] {
        let json = build_layout(depth).to_json().unwrap();
        group.bench_with_input(BenchmarkId::new("depth", depth), &json, |b, json| {
            b.iter(|| FluidLayout::from_json(black_box(json)).unwrap())
        });
    }

    group.finish();
}

fn bench_traversal(c: &mut Criterion) {
    let layout = build_layout(8);
    let mut group = c.benchmark_group("layout_traversal");

    group.bench_function("widgets", |b| b.iter(|| black_box(&layout).widgets().len()));
    group.bench_function("depth", |b| b.iter(|| black_box(&layout).depth()));

    group.finish();
}

criterion_group!(benches, bench_parse, bench_traversal);
criterion_main!(benches);
