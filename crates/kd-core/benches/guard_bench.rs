//! Criterion benchmarks for the type-guards and full decoders.
//!
//! Guards run on every `message` event a host window receives, most of which
//! are not KD messages at all, so both the hit and the miss paths matter.
//!
//! Run with:
//! ```bash
//! cargo bench --package kd-core --bench guard_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kd_core::protocol::{
    is_dashboard_loaded_event_data, is_drill_to_url_resolved_event_data, is_set_size_command_data,
};
use kd_core::{decode_event, decode_message, get_event_type};
use serde_json::{json, Value};

// ── Fixtures ──────────────────────────────────────────────────────────────────

fn loaded_event() -> Value {
    json!({
        "product": "kpiDashboard",
        "data": {
            "type": "loaded",
            "availableCommands": ["switchToEdit", "exportToPdf", "setFilterContext"],
            "dashboardId": "abc",
            "project": "p1",
            "dashboard": "/gdc/md/p1/obj/5",
            "title": "Sales overview"
        }
    })
}

fn foreign_message() -> Value {
    json!({"source": "react-devtools", "payload": {"type": "render"}})
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_guards(c: &mut Criterion) {
    let loaded = loaded_event();
    let foreign = foreign_message();
    let mut group = c.benchmark_group("guard");

    group.bench_function("get_event_type", |b| b.iter(|| get_event_type(black_box(&loaded))));

    group.bench_function("hit", |b| {
        b.iter(|| is_dashboard_loaded_event_data(black_box(&loaded)))
    });

    group.bench_function("miss_other_kind", |b| {
        b.iter(|| is_set_size_command_data(black_box(&loaded)))
    });

    group.bench_function("miss_foreign", |b| {
        b.iter(|| is_drill_to_url_resolved_event_data(black_box(&foreign)))
    });

    group.finish();
}

fn bench_decoders(c: &mut Criterion) {
    let loaded = loaded_event();
    let mut group = c.benchmark_group("decode");

    group.bench_function("decode_event_loaded", |b| {
        b.iter(|| decode_event(black_box(&loaded)).unwrap())
    });

    group.bench_function("decode_message_loaded", |b| {
        b.iter(|| decode_message(black_box(&loaded)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_guards, bench_decoders);
criterion_main!(benches);
