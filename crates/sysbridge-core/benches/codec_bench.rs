//! Criterion benchmarks for the System Bridge JSON codec.
//!
//! Measures the per-frame cost of encoding outbound commands and decoding
//! inbound data updates, including the registry lookup and schema decode the
//! receive loop performs for every push.
//!
//! Run with:
//! ```bash
//! cargo bench --package sysbridge-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use sysbridge_core::{
    decode_inbound, encode_command, encode_inbound, Command, InboundEnvelope, ModelRegistry,
    Notification,
};

// ── Fixtures ──────────────────────────────────────────────────────────────────

fn commands() -> Vec<(&'static str, Command)> {
    vec![
        ("get_directories", Command::GetDirectories),
        (
            "register_data_listener",
            Command::RegisterDataListener {
                modules: vec!["battery".into(), "display".into()],
            },
        ),
        (
            "get_files",
            Command::GetFiles {
                base: "documents".into(),
                path: Some("Reports/2024".into()),
            },
        ),
    ]
}

fn battery_update() -> String {
    encode_inbound(&InboundEnvelope::new(Notification::DataUpdate {
        module: Some("battery".into()),
        data: Some(json!({
            "id": "evt",
            "is_charging": true,
            "percentage": 87.5,
            "last_updated": {"is_charging": 1700000000.0, "percentage": 1700000000.0},
        })),
    }))
}

fn files_listing(entries: usize) -> String {
    let file = json!({
        "name": "q3.pdf", "path": "Reports/q3.pdf", "fullpath": "/home/u/Documents/Reports/q3.pdf",
        "size": 2048, "last_accessed": 1.0, "created": 2.0, "modified": 3.0,
        "is_directory": false, "is_file": true, "is_link": false, "mime_type": "application/pdf",
    });
    let files = vec![file; entries];
    encode_inbound(&InboundEnvelope::new(Notification::Files(json!({
        "files": files,
        "path": "Reports",
    }))))
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_command");
    for (name, cmd) in commands() {
        group.bench_with_input(BenchmarkId::from_parameter(name), &cmd, |b, cmd| {
            b.iter(|| encode_command(black_box(cmd), "api-key", Some("request-id")))
        });
    }
    group.finish();
}

fn bench_decode_data_update(c: &mut Criterion) {
    let text = battery_update();
    let registry = ModelRegistry::standard();

    c.bench_function("decode_battery_update", |b| {
        b.iter(|| {
            let env = decode_inbound(black_box(&text)).expect("decode");
            if let Notification::DataUpdate {
                module: Some(name),
                data: Some(data),
            } = env.notification
            {
                let module = registry.resolve(&name).expect("registered");
                black_box(module.decode(data).expect("schema"));
            }
        })
    });
}

fn bench_decode_files(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_files_listing");
    for entries in [1usize, 50, 500] {
        let text = files_listing(entries);
        group.bench_with_input(BenchmarkId::from_parameter(entries), &text, |b, text| {
            b.iter(|| decode_inbound(black_box(text)).expect("decode"))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode_data_update, bench_decode_files);
criterion_main!(benches);
