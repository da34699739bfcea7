//! Benchmarks for snapshot parsing and the search filter

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use statusboard::monitor::parse_snapshot;
use statusboard::viewmodel::ViewState;

fn snapshot_body(n: usize, legacy: bool) -> String {
    let rows: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            if legacy {
                json!({
                    "url": format!("https://service-{i}.example.com/health"),
                    "status": if i % 7 == 0 { "down" } else { "up" },
                    "status_code": 200,
                    "last_checked": "2024-05-01 12:00:00",
                    "uptime": 99.5
                })
            } else {
                json!({
                    "url": format!("https://service-{i}.example.com/health"),
                    "isUp": i % 7 != 0,
                    "statusCode": 200,
                    "responseTimeMs": 42.0,
                    "lastCheckedAt": "2024-05-01T12:00:00Z",
                    "uptimePercentage": 99.5
                })
            }
        })
        .collect();
    serde_json::Value::Array(rows).to_string()
}

fn bench_parse_snapshot(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_snapshot");
    for n in [10, 100, 1000] {
        let canonical = snapshot_body(n, false);
        let legacy = snapshot_body(n, true);
        group.bench_with_input(BenchmarkId::new("canonical", n), &canonical, |b, body| {
            b.iter(|| black_box(parse_snapshot(black_box(body)).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("legacy", n), &legacy, |b, body| {
            b.iter(|| black_box(parse_snapshot(black_box(body)).unwrap()))
        });
    }
    group.finish();
}

fn bench_filtered_services(c: &mut Criterion) {
    let services = parse_snapshot(&snapshot_body(1000, false)).unwrap();
    let mut state = ViewState::seeded(Some(services));

    let mut group = c.benchmark_group("filtered_services");
    for term in ["", "SERVICE-99", "no-match"] {
        state.search_term = term.to_string();
        group.bench_with_input(BenchmarkId::from_parameter(term), &state, |b, state| {
            b.iter(|| black_box(state.filtered_services().count()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse_snapshot, bench_filtered_services);
criterion_main!(benches);
