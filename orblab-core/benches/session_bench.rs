//! Criterion benchmarks for OrbLab hot paths.
//!
//! Benchmarks:
//! 1. Indicator precompute over one session (ATR, VWAP, two EMAs)
//! 2. Single-session evaluation (windows, gates, entry, exit)
//! 3. Sequential session runner over a multi-day history

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use orblab_core::domain::{split_sessions, Bar};
use orblab_core::exit::ExitRuleKind;
use orblab_core::indicators::precompute;
use orblab_core::{OrbEngine, OrbParams, SessionRunner};

// ── Helpers ──────────────────────────────────────────────────────────

/// 391 minute bars per weekday (09:30 - 16:00), deterministic sine walk.
fn make_history(days: usize) -> Vec<Bar> {
    let first = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut bars = Vec::with_capacity(days * 391);
    for d in 0..days {
        let date = first + chrono::Duration::days(d as i64);
        let open = date.and_hms_opt(9, 30, 0).unwrap();
        for m in 0..391 {
            let t = (d * 391 + m) as f64;
            let close = 100.0 + (t * 0.05).sin() * 2.0 + (m as f64 * 0.01);
            bars.push(Bar::new(
                open + chrono::Duration::minutes(m as i64),
                close - 0.02,
                close + 0.08,
                close - 0.08,
                close,
                1000.0 + (m % 37) as f64 * 50.0,
            ));
        }
    }
    bars
}

fn engine() -> OrbEngine {
    OrbEngine::new(OrbParams::default(), ExitRuleKind::ScaleOut.build()).unwrap()
}

// ── 1. Indicator precompute ──────────────────────────────────────────

fn bench_precompute(c: &mut Criterion) {
    let bars = make_history(1);
    let params = OrbParams::default();
    c.bench_function("precompute_session", |b| {
        b.iter(|| precompute(black_box(&bars), black_box(&params)))
    });
}

// ── 2. Single session ────────────────────────────────────────────────

fn bench_evaluate(c: &mut Criterion) {
    let sessions = split_sessions(&make_history(1));
    let engine = engine();
    c.bench_function("evaluate_session", |b| {
        b.iter(|| engine.evaluate(black_box("BENCH"), black_box(&sessions[0])))
    });
}

// ── 3. Session runner ────────────────────────────────────────────────

fn bench_runner(c: &mut Criterion) {
    let mut group = c.benchmark_group("session_runner");
    for days in [20usize, 250] {
        let bars = make_history(days);
        let runner = SessionRunner::new(engine());
        group.bench_with_input(BenchmarkId::from_parameter(days), &bars, |b, bars| {
            b.iter(|| runner.run(black_box("BENCH"), black_box(bars)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_precompute, bench_evaluate, bench_runner);
criterion_main!(benches);
