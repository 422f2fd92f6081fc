//! Resolver benchmarks.
//!
//! The resolver sits on the widget-script hot path, so a full cascade
//! walk (worst case: every branch misses) should stay in the nanosecond
//! range.

use criterion::{criterion_group, criterion_main, Criterion};
use madi_core::{resolve, TriggerContext, UtmBundle};
use std::hint::black_box;

fn campaign_context() -> TriggerContext {
    TriggerContext {
        pathname: Some("/pricing".to_string()),
        utm: UtmBundle {
            campaign: Some("Diwali_Sale".to_string()),
            source: Some("google".to_string()),
            ..UtmBundle::default()
        },
        ..TriggerContext::default()
    }
}

fn fallback_context() -> TriggerContext {
    TriggerContext {
        seen: Some(true),
        ..TriggerContext::default()
    }
}

fn bench_resolve(c: &mut Criterion) {
    let campaign = campaign_context();
    c.bench_function("resolve_campaign", |b| {
        b.iter(|| resolve(black_box(&campaign)));
    });

    let fallback = fallback_context();
    c.bench_function("resolve_full_cascade_miss", |b| {
        b.iter(|| resolve(black_box(&fallback)));
    });
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
