//! Per-TTI decision latency for the link-adaptation controllers.
//!
//! Measures:
//! - OLLA act/update with the LTE catalog
//! - BayesLA Thompson step (15 Beta draws) plus posterior update
//! - Channel trace generation per TTI
//!
//! Run with: cargo bench --package bayesla-core

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::SeedableRng;
use rand::rngs::StdRng;

use bayesla_core::channel::{ChannelParams, ChannelSimulator};
use bayesla_core::cqi::DEFAULT_CQI_BLER_THRESHOLD;
use bayesla_core::policy::{BayesLa, BayesLaConfig, LinkAdaptation, Olla, OllaConfig};
use bayesla_core::{AwgnTable, LinkModel, McsCatalog};

fn model() -> LinkModel {
    let catalog = McsCatalog::lte();
    let table = AwgnTable::logistic_default(&catalog).unwrap();
    LinkModel::new(table, catalog, DEFAULT_CQI_BLER_THRESHOLD).unwrap()
}

fn bench_olla_step(c: &mut Criterion) {
    let model = model();
    let mut group = c.benchmark_group("olla_step");
    let mut olla = Olla::new(&model, OllaConfig::default());
    let mut tti = 0u32;

    group.throughput(Throughput::Elements(1));
    group.bench_function("act_update", |b| {
        b.iter(|| {
            let cqi = (tti % 16) as u8;
            let mcs = olla.act(black_box(cqi));
            olla.update(mcs, cqi, tti % 10 != 0);
            tti = tti.wrapping_add(1);
            black_box(mcs)
        });
    });
    group.finish();
}

fn bench_bayesla_step(c: &mut Criterion) {
    let model = model();
    let mut group = c.benchmark_group("bayesla_step");
    let mut la = BayesLa::new(&model, BayesLaConfig::default(), StdRng::seed_from_u64(7));
    let mut tti = 0u32;

    group.throughput(Throughput::Elements(1));
    group.bench_function("act_update", |b| {
        b.iter(|| {
            let cqi = (tti % 16) as u8;
            let mcs = la.act(black_box(cqi));
            la.update(mcs, cqi, tti % 10 != 0);
            tti = tti.wrapping_add(1);
            black_box(mcs)
        });
    });
    group.bench_function("act_only_cqi9", |b| {
        b.iter(|| black_box(la.act(black_box(9))));
    });
    group.finish();
}

fn bench_channel_trace(c: &mut Criterion) {
    let model = model();
    let mut group = c.benchmark_group("channel_trace");
    let nrof_ttis = 1_000;
    let sim = ChannelSimulator::new(
        &model,
        ChannelParams {
            nrof_ttis,
            ..ChannelParams::default()
        },
    );

    group.throughput(Throughput::Elements(nrof_ttis as u64));
    group.bench_function("1000_ttis", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed += 1;
            black_box(sim.run_seeded(seed))
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_olla_step,
    bench_bayesla_step,
    bench_channel_trace,
);
criterion_main!(benches);
