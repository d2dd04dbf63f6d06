//! Driver-level checks on a small batch: log shapes, throughput values and
//! the per-experiment ownership of channel and policy state.

mod common;

use std::collections::HashSet;

use bayesla_core::{PolicyKind, SimulationConfig, run_experiment};

const BATCH: &str = r#"
    [simulation]
    nrof_ttis = 50
    nrof_experiments = 10
    first_seed = 0
    avg_snr_db = 15.0
    norm_doppler = 0.01

    [link_adaptation]
    target_bler = 0.1
    olla_step_size = 0.1
"#;

#[test]
fn ten_experiments_of_fifty_ttis() {
    let cfg = SimulationConfig::from_toml_str(BATCH).unwrap();
    let model = common::lte_model();
    let results: Vec<_> = cfg
        .seeds()
        .map(|seed| run_experiment(seed, &cfg.experiment, &model))
        .collect();

    assert_eq!(results.len(), 10);
    assert_eq!(
        results.iter().map(|r| r.seed).collect::<Vec<_>>(),
        (0..10).collect::<Vec<_>>()
    );

    let allowed: HashSet<u32> = cfg
        .catalog
        .packet_sizes()
        .into_iter()
        .chain(std::iter::once(0))
        .collect();

    for result in &results {
        for kind in PolicyKind::ALL {
            let log = result.log(kind);
            assert_eq!(log.len(), 50, "{kind} seed {}", result.seed);
            assert_eq!(log.ack.len(), 50);
            assert_eq!(log.throughput.len(), 50);
            for outcome in log.iter() {
                assert!(allowed.contains(&outcome.throughput));
                assert!(outcome.mcs < cfg.catalog.len());
                if outcome.ack {
                    assert_eq!(outcome.throughput, cfg.catalog.packet_size(outcome.mcs));
                } else {
                    assert_eq!(outcome.throughput, 0);
                }
            }
        }
    }
}

#[test]
fn experiments_do_not_share_state() {
    // Running a seed alone or after other seeds gives the same logs.
    let cfg = SimulationConfig::from_toml_str(BATCH).unwrap();
    let model = common::lte_model();
    let alone = run_experiment(7, &cfg.experiment, &model);
    for seed in 0..7 {
        run_experiment(seed, &cfg.experiment, &model);
    }
    assert_eq!(run_experiment(7, &cfg.experiment, &model), alone);
}
