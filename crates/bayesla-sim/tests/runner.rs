//! Batch runner ordering, cancellation and archive layout.

use std::sync::atomic::AtomicBool;

use bayesla_core::cqi::DEFAULT_CQI_BLER_THRESHOLD;
use bayesla_core::{AwgnTable, LinkModel, McsCatalog, PolicyKind, SimulationConfig, run_experiment};
use bayesla_sim::{BatchOutcome, ResultsArchive, Runner, summarize};

const SMALL_BATCH: &str = r#"
    [simulation]
    nrof_ttis = 200
    nrof_experiments = 12
    first_seed = 40
"#;

fn model(catalog: &McsCatalog) -> LinkModel {
    let table = AwgnTable::logistic_default(catalog).unwrap();
    LinkModel::new(table, catalog.clone(), DEFAULT_CQI_BLER_THRESHOLD).unwrap()
}

fn complete(outcome: BatchOutcome) -> Vec<bayesla_core::ExperimentResult> {
    match outcome {
        BatchOutcome::Complete(results) => results,
        other => panic!("expected a complete batch, got {other:?}"),
    }
}

#[test]
fn results_come_back_in_submission_order() {
    let cfg = SimulationConfig::from_toml_str(SMALL_BATCH).unwrap();
    let model = model(&cfg.catalog);
    let stop = AtomicBool::new(false);

    let results = complete(Runner::new(&cfg, &model, 4).run(&stop).unwrap());
    assert_eq!(results.len(), 12);
    let seeds: Vec<u64> = results.iter().map(|r| r.seed).collect();
    assert_eq!(seeds, (40..52).collect::<Vec<_>>());

    for result in &results {
        assert_eq!(*result, run_experiment(result.seed, &cfg.experiment, &model));
    }
}

#[test]
fn worker_count_does_not_change_results() {
    let cfg = SimulationConfig::from_toml_str(SMALL_BATCH).unwrap();
    let model = model(&cfg.catalog);
    let stop = AtomicBool::new(false);

    let one = complete(Runner::new(&cfg, &model, 1).run(&stop).unwrap());
    let many = complete(Runner::new(&cfg, &model, 8).run(&stop).unwrap());
    assert_eq!(one, many);
}

#[test]
fn zero_workers_is_treated_as_one() {
    let cfg = SimulationConfig::from_toml_str(SMALL_BATCH).unwrap();
    let model = model(&cfg.catalog);
    assert_eq!(Runner::new(&cfg, &model, 0).workers(), 1);
}

#[test]
fn raised_stop_flag_yields_no_results() {
    let cfg = SimulationConfig::from_toml_str(SMALL_BATCH).unwrap();
    let model = model(&cfg.catalog);
    let stop = AtomicBool::new(true);

    match Runner::new(&cfg, &model, 3).run(&stop).unwrap() {
        BatchOutcome::Cancelled { finished, total } => {
            assert_eq!(finished, 0);
            assert_eq!(total, 12);
        }
        BatchOutcome::Complete(_) => panic!("stopped batch reported complete"),
    }
}

#[test]
fn summary_pools_every_experiment() {
    let cfg = SimulationConfig::from_toml_str(SMALL_BATCH).unwrap();
    let model = model(&cfg.catalog);
    let results = complete(Runner::new(&cfg, &model, 2).run(&AtomicBool::new(false)).unwrap());

    let summary = summarize(&results, model.nrof_rates());
    assert_eq!(summary.len(), 2);
    for (kind, s) in &summary {
        assert_eq!(s.nrof_ttis, 12 * 200, "{kind}");
        assert_eq!(s.mcs_histogram.iter().sum::<usize>(), 12 * 200);
        assert!((0.0..=1.0).contains(&s.bler));
    }
    assert_eq!(summary[0].0, PolicyKind::Olla);
    assert_eq!(summary[1].0, PolicyKind::BayesLa);
}

#[test]
fn archive_has_one_row_per_experiment_and_tti() {
    let cfg = SimulationConfig::from_toml_str(SMALL_BATCH).unwrap();
    let model = model(&cfg.catalog);
    let results = complete(Runner::new(&cfg, &model, 4).run(&AtomicBool::new(false)).unwrap());

    let archive = ResultsArchive::new("synthetic", &cfg, &results);
    let json: serde_json::Value = serde_json::from_str(&archive.to_json().unwrap()).unwrap();

    assert_eq!(json["dataset"], "synthetic");
    let seeds: Vec<u64> = json["seeds"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_u64().unwrap())
        .collect();
    assert_eq!(seeds, (40..52).collect::<Vec<_>>());
    assert_eq!(json["config"]["nrof_experiments"], 12);
    assert_eq!(json["config"]["experiment"]["channel"]["nrof_ttis"], 200);

    for key in ["olla", "bayesla"] {
        for field in ["mcs", "ack", "throughput"] {
            let rows = json[key][field].as_array().unwrap();
            assert_eq!(rows.len(), 12, "{key}.{field}");
            for row in rows {
                assert_eq!(row.as_array().unwrap().len(), 200, "{key}.{field}");
            }
        }
    }

    // Archived rows match the in-memory logs.
    let bayes: bayesla_sim::PolicyArchive = serde_json::from_value(json["bayesla"].clone()).unwrap();
    assert_eq!(&bayes, archive.policy(PolicyKind::BayesLa));
    assert_eq!(bayes.mcs[3], results[3].bayesla.mcs);
    assert_eq!(bayes.throughput[3], results[3].bayesla.throughput);
}

#[test]
fn archive_writes_to_disk() {
    let cfg = SimulationConfig::from_toml_str(
        "[simulation]\nnrof_ttis = 20\nnrof_experiments = 2\n",
    )
    .unwrap();
    let model = model(&cfg.catalog);
    let results = complete(Runner::new(&cfg, &model, 2).run(&AtomicBool::new(false)).unwrap());

    let path = std::env::temp_dir().join(format!("bayesla-archive-{}.json", std::process::id()));
    ResultsArchive::new("synthetic", &cfg, &results)
        .write(&path)
        .unwrap();
    let raw = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json["olla"]["ack"].as_array().unwrap().len(), 2);
}
