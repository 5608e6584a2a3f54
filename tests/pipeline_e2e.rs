use std::path::Path;

use asote_eval::metrics::format_percent;
use asote_eval::report::PrfGranularity;
use asote_eval::runner::evaluate_run;
use asote_eval::{run, run_with_gold, EvalConfig, GoldRecord, GoldStandard};
use tempfile::tempdir;

const SENTENCE: &str = "The food was great";

const GOLD_LINE: &str = r#"{"sentence": "The food was great", "opinions": [{"aspect_term": {"term": "food", "start": 4, "end": 8}, "opinion_term": {"term": "great", "start": 13, "end": 18}, "polarity": "positive"}]}"#;
const ATE_LINE: &str = r#"{"text": "The food was great", "pred": [{"term": "food", "start": 4, "end": 8}]}"#;
const TOWE_LINE: &str = r#"{"text": "The food was great", "aspect_terms": ["food-4-8"], "pred": ["great-13-18"]}"#;
const TOSC_LINE: &str = r#"{"text": "The food was great", "opinion": {"aspect_term": {"term": "food", "start": 4, "end": 8}, "opinion_term": {"term": "great", "start": 13, "end": 18}}, "sentiment_pred": "positive"}"#;

fn gold() -> GoldStandard {
    let record: GoldRecord = serde_json::from_str(GOLD_LINE).unwrap();
    GoldStandard::from_records("ASOTEDataRest14", &[record])
}

fn write_run(root: &Path, index: usize) {
    for (subtask, line) in [("ate", ATE_LINE), ("towe", TOWE_LINE), ("tosc", TOSC_LINE)] {
        let dir = root.join(subtask);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{index}.txt")), format!("{line}\n")).unwrap();
    }
}

fn config(root: &Path) -> EvalConfig {
    let template = |subtask: &str| root.join(subtask).join("%d.txt").display().to_string();
    EvalConfig::new(
        "ASOTEDataRest14",
        template("ate"),
        template("towe"),
        template("tosc"),
    )
}

#[test]
fn perfect_run_scores_one_hundred() {
    let dir = tempdir().unwrap();
    write_run(dir.path(), 0);
    let paths = config(dir.path()).run_paths(0).unwrap();

    let metrics = evaluate_run(0, &paths, &gold(), Default::default()).unwrap();
    assert_eq!(format_percent(metrics.asote.precision), "100.000");
    assert_eq!(format_percent(metrics.asote.recall), "100.000");
    assert_eq!(format_percent(metrics.asote.f1), "100.000");
    assert_eq!(metrics.asote.counts.tp, 1);
    assert_eq!(format_percent(metrics.ate.f1), "100.000");
    assert_eq!(format_percent(metrics.towe.f1), "100.000");
    assert_eq!(format_percent(metrics.atsa.accuracy), "100.000");
}

#[test]
fn missing_run_is_skipped_not_fatal() {
    let dir = tempdir().unwrap();
    for index in 0..5 {
        write_run(dir.path(), index);
    }
    std::fs::remove_file(dir.path().join("tosc").join("2.txt")).unwrap();

    let report = run_with_gold(&config(dir.path()), &gold()).unwrap();
    assert_eq!(report.runs.len(), 4);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].run_index, 2);
    assert!(report.skipped[0].missing.ends_with("tosc/2.txt"));

    let series = report.prf_series(PrfGranularity::Asote);
    assert_eq!(series.f1s, "100.000,100.000,100.000,100.000");
}

#[test]
fn wrong_polarity_breaks_triplet_but_not_opinion_pair() {
    let dir = tempdir().unwrap();
    write_run(dir.path(), 0);
    std::fs::write(
        dir.path().join("tosc").join("0.txt"),
        TOSC_LINE.replace("\"positive\"", "\"negative\""),
    )
    .unwrap();
    let mut cfg = config(dir.path());
    cfg.run_count = 1;

    let report = run_with_gold(&cfg, &gold()).unwrap();
    let metrics = &report.runs[0];
    assert_eq!(metrics.asote.counts.tp, 0);
    assert_eq!(metrics.asote.f1, 0.0);
    assert_eq!(format_percent(metrics.towe.f1), "100.000");
    assert_eq!(metrics.atsa.correct, 0);
}

#[test]
fn malformed_record_aborts_the_evaluation() {
    let dir = tempdir().unwrap();
    write_run(dir.path(), 0);
    std::fs::write(
        dir.path().join("towe").join("0.txt"),
        format!("{{\"text\": \"{SENTENCE}\", \"pred\": []}}\n"),
    )
    .unwrap();
    let mut cfg = config(dir.path());
    cfg.run_count = 1;

    let err = run_with_gold(&cfg, &gold()).unwrap_err();
    assert_eq!(err.code(), "malformed_record");
}

#[test]
fn run_loads_gold_from_configured_file() {
    let dir = tempdir().unwrap();
    write_run(dir.path(), 0);
    let gold_path = dir.path().join("test.txt");
    std::fs::write(&gold_path, format!("{GOLD_LINE}\n")).unwrap();

    let mut cfg = config(dir.path());
    cfg.gold_path = Some(gold_path);
    cfg.run_count = 2;

    let report = run(&cfg).unwrap();
    assert_eq!(report.dataset, "ASOTEDataRest14");
    assert_eq!(report.runs.len(), 1);
    assert_eq!(report.skipped.len(), 1);
}
