#![forbid(unsafe_code)]

use super::*;
use crate::records::ReplayRecord;
use serde_json::json;
use std::path::PathBuf;
use tm_core::ids::SolutionId;
use tm_core::{SolutionFetcher, SortKey, SortOrder};

const LOG: &str = r#"
# pick and place
{"kind":"description","stages":[{"id":1,"parent_id":0,"name":"task"},{"id":2,"parent_id":1,"name":"grasp","flags":3}]}
{"kind":"statistics","stages":[{"id":1,"solved":[5]},{"id":2,"solved":[4,3],"failed":[6]}]}
{"kind":"solution","top_level_id":5,"sub_solution":[{"stage_id":1,"id":5,"cost":1.5},{"stage_id":2,"id":4,"cost":1.5}],"sub_trajectory":[{"stage_id":2,"id":4,"cost":1.5,"name":"lift"}]}
{"kind":"description","stages":[{"id":3,"parent_id":1,"name":"place"},{"id":9,"parent_id":8,"name":"orphan"}]}
"#;

fn no_env(_: &str) -> Option<String> {
    None
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn replay_config(values: &[&str]) -> ReplayConfig {
    match config::parse_args(&args(values), no_env).expect("parse args") {
        Invocation::Replay(cfg) => cfg,
        Invocation::Help => panic!("unexpected help"),
    }
}

#[test]
fn flags_override_environment() {
    let env = |name: &str| match name {
        "TM_LOG" => Some("/tmp/from_env.jsonl".to_string()),
        "TM_SORT" => Some("name".to_string()),
        "TM_MAX_COST" => Some("4".to_string()),
        _ => None,
    };
    let Invocation::Replay(cfg) =
        config::parse_args(&args(&["--sort", "quality:desc", "--lookup", "7"]), env)
            .expect("parse")
    else {
        panic!("expected replay");
    };

    assert_eq!(cfg.log, Some(PathBuf::from("/tmp/from_env.jsonl")));
    assert_eq!(cfg.sort, Some((SortKey::Quality, SortOrder::Descending)));
    assert_eq!(cfg.max_cost, Some(4.0));
    assert_eq!(cfg.lookups, vec![SolutionId::new(7)]);
    assert!(!cfg.observe);
}

#[test]
fn bad_arguments_are_usage_errors() {
    assert!(config::parse_args(&args(&["--max-cost", "cheap"]), no_env).is_err());
    assert!(config::parse_args(&args(&["--sort", "quality:sideways"]), no_env).is_err());
    assert!(config::parse_args(&args(&["--sort", "cost"]), no_env).is_err());
    assert!(config::parse_args(&args(&["--lookup"]), no_env).is_err());
    assert!(config::parse_args(&args(&["--frobnicate"]), no_env).is_err());
    assert_eq!(
        config::parse_args(&args(&["--lookup", "x", "-h"]), no_env),
        Ok(Invocation::Help)
    );
    assert_eq!(replay_config(&["--log", "-"]).log, None);
}

#[test]
fn records_parse_and_report_line_numbers() {
    let records = records::read_records(LOG.as_bytes()).expect("read log");
    assert_eq!(records.len(), 4);
    assert!(matches!(records[2], ReplayRecord::Solution(_)));

    let err = records::read_records("\n{\"kind\":\"unknown\"}\n".as_bytes())
        .expect_err("unknown kind");
    assert!(matches!(err, ReplayError::Record { line: 2, .. }));
}

#[test]
fn archive_serves_only_recorded_solutions() {
    let mut fetcher = ArchiveFetcher::from_messages(vec![tm_core::SolutionMessage {
        top_level_id: SolutionId::new(9),
        ..Default::default()
    }]);
    assert_eq!(fetcher.len(), 1);
    assert!(fetcher.fetch(SolutionId::new(9)).is_ok());
    assert!(fetcher.fetch(SolutionId::new(10)).is_err());
}

#[test]
fn replay_snapshot_reflects_the_stream() {
    let records = records::read_records(LOG.as_bytes()).expect("read log");
    let cfg = replay_config(&[
        "--observe", "--sort", "quality:desc", "--lookup", "4", "--lookup", "3",
    ]);
    let outcome = replay::replay(&cfg, records, None);
    let snapshot = snapshot::render(&outcome);

    assert_eq!(snapshot["records"], json!(4));
    assert_eq!(snapshot["destroyed"], json!(false));
    assert_eq!(snapshot["errors"].as_array().map(|e| e.len()), Some(1));
    assert_eq!(
        snapshot["columns"]["tree"][0],
        json!({ "header": "name", "editable": true })
    );
    assert_eq!(snapshot["columns"]["tree"][1]["editable"], json!(false));
    assert_eq!(snapshot["columns"]["solutions"], json!(["#", "cost", "name"]));

    let grasp = &snapshot["stages"][0]["children"][0];
    assert_eq!(grasp["name"], json!("grasp"));
    assert_eq!(grasp["flags"], json!(["reads_start", "reads_end"]));
    assert_eq!(grasp["successful"], json!(2));
    assert_eq!(grasp["failed"], json!(1));
    // best first: 4 was ranked first in the statistics
    assert_eq!(grasp["solutions"][0]["id"], json!(4));
    assert_eq!(grasp["solutions"][0]["name"], json!("lift"));
    assert_eq!(grasp["solutions"][0]["cost"], json!(1.5));
    assert_eq!(grasp["solutions"][1]["cost"], Value::Null);

    assert_eq!(snapshot["lookups"][0]["found"], json!(true));
    assert_eq!(snapshot["lookups"][1]["found"], json!(false));
    // stage 1 was expanded before "place" arrived
    assert_eq!(outcome.notifications.rows_inserted, 1);
    assert!(outcome.notifications.tree_data_changed >= 1);
    assert!(outcome.notifications.layout_changes >= 2);
}

#[test]
fn observe_all_marks_every_stage() {
    let records = records::read_records(LOG.as_bytes()).expect("read log");
    let outcome = replay::replay(&replay_config(&[]), records, None);
    let tree = outcome.task.tree();
    assert!(!tree.node(tm_core::ids::StageId::new(2)).is_some_and(|n| n.was_observed()));

    replay::observe_all(tree);
    assert!(tree.node(tm_core::ids::StageId::new(2)).is_some_and(|n| n.was_observed()));
}
