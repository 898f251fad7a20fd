use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

fn write_network(dir: &TempDir, name: &str, network: &Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(network).unwrap()).unwrap();
    path
}

fn four_cycle() -> Value {
    json!({
        "nodes": [
            {"id": "A", "role": "substation", "demand": -3.0},
            {"id": "B", "role": "consumer", "demand": 1.0},
            {"id": "C", "role": "consumer", "demand": 1.0},
            {"id": "D", "role": "consumer", "demand": 1.0}
        ],
        "lines": [
            {"from": "A", "to": "B", "resistance": 0.1, "capacity": 5.0, "length": 1.0},
            {"from": "B", "to": "C", "resistance": 0.2, "capacity": 5.0, "length": 2.0},
            {"from": "C", "to": "D", "resistance": 0.3, "capacity": 5.0, "length": 3.0},
            {"from": "D", "to": "A", "resistance": 0.4, "capacity": 5.0, "length": 4.0}
        ]
    })
}

fn gridopt() -> Command {
    Command::cargo_bin("gridopt").unwrap()
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn gridopt_analyze_prints_registry() {
    let dir = tempdir().unwrap();
    let network = write_network(&dir, "cycle.json", &four_cycle());

    let output = gridopt()
        .args(["analyze", path_arg(&network)])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["spanning_tree"]["optimized_length"], 6.0);
    let reduction = report["spanning_tree"]["reduction_percent"].as_f64().unwrap();
    assert!((reduction - 40.0).abs() < 1e-9);
    assert!(report["min_cost_flow"]["assignment"]["total_cost"].is_number());
    assert!(report["connectivity"]["is_connected"].as_bool().unwrap());
    assert!(report["losses"]["reduction_percent"].is_number());
}

#[test]
fn gridopt_analyze_writes_report_file() {
    let dir = tempdir().unwrap();
    let network = write_network(&dir, "cycle.json", &four_cycle());
    let out = dir.path().join("report.json");

    gridopt()
        .args(["analyze", path_arg(&network), "-o", path_arg(&out)])
        .assert()
        .success();
    let report: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(report["spanning_tree"]["kind"], "spanning_tree");
}

#[test]
fn gridopt_mst_honours_method_flag() {
    let dir = tempdir().unwrap();
    let network = write_network(&dir, "cycle.json", &four_cycle());

    gridopt()
        .args(["mst", path_arg(&network), "--method", "prim"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"method\": \"prim\""))
        .stdout(predicate::str::contains("\"is_spanning_tree\": true"));
}

#[test]
fn gridopt_flow_reports_unbalanced_demand() {
    let dir = tempdir().unwrap();
    let mut unbalanced = four_cycle();
    unbalanced["nodes"][3]["demand"] = json!(2.0);
    let network = write_network(&dir, "unbalanced.json", &unbalanced);

    gridopt()
        .args(["flow", path_arg(&network)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unbalanced demand"));
}

#[test]
fn gridopt_rejects_missing_line_attribute() {
    let dir = tempdir().unwrap();
    let mut broken = four_cycle();
    broken["lines"][0]
        .as_object_mut()
        .unwrap()
        .remove("resistance");
    let network = write_network(&dir, "broken.json", &broken);

    gridopt()
        .args(["validate", path_arg(&network)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing attribute 'resistance'"));
}

#[test]
fn gridopt_validate_flags_islands() {
    let dir = tempdir().unwrap();
    let mut islanded = four_cycle();
    islanded["nodes"]
        .as_array_mut()
        .unwrap()
        .push(json!({"id": "J", "role": "junction", "demand": 0.0}));
    let network = write_network(&dir, "islanded.json", &islanded);

    gridopt()
        .args(["validate", path_arg(&network)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Isolated node"))
        .stdout(predicate::str::contains("2 islands"));
}

#[test]
fn gridopt_centrality_uses_config_file() {
    let dir = tempdir().unwrap();
    let network = write_network(&dir, "cycle.json", &four_cycle());
    let config = dir.path().join("gridopt.toml");
    fs::write(&config, "[centrality]\nweight = \"length\"\n").unwrap();

    gridopt()
        .args([
            "centrality",
            path_arg(&network),
            "--config",
            path_arg(&config),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"most_critical_node\": \"B\""));
}

#[test]
fn gridopt_config_prints_defaults() {
    gridopt()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("current_amps = 100.0"))
        .stdout(predicate::str::contains("method = \"kruskal\""));
}
