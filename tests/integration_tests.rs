//! Integration tests for TQA CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a tqa command isolated from the user's config
fn tqa(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tqa").unwrap();
    cmd.current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join(".config"))
        .env_remove("TQA_SIMILARITY_THRESHOLD")
        .env_remove("TQA_SUBGROUP_SIZE")
        .env_remove("TQA_HISTORY_WINDOW")
        .env_remove("RUST_LOG");
    cmd
}

fn measurement_series(n: usize) -> String {
    (0..n)
        .map(|i| format!("{:.1}", 10.0 + (i % 5) as f64 * 0.1))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    tqa(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("SPC artifacts"))
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    tqa(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("tqa"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    tqa(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tqa"));
}

// ============================================================================
// Extract Command Tests
// ============================================================================

#[test]
fn test_extract_defects_json() {
    let tmp = TempDir::new().unwrap();
    tqa(&tmp)
        .args([
            "extract",
            "Surface scratch 15, Dimensional error 8",
            "--kind",
            "defect",
            "-f",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Surface scratch\""))
        .stdout(predicate::str::contains("\"Dimensional error\""))
        .stdout(predicate::str::contains("\"total_defects\": 23"))
        .stdout(predicate::str::contains("\"source\": \"regex_extraction\""));
}

#[test]
fn test_extract_text_output_reports_validation() {
    let tmp = TempDir::new().unwrap();
    tqa(&tmp)
        .args(["extract", "Scratch 2, Dent 1", "--kind", "defect"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Defect data"))
        .stdout(predicate::str::contains("Low sample size"));
}

#[test]
fn test_extract_nothing_fails() {
    let tmp = TempDir::new().unwrap();
    tqa(&tmp)
        .args(["extract", "hello there"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tqa::extract::no_data"));
}

// ============================================================================
// Analyze Command Tests
// ============================================================================

#[test]
fn test_analyze_pareto_table() {
    let tmp = TempDir::new().unwrap();
    tqa(&tmp)
        .args(["analyze", "pareto", "Scratch 50, Dent 30, Burr 20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pareto Chart"))
        .stdout(predicate::str::contains("| Rank"))
        .stdout(predicate::str::contains("Scratch"));
}

#[test]
fn test_analyze_individuals_chart_json() {
    let tmp = TempDir::new().unwrap();
    tqa(&tmp)
        .args(["analyze", "control", &measurement_series(20), "--individuals", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"tool\": \"control_chart\""))
        .stdout(predicate::str::contains("\"mode\": \"individuals\""));
}

#[test]
fn test_analyze_xbar_subgroup_size_option() {
    let tmp = TempDir::new().unwrap();
    tqa(&tmp)
        .args(["analyze", "control", &measurement_series(20), "--subgroup-size", "4", "-f", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mode: xbar_r"))
        .stdout(predicate::str::contains("subgroup_size: 4"));
}

#[test]
fn test_analyze_capability_needs_thirty_points() {
    let tmp = TempDir::new().unwrap();
    tqa(&tmp)
        .args(["analyze", "capability", "10.1, 10.2, 9.9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tqa::validation::insufficient_data"));
}

#[test]
fn test_analyze_capability_needs_spec_limits() {
    let tmp = TempDir::new().unwrap();
    tqa(&tmp)
        .args(["analyze", "capability", &measurement_series(30)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tqa::validation::missing_spec_limits"));
}

#[test]
fn test_analyze_rejects_unknown_tool() {
    let tmp = TempDir::new().unwrap();
    tqa(&tmp)
        .args(["analyze", "scatter", "1, 2, 3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("scatter"));
}

// ============================================================================
// Recommend Command Tests
// ============================================================================

#[test]
fn test_recommend_with_sufficient_data() {
    let tmp = TempDir::new().unwrap();
    tqa(&tmp)
        .args([
            "recommend",
            "generate pareto chart",
            "--evidence",
            "Scratch 15, Dent 8, Burr 4",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("I can generate a Pareto Chart for you!"))
        .stdout(predicate::str::contains("sufficient data"));
}

#[test]
fn test_recommend_asks_for_more_data() {
    let tmp = TempDir::new().unwrap();
    tqa(&tmp)
        .args(["recommend", "build histogram", "-e", "10.1, 10.2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("I need more Process Data"))
        .stdout(predicate::str::contains("Can you provide more measurement data?"));
}

#[test]
fn test_recommend_json() {
    let tmp = TempDir::new().unwrap();
    tqa(&tmp)
        .args(["recommend", "create fishbone diagram", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"matched\": true"))
        .stdout(predicate::str::contains("\"fishbone_diagram\""))
        .stdout(predicate::str::contains("\"should_generate\": false"));
}

#[test]
fn test_recommend_natural_request_with_data() {
    let tmp = TempDir::new().unwrap();
    tqa(&tmp)
        .args(["recommend", "Create a Pareto chart: scratch 15, dent 8, crack 5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("I can generate a Pareto Chart for you!"))
        .stdout(predicate::str::contains("pareto_chart"));
}

#[test]
fn test_recommend_no_match() {
    let tmp = TempDir::new().unwrap();
    tqa(&tmp)
        .args(["recommend", "what is for lunch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No quality tool matched"));
}

// ============================================================================
// Generate Command Tests
// ============================================================================

#[test]
fn test_generate_uses_ai_response() {
    let tmp = TempDir::new().unwrap();
    let response = tmp.path().join("response.txt");
    fs::write(
        &response,
        "```json\n{\"defect_data\": {\"categories\": [\"Porosity\", \"Crack\", \"Undercut\"], \"counts\": [9, 4, 2]}}\n```\n",
    )
    .unwrap();

    tqa(&tmp)
        .args(["generate", "generate pareto chart", "--ai-response"])
        .arg(&response)
        .args(["-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"extraction_stage\": \"ai\""))
        .stdout(predicate::str::contains("\"tool\": \"pareto_chart\""))
        .stdout(predicate::str::contains("\"top_category\": \"Porosity\""));
}

#[test]
fn test_generate_malformed_ai_response_falls_back() {
    let tmp = TempDir::new().unwrap();
    let response = tmp.path().join("response.txt");
    fs::write(&response, "I could not find any data, sorry.").unwrap();

    tqa(&tmp)
        .args([
            "generate",
            "generate pareto chart",
            "--evidence",
            "Scratch 12, Dent 7, Burr 3",
            "--ai-response",
        ])
        .arg(&response)
        .args(["-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"extraction_stage\": \"pattern\""))
        .stdout(predicate::str::contains("\"total_defects\": 22"));
}

#[test]
fn test_generate_takes_evidence_from_history() {
    let tmp = TempDir::new().unwrap();
    let history = tmp.path().join("history.json");
    fs::write(
        &history,
        r#"[
  {"role": "user", "content": "Last week: Scratch 12, Dent 7, Burr 3"},
  {"role": "assistant", "content": "Thanks, noted."}
]"#,
    )
    .unwrap();

    tqa(&tmp)
        .args(["generate", "generate pareto chart", "--history"])
        .arg(&history)
        .args(["-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_defects\": 22"))
        .stdout(predicate::str::contains("Last week: Scratch 12, Dent 7, Burr 3"));
}

#[test]
fn test_generate_explicit_tool_text_output() {
    let tmp = TempDir::new().unwrap();
    tqa(&tmp)
        .args([
            "generate",
            "show me the spread",
            "--tool",
            "histogram",
            "--evidence",
            &measurement_series(12),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated Histogram"))
        .stdout(predicate::str::contains("Shapiro-Wilk"));
}

#[test]
fn test_generate_natural_request_with_data() {
    let tmp = TempDir::new().unwrap();
    tqa(&tmp)
        .args(["generate", "Create a Pareto chart: scratch 15, dent 8, crack 5", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"tool\": \"pareto_chart\""))
        .stdout(predicate::str::contains("\"total_defects\": 28"));
}

#[test]
fn test_generate_without_match_fails() {
    let tmp = TempDir::new().unwrap();
    tqa(&tmp)
        .args(["generate", "what is for lunch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("tqa::pipeline::no_tool_match"));
}

// ============================================================================
// Config Command Tests
// ============================================================================

#[test]
fn test_config_show_defaults() {
    let tmp = TempDir::new().unwrap();
    tqa(&tmp)
        .args(["config", "show", "-f", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"similarity_threshold\": 0.6"))
        .stdout(predicate::str::contains("\"subgroup_size\": 5"));
}

#[test]
fn test_config_local_layer_and_env() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join(".tqa")).unwrap();
    fs::write(tmp.path().join(".tqa/config.yaml"), "subgroup_size: 4\nhistory_window: 3\n").unwrap();

    tqa(&tmp)
        .env("TQA_HISTORY_WINDOW", "7")
        .args(["config", "show", "-f", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("subgroup_size: 4"))
        .stdout(predicate::str::contains("history_window: 7"));
}

#[test]
fn test_config_path() {
    let tmp = TempDir::new().unwrap();
    tqa(&tmp)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.yaml"));
}
