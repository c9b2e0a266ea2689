//! End-to-end tests for the `tqr` binary.

use std::fs;
use std::process::{Command, Output};

use tqr_io::{EigenSummary, ModalSummary, Report, StudyRow, load_json};

fn tqr(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tqr"))
        .args(args)
        .output()
        .expect("tqr should start")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn solve_scalar_mode_prints_spectrum() {
    let output = tqr(&[
        "solve",
        "--diagonal",
        "2",
        "--off-diagonal=-1",
        "--dimension",
        "5",
    ]);
    assert!(output.status.success(), "{output:?}");
    let text = stdout(&output);
    assert!(text.contains("dimension: 5"));
    assert!(text.contains("shifted: true"));
    assert!(text.contains("Eigenvalue"));
}

#[test]
fn solve_writes_json_report() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("out").join("eigen.json");
    let output = tqr(&[
        "solve",
        "--diagonal",
        "4,-1,3",
        "--off-diagonal",
        "1,2",
        "--unshifted",
        "--json",
        path.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{output:?}");

    let report: Report<EigenSummary> = load_json(&path).expect("report should load");
    assert_eq!(report.kind, "eigen-decomposition");
    assert_eq!(report.payload.dimension, 3);
    assert!(!report.payload.shifted);
    assert_eq!(report.payload.eigenvectors.len(), 3);
}

#[test]
fn mixed_band_kinds_fail_with_exit_code_1() {
    let output = tqr(&["solve", "--diagonal", "2", "--off-diagonal", "1,1", "--dimension", "3"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid specification"), "{stderr}");
}

#[test]
fn iteration_cap_is_reported() {
    let output = tqr(&[
        "solve",
        "--diagonal",
        "2",
        "--off-diagonal=-1",
        "--dimension",
        "16",
        "--unshifted",
        "--max-iterations",
        "3",
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("did not converge"));
}

#[test]
fn usage_errors_exit_with_code_2() {
    assert_eq!(tqr(&[]).status.code(), Some(2));
    assert_eq!(tqr(&["simulate", "--rule", "a"]).status.code(), Some(2));
}

#[test]
fn study_table_and_report() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("study.json");
    let output = tqr(&["study", "--sizes", "2,4", "--json", path.to_str().unwrap()]);
    assert!(output.status.success(), "{output:?}");

    let text = stdout(&output);
    assert!(text.starts_with("| Test"));
    assert_eq!(text.lines().count(), 2 + 4);

    let report: Report<Vec<StudyRow>> = load_json(&path).expect("report should load");
    assert_eq!(report.kind, "convergence-study");
    assert_eq!(report.payload.len(), 4);
    assert!(report.payload[0].shifted);
    assert!(!report.payload[3].shifted);
}

#[test]
fn simulate_preset_writes_csv() {
    let dir = tempfile::tempdir().expect("temp dir");
    let csv = dir.path().join("series.csv");
    let json = dir.path().join("modal.json");
    let output = tqr(&[
        "simulate",
        "--rule",
        "a",
        "--preset",
        "1",
        "--csv",
        csv.to_str().unwrap(),
        "--json",
        json.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{output:?}");
    assert!(stdout(&output).contains("stiffness rule: A"));

    let content = fs::read_to_string(&csv).expect("csv should exist");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "t,x1,x2,x3,x4,x5");
    assert_eq!(lines.len(), 1 + 1001);

    let first: Vec<f64> = lines[1].split(',').map(|v| v.parse().unwrap()).collect();
    let expected = [0.0, -2.0, -3.0, -1.0, -3.0, -1.0];
    for (got, want) in first.iter().zip(expected) {
        assert!((got - want).abs() < 1e-9);
    }

    let report: Report<ModalSummary> = load_json(&json).expect("report should load");
    assert_eq!(report.payload.frequencies.len(), 5);
}

#[test]
fn simulate_reads_settings_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = dir.path().join("settings.json");
    fs::write(&config, r#"{ "time": { "end": 1.0, "step": 0.25 } }"#).unwrap();
    let csv = dir.path().join("series.csv");

    let output = tqr(&[
        "simulate",
        "--rule",
        "b",
        "--dimension",
        "3",
        "--config",
        config.to_str().unwrap(),
        "--csv",
        csv.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{output:?}");

    let content = fs::read_to_string(&csv).unwrap();
    assert_eq!(content.lines().count(), 1 + 5);
}

#[test]
fn unknown_preset_is_an_error() {
    let output = tqr(&["simulate", "--rule", "b", "--preset", "3"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn oversized_time_grid_is_an_error() {
    let output = tqr(&[
        "simulate",
        "--rule",
        "a",
        "--dimension",
        "3",
        "--t-end",
        "1e300",
        "--dt",
        "1e-10",
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("samples"));
}
