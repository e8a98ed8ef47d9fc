//! CLI command tests

use super::*;
use crate::cli::{CheckArgs, FlattenArgs, OutputFormat, SampleArgs, ShowArgs};
use crate::config::{FlatMap, HierarchicalConfig, Node};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const BASE: &str = "\
experiment: pong
lr: 0.01
optim:
  name: adam
  args_: {eps: 1.0e-8}
";

const TUNE: &str = "\
lr: [float, [1.0e-4, 0.1, null, true]]
optim:
  args_:
    eps: [categorical, [1.0e-8, 1.0e-6]]
";

/// Write base.yaml and tune.yaml into a fresh config root
fn create_config_root(dir: &TempDir, base: &str, tune: &str) -> PathBuf {
    let root = dir.path().join("configs");
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join(sample::BASE_FILE), base).unwrap();
    std::fs::write(root.join(sample::TUNE_FILE), tune).unwrap();
    root
}

fn sample_args(root: &Path, results: &Path) -> SampleArgs {
    SampleArgs {
        config_root: root.to_path_buf(),
        trials: 3,
        seed: Some(42),
        results_dir: results.to_path_buf(),
        append: None,
        dry_run: false,
    }
}

fn search_dir(results: &Path) -> PathBuf {
    let entries: Vec<_> = std::fs::read_dir(results).unwrap().map(|e| e.unwrap().path()).collect();
    assert_eq!(entries.len(), 1, "expected one search directory");
    entries[0].clone()
}

#[test]
fn test_show_command() {
    let dir = TempDir::new().unwrap();
    let root = create_config_root(&dir, BASE, TUNE);

    let args = ShowArgs { config: root.join("base.yaml") };
    assert!(show::run_show(args, LogLevel::Quiet).is_ok());
}

#[test]
fn test_show_missing_file() {
    let args = ShowArgs { config: PathBuf::from("/nonexistent/base.yaml") };
    let err = show::run_show(args, LogLevel::Quiet).unwrap_err();
    assert!(err.starts_with("Config error:"));
}

#[test]
fn test_flatten_command_all_formats() {
    let dir = TempDir::new().unwrap();
    let root = create_config_root(&dir, BASE, TUNE);

    for format in [OutputFormat::Text, OutputFormat::Json, OutputFormat::Yaml] {
        let args = FlattenArgs { config: root.join("base.yaml"), format };
        assert!(flatten::run_flatten(args, LogLevel::Quiet).is_ok());
    }
}

#[test]
fn test_flatten_render_text() {
    let flat: FlatMap = [("lr", serde_yaml::Value::from(0.01))]
        .into_iter()
        .chain([("optim.name", serde_yaml::Value::from("adam"))])
        .collect();

    let text = flatten::render(&flat, OutputFormat::Text).unwrap();
    assert_eq!(text, "lr: 0.01\noptim.name: adam");
}

#[test]
fn test_flatten_render_json() {
    let flat: FlatMap = [("optim.args_.eps", 1e-8)].into_iter().collect();
    let json = flatten::render(&flat, OutputFormat::Json).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["optim.args_.eps"], serde_json::json!(1e-8));
}

#[test]
fn test_check_command() {
    let dir = TempDir::new().unwrap();
    let root = create_config_root(&dir, BASE, TUNE);

    let args = CheckArgs { tune: root.join("tune.yaml") };
    assert!(check::run_check(args, LogLevel::Quiet).is_ok());
}

#[test]
fn test_check_reports_error_code() {
    let dir = TempDir::new().unwrap();
    let root = create_config_root(&dir, BASE, "lr: [enum, [1, 2]]\n");

    let args = CheckArgs { tune: root.join("tune.yaml") };
    let err = check::run_check(args, LogLevel::Quiet).unwrap_err();
    assert!(err.starts_with("[E010]"), "{err}");
    assert!(err.contains("enum"));
}

#[test]
fn test_sample_writes_trials() {
    let dir = TempDir::new().unwrap();
    let root = create_config_root(&dir, BASE, TUNE);
    let results = dir.path().join("results");

    sample::run_sample(sample_args(&root, &results), LogLevel::Quiet).unwrap();

    let search = search_dir(&results);
    assert!(search.file_name().unwrap().to_string_lossy().ends_with("_pong"));
    for number in 0..3 {
        let trial_dir = search.join(format!("trial_{number:04}"));
        let cfg = HierarchicalConfig::from_yaml_file(trial_dir.join("cfg.yaml")).unwrap();

        let lr = cfg.get("lr").and_then(Node::as_f64).unwrap();
        assert!((1e-4..=0.1).contains(&lr));
        assert_eq!(
            cfg.get("out_dir").and_then(Node::as_str),
            Some(trial_dir.display().to_string().as_str())
        );
        assert_eq!(cfg.get_path("optim.name").and_then(Node::as_str), Some("adam"));
    }
}

#[test]
fn test_sample_append_continues_numbering() {
    let dir = TempDir::new().unwrap();
    let root = create_config_root(&dir, BASE, TUNE);
    let results = dir.path().join("results");
    std::fs::create_dir_all(results.join("2024Aug20_pong").join("trial_0000")).unwrap();

    let args = SampleArgs {
        append: Some("2024Aug20_pong".to_string()),
        trials: 2,
        ..sample_args(&root, &results)
    };
    sample::run_sample(args, LogLevel::Quiet).unwrap();

    let search = results.join("2024Aug20_pong");
    assert!(search.join("trial_0001").join("cfg.yaml").is_file());
    assert!(search.join("trial_0002").join("cfg.yaml").is_file());
    assert!(!search.join("trial_0000").join("cfg.yaml").exists());
}

#[test]
fn test_sample_append_to_other_experiment_fails() {
    let dir = TempDir::new().unwrap();
    let root = create_config_root(&dir, BASE, TUNE);
    let results = dir.path().join("results");

    let args = SampleArgs {
        append: Some("2024Aug20_breakout".to_string()),
        ..sample_args(&root, &results)
    };
    let err = sample::run_sample(args, LogLevel::Quiet).unwrap_err();
    assert!(err.contains("Trying to append"));
    assert!(!results.exists());
}

#[test]
fn test_sample_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let root = create_config_root(&dir, BASE, TUNE);
    let results = dir.path().join("results");

    let args = SampleArgs { dry_run: true, ..sample_args(&root, &results) };
    sample::run_sample(args, LogLevel::Quiet).unwrap();
    assert!(!results.exists());
}

#[test]
fn test_sample_same_seed_same_configs() {
    let dir = TempDir::new().unwrap();
    let root = create_config_root(&dir, BASE, TUNE);
    let first = dir.path().join("first");
    let second = dir.path().join("second");

    sample::run_sample(sample_args(&root, &first), LogLevel::Quiet).unwrap();
    sample::run_sample(sample_args(&root, &second), LogLevel::Quiet).unwrap();

    let read_lr = |results: &Path| {
        let cfg = HierarchicalConfig::from_yaml_file(
            search_dir(results).join("trial_0001").join("cfg.yaml"),
        )
        .unwrap();
        cfg.get("lr").and_then(Node::as_f64).unwrap()
    };
    assert_eq!(read_lr(&first), read_lr(&second));
}

#[test]
fn test_sample_requires_experiment_name() {
    let dir = TempDir::new().unwrap();
    let root = create_config_root(&dir, "lr: 0.01\n", "lr: [float, [0.0, 1.0]]\n");

    let err = sample::run_sample(sample_args(&root, &dir.path().join("r")), LogLevel::Quiet)
        .unwrap_err();
    assert!(err.contains("experiment"));
}

#[test]
fn test_sample_missing_tune_file() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("configs");
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("base.yaml"), BASE).unwrap();

    let err = sample::run_sample(sample_args(&root, &dir.path().join("r")), LogLevel::Quiet)
        .unwrap_err();
    assert!(err.starts_with("Config error:"));
}

#[test]
fn test_run_command_dispatch() {
    let dir = TempDir::new().unwrap();
    let root = create_config_root(&dir, BASE, TUNE);

    let cli = crate::cli::parse_args([
        "afinar".to_string(),
        "--quiet".to_string(),
        "check".to_string(),
        root.join("tune.yaml").display().to_string(),
    ])
    .unwrap();
    assert!(run_command(cli).is_ok());
}
