//! Integration tests for run_enumeration.
//!
//! These runs never touch the network: no root domains (so no wildcard
//! probing) and no trusted resolvers.

mod helpers;

use std::fs;
use std::path::{Path, PathBuf};

use dns_sift::{run_enumeration, Config, LogFormat, LogLevel};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use helpers::{ndjson_output, raw_output, WILDCARD_ZONE};

fn write_input(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("Failed to write input file");
    path
}

fn create_test_config(raw_input: PathBuf, output: &Path) -> Config {
    Config {
        raw_input: Some(raw_input),
        output: Some(output.to_path_buf()),
        silent: true,
        wildcard_threads: 4,
        log_level: LogLevel::Error,
        log_format: LogFormat::Plain,
        ..Default::default()
    }
}

fn sorted_lines(path: &Path) -> Vec<String> {
    let mut lines: Vec<String> = fs::read_to_string(path)
        .expect("Failed to read output")
        .lines()
        .map(str::to_string)
        .collect();
    lines.sort();
    lines
}

#[tokio::test]
async fn test_raw_input_written_to_file() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "massdns.txt", &raw_output(WILDCARD_ZONE));
    let output = dir.path().join("out.txt");

    let report = run_enumeration(create_test_config(input, &output), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.resolved(), 7);
    assert_eq!(report.pipeline.buckets, 2);
    assert!(report.massdns_seconds.is_none());
    let lines = sorted_lines(&output);
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0], "app.example.com");
}

#[tokio::test]
async fn test_ndjson_input_with_json_lines() {
    let dir = TempDir::new().unwrap();
    let input = write_input(
        &dir,
        "massdns.json",
        &ndjson_output(&[("app.example.com", "10.0.0.9")]),
    );
    let output = dir.path().join("out.jsonl");
    let config = Config {
        ndjson: true,
        json: true,
        ..create_test_config(input, &output)
    };

    run_enumeration(config, CancellationToken::new()).await.unwrap();

    let lines = sorted_lines(&output);
    assert_eq!(lines.len(), 1);
    let value: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(value["hostname"], "app.example.com");
}

#[tokio::test]
async fn test_blank_input_is_rejected() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "massdns.txt", "");
    let output = dir.path().join("out.txt");

    let err = run_enumeration(create_test_config(input, &output), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("blank input file"), "{err:#}");
    // Nothing was opened for writing
    assert!(!output.exists());
}

#[tokio::test]
async fn test_missing_input_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.txt");
    let config = create_test_config(dir.path().join("absent.txt"), &output);

    let err = run_enumeration(config, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("does not exist"), "{err:#}");
}

#[tokio::test]
async fn test_invalid_configuration_is_rejected() {
    let err = run_enumeration(Config::default(), CancellationToken::new())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("no input specified"), "{err:#}");

    let config = Config {
        list: Some(PathBuf::from("hosts.txt")),
        ..Default::default()
    };
    let err = run_enumeration(config, CancellationToken::new())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("--resolvers"), "{err:#}");
}

#[tokio::test]
async fn test_unwritable_output_fails_before_parsing() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "massdns.txt", &raw_output(WILDCARD_ZONE));
    let output = dir.path().join("missing-dir").join("out.txt");

    let err = run_enumeration(create_test_config(input, &output), CancellationToken::new())
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("could not create output file"), "{err:#}");
}

#[tokio::test]
async fn test_parse_error_is_fatal() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "massdns.json", "{\"name\":\n");
    let output = dir.path().join("out.txt");
    let config = Config {
        ndjson: true,
        ..create_test_config(input, &output)
    };

    let err = run_enumeration(config, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("line 1"), "{err:#}");
}

#[cfg(unix)]
#[tokio::test]
async fn test_failing_massdns_is_reported() {
    let dir = TempDir::new().unwrap();
    let list = write_input(&dir, "hosts.txt", "app.example.com\n");
    let resolvers = write_input(&dir, "resolvers.txt", "127.0.0.1\n");
    let config = Config {
        list: Some(list),
        resolvers: Some(resolvers),
        massdns_path: PathBuf::from("false"),
        temp_dir: Some(dir.path().to_path_buf()),
        silent: true,
        ..Default::default()
    };

    let err = run_enumeration(config, CancellationToken::new())
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("could not execute massdns"), "{err:#}");
}
