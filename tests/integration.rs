use assert_cmd::Command;
use assert_fs::TempDir;
use predicates::prelude::*;
use std::fs;

/// Command isolated from the user's config dir, with colors off.
fn reptest_cmd(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("reptest").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path());
    cmd.env("HOME", config_home.path());
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("REPTEST_LOG");
    cmd
}

/// Arguments for a fast run: zero budget, a few iterations, tiny buffers.
fn quick_args() -> [&'static str; 5] {
    ["--duration", "0", "--min-iterations", "3", "--size=4096"]
}

// ---- Text report ----

#[test]
fn default_workloads_report_and_compare() {
    let tmp = TempDir::new().unwrap();

    reptest_cmd(&tmp)
        .args(quick_args())
        .assert()
        .success()
        .stdout(predicate::str::contains("Running 3 registered tests..."))
        .stdout(predicate::str::contains("Test duration: 0 seconds per test"))
        .stdout(predicate::str::contains("=== fill ==="))
        .stdout(predicate::str::contains("=== copy ==="))
        .stdout(predicate::str::contains("=== sum ==="))
        .stdout(predicate::str::contains("Tests run: 3"))
        .stdout(predicate::str::contains("Throughput:"))
        .stdout(predicate::str::contains("=== Comparison ==="))
        .stdout(predicate::str::contains("read-file").not());
}

#[test]
fn progress_lines_shown_by_default() {
    let tmp = TempDir::new().unwrap();

    reptest_cmd(&tmp)
        .args(quick_args())
        .arg("sum")
        .assert()
        .success()
        .stdout(predicate::str::contains("Running sum..."))
        .stdout(predicate::str::contains("done: 3 iterations"));
}

#[test]
fn no_progress_hides_progress_lines() {
    let tmp = TempDir::new().unwrap();

    reptest_cmd(&tmp)
        .args(quick_args())
        .args(["--no-progress", "sum"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Running sum...").not())
        .stdout(predicate::str::contains("=== sum ==="));
}

#[test]
fn workloads_run_in_given_order() {
    let tmp = TempDir::new().unwrap();

    let output = reptest_cmd(&tmp)
        .args(quick_args())
        .args(["--no-progress", "sum", "fill"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let sum = stdout.find("=== sum ===").unwrap();
    let fill = stdout.find("=== fill ===").unwrap();
    assert!(sum < fill);
    assert!(!stdout.contains("=== copy ==="));
}

#[test]
fn read_file_workload() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data.bin");
    fs::write(&data, vec![1u8; 2048]).unwrap();

    reptest_cmd(&tmp)
        .args(quick_args())
        .arg("--file")
        .arg(&data)
        .arg("read-file")
        .assert()
        .success()
        .stdout(predicate::str::contains("=== read-file ==="))
        .stdout(predicate::str::contains("Tests run: 3"));
}

#[test]
fn file_flag_adds_read_file_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data.bin");
    fs::write(&data, b"abc").unwrap();

    reptest_cmd(&tmp)
        .args(quick_args())
        .arg("--file")
        .arg(&data)
        .assert()
        .success()
        .stdout(predicate::str::contains("Running 4 registered tests..."));
}

// ---- JSON ----

#[test]
fn json_output_is_valid() {
    let tmp = TempDir::new().unwrap();

    let output = reptest_cmd(&tmp)
        .args(quick_args())
        .args(["--json", "fill", "copy"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let tests = value["tests"].as_array().unwrap();
    assert_eq!(tests.len(), 2);
    assert_eq!(tests[0]["name"], "fill");
    assert_eq!(tests[1]["name"], "copy");
    assert_eq!(tests[0]["test_count"], 3);
    assert_eq!(tests[0]["total_bytes"], 4096);
    assert!(value["timestamp"].is_string());
}

// ---- Config ----

#[test]
fn config_file_sets_iterations() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("bench.toml");
    fs::write(&config, "duration_seconds = 0\nmin_iterations = 2\nshow_progress = false\n").unwrap();

    reptest_cmd(&tmp)
        .arg("--config")
        .arg(&config)
        .args(["--size=1024", "sum"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tests run: 2"))
        .stdout(predicate::str::contains("Running sum...").not());
}

#[test]
fn flags_override_config_file() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("bench.toml");
    fs::write(&config, "duration_seconds = 0\nmin_iterations = 2\n").unwrap();

    reptest_cmd(&tmp)
        .arg("--config")
        .arg(&config)
        .args(["--min-iterations", "4", "--size=1024", "sum"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tests run: 4"));
}

// `dirs::config_dir` honours XDG_CONFIG_HOME only on Linux.
#[cfg(target_os = "linux")]
#[test]
fn default_config_dir_is_read() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("reptest");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), "duration_seconds = 0\nmin_iterations = 5\n").unwrap();

    reptest_cmd(&tmp)
        .args(["--size=1024", "--no-progress", "fill"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tests run: 5"));
}

#[test]
fn invalid_config_fails() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("bad.toml");
    fs::write(&config, "min_iterations = \"lots\"\n").unwrap();

    reptest_cmd(&tmp)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[test]
fn missing_config_fails() {
    let tmp = TempDir::new().unwrap();

    reptest_cmd(&tmp)
        .arg("--config")
        .arg(tmp.path().join("absent.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

// ---- Errors ----

#[test]
fn unknown_workload_fails() {
    let tmp = TempDir::new().unwrap();

    reptest_cmd(&tmp)
        .args(quick_args())
        .arg("shuffle")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Unknown workload 'shuffle'"));
}

#[test]
fn read_file_without_file_fails() {
    let tmp = TempDir::new().unwrap();

    reptest_cmd(&tmp)
        .args(quick_args())
        .arg("read-file")
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires --file"));
}

#[test]
fn zero_iterations_reports_no_measurements() {
    let tmp = TempDir::new().unwrap();

    reptest_cmd(&tmp)
        .args(["--duration", "0", "--min-iterations", "0", "--no-progress", "sum"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No measurements recorded"))
        .stdout(predicate::str::contains("no measurements"));
}
