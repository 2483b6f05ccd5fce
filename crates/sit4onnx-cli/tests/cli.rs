use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// The binary with its home and config directories pointed into `dir`, so a
/// config file on the host is never picked up.
fn sit4onnx(dir: &TempDir) -> Command {
    let home = dir.path().join("home");
    let mut cmd = Command::cargo_bin("sit4onnx").unwrap();
    cmd.env_remove("RUST_LOG")
        .env("HOME", &home)
        .env("XDG_CONFIG_HOME", home.join(".config"));
    cmd
}

/// Write `contents` where the binary looks for its default config file.
fn write_default_config(dir: &TempDir, contents: &str) {
    let home = dir.path().join("home");
    for config_dir in [home.join(".config"), home.join("Library/Application Support")] {
        let path = config_dir.join("sit4onnx").join("config.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

/// A file that passes path validation but is not a loadable model.
fn placeholder_model(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("model.onnx");
    fs::write(&path, b"not a model").unwrap();
    path
}

#[test]
fn help_lists_flags() {
    let dir = TempDir::new().unwrap();
    sit4onnx(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--input_onnx_file_path"))
        .stdout(predicate::str::contains("--test_loop_count"))
        .stdout(predicate::str::contains("--onnx_execution_provider"))
        .stdout(predicate::str::contains("--output_numpy_file"))
        .stdout(predicate::str::contains("--non_verbose"));
}

#[test]
fn missing_model_path_argument_is_usage_error() {
    let dir = TempDir::new().unwrap();
    sit4onnx(&dir).assert().code(2);
}

#[test]
fn nonexistent_model_exits_1() {
    let dir = TempDir::new().unwrap();
    sit4onnx(&dir)
        .arg("--input_onnx_file_path")
        .arg(dir.path().join("missing.onnx"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ERROR:"))
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn wrong_extension_exits_1() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("model.pb");
    fs::write(&path, b"").unwrap();

    sit4onnx(&dir)
        .arg("--input_onnx_file_path")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not an onnx file"));
}

#[test]
fn directory_named_like_a_model_exits_1() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("model.onnx");
    fs::create_dir(&path).unwrap();

    sit4onnx(&dir)
        .arg("--input_onnx_file_path")
        .arg(&path)
        .assert()
        .code(1);
}

#[test]
fn zero_loop_count_exits_1() {
    let dir = TempDir::new().unwrap();
    let path = placeholder_model(&dir);

    sit4onnx(&dir)
        .arg("--input_onnx_file_path")
        .arg(&path)
        .args(["--test_loop_count", "0", "--onnx_execution_provider", "cpu"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("test_loop_count must be 1 or greater."));
}

#[test]
fn negative_loop_count_exits_1() {
    let dir = TempDir::new().unwrap();
    let path = placeholder_model(&dir);

    sit4onnx(&dir)
        .arg("--input_onnx_file_path")
        .arg(&path)
        .args(["--test_loop_count", "-5", "--onnx_execution_provider", "cpu"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("test_loop_count must be 1 or greater."));
}

#[test]
fn non_positive_batch_size_exits_1() {
    let dir = TempDir::new().unwrap();
    let path = placeholder_model(&dir);

    for batch_size in ["0", "-1"] {
        sit4onnx(&dir)
            .arg("--input_onnx_file_path")
            .arg(&path)
            .args(["--batch_size", batch_size, "--onnx_execution_provider", "cpu"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("batch_size must be 1 or greater."));
    }
}

#[test]
fn errors_print_even_when_non_verbose() {
    let dir = TempDir::new().unwrap();
    sit4onnx(&dir)
        .arg("--input_onnx_file_path")
        .arg(dir.path().join("missing.onnx"))
        .arg("--non_verbose")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("ERROR:"));
}

#[test]
fn unknown_provider_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let path = placeholder_model(&dir);

    sit4onnx(&dir)
        .arg("--input_onnx_file_path")
        .arg(&path)
        .args(["--onnx_execution_provider", "rocm"])
        .assert()
        .code(2);
}

#[test]
fn unloadable_model_exits_1() {
    let dir = TempDir::new().unwrap();
    let path = placeholder_model(&dir);

    sit4onnx(&dir)
        .arg("--input_onnx_file_path")
        .arg(&path)
        .args(["--onnx_execution_provider", "cpu", "--non_verbose"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to load"));
}

#[test]
fn config_file_supplies_loop_count() {
    let dir = TempDir::new().unwrap();
    let path = placeholder_model(&dir);
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"benchmark": {"test_loop_count": 0, "provider": "cpu"}}"#).unwrap();

    sit4onnx(&dir)
        .arg("--input_onnx_file_path")
        .arg(&path)
        .arg("--config")
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("test_loop_count must be 1 or greater."));
}

#[test]
fn flag_overrides_config_file() {
    let dir = TempDir::new().unwrap();
    let path = placeholder_model(&dir);
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"benchmark": {"test_loop_count": 0}}"#).unwrap();

    // The loop count from the flag passes validation, so the run gets as far
    // as loading the placeholder model.
    sit4onnx(&dir)
        .arg("--input_onnx_file_path")
        .arg(&path)
        .arg("--config")
        .arg(&config)
        .args(["--test_loop_count", "3", "--onnx_execution_provider", "cpu"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to load"));
}

#[test]
fn malformed_config_exits_1() {
    let dir = TempDir::new().unwrap();
    let path = placeholder_model(&dir);
    let config = dir.path().join("config.json");
    fs::write(&config, "{").unwrap();

    sit4onnx(&dir)
        .arg("--input_onnx_file_path")
        .arg(&path)
        .arg("--config")
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn model_path_checked_before_default_config() {
    let dir = TempDir::new().unwrap();
    write_default_config(&dir, "{");

    sit4onnx(&dir)
        .arg("--input_onnx_file_path")
        .arg(dir.path().join("missing.onnx"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"))
        .stderr(predicate::str::contains("config").not());
}

#[cfg(unix)]
#[test]
fn default_config_read_from_isolated_home() {
    let dir = TempDir::new().unwrap();
    let path = placeholder_model(&dir);
    write_default_config(&dir, r#"{"benchmark": {"test_loop_count": 0}}"#);

    sit4onnx(&dir)
        .arg("--input_onnx_file_path")
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("test_loop_count must be 1 or greater."));
}
