use std::fs;
use std::process::Command;

use settings::BulbConfig;
use tempfile::TempDir;

fn run_config(config_dir: &std::path::Path, action: &str) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_bulbmarch"))
        .env("BULBMARCH_CONFIG_DIR", config_dir)
        .env_remove("BULBMARCH_CONFIG")
        .env("RUST_LOG", "warn")
        .args(["config", action])
        .output()
        .expect("failed to run bulbmarch config")
}

#[test]
fn where_reports_config_file_in_override_dir() {
    let root = TempDir::new().unwrap();
    let output = run_config(root.path(), "where");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let expected = root.path().join("config.toml");
    assert!(stdout.contains(&expected.display().to_string()), "{stdout}");
    assert!(stdout.contains("missing"), "{stdout}");
}

#[test]
fn show_prints_defaults_without_a_file() {
    let root = TempDir::new().unwrap();
    let output = run_config(root.path(), "show");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let shown = BulbConfig::from_toml_str(&stdout).unwrap();
    assert_eq!(shown, BulbConfig::default());
}

#[test]
fn show_reflects_file_values() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("config.toml"),
        "[animation]\ntime_divisor = 1000.0\nrun_for = \"1m 30s\"\n\n[gpu]\npower = \"low\"\n",
    )
    .unwrap();

    let output = run_config(root.path(), "show");
    assert!(output.status.success());

    let shown = BulbConfig::from_toml_str(&String::from_utf8(output.stdout).unwrap()).unwrap();
    assert_eq!(shown.animation.time_divisor, 1000.0);
    assert_eq!(
        shown.animation.run_for,
        Some(std::time::Duration::from_secs(90))
    );
    assert_eq!(shown.gpu.power, settings::PowerPreference::Low);
}
