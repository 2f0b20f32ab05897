use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn bulbmarch(config_dir: &std::path::Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_bulbmarch"));
    command
        .env("BULBMARCH_CONFIG_DIR", config_dir)
        .env_remove("BULBMARCH_CONFIG")
        .env("RUST_LOG", "warn");
    command
}

#[test]
fn still_writes_png_of_requested_size() {
    let root = TempDir::new().unwrap();
    let output = root.path().join("frame.png");

    let status = bulbmarch(root.path())
        .args(["still", "--output"])
        .arg(&output)
        .args(["--size", "32x24", "--timestamp", "3s"])
        .status()
        .expect("failed to run bulbmarch still");

    assert!(status.success());
    let image = image::open(&output).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (32, 24));
    assert!(image.pixels().all(|pixel| pixel[3] == 255));
}

#[test]
fn still_uses_config_defaults() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("config.toml"),
        "[still]\nwidth = 20\nheight = 10\npointer = [4.0, 5.0]\n",
    )
    .unwrap();
    let output = root.path().join("configured.png");

    let status = bulbmarch(root.path())
        .args(["still", "--output"])
        .arg(&output)
        .status()
        .expect("failed to run bulbmarch still");

    assert!(status.success());
    let image = image::open(&output).unwrap();
    assert_eq!((image.width(), image.height()), (20, 10));
}

#[test]
fn same_request_renders_identical_frames() {
    let root = TempDir::new().unwrap();
    let first = root.path().join("a.png");
    let second = root.path().join("b.png");

    for output in [&first, &second] {
        let status = bulbmarch(root.path())
            .args(["still", "--size", "16x16", "--pointer", "8,12", "--output"])
            .arg(output)
            .status()
            .expect("failed to run bulbmarch still");
        assert!(status.success());
    }

    let a = image::open(&first).unwrap().to_rgba8();
    let b = image::open(&second).unwrap().to_rgba8();
    assert_eq!(a, b);
}

#[test]
fn invalid_config_fails() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join("config.toml"), "[still]\nwidth = 0\n").unwrap();
    let output = root.path().join("never.png");

    let status = bulbmarch(root.path())
        .args(["still", "--output"])
        .arg(&output)
        .status()
        .expect("failed to run bulbmarch still");

    assert!(!status.success());
    assert!(!output.exists());
}

#[test]
fn rejects_malformed_size() {
    let root = TempDir::new().unwrap();
    let status = bulbmarch(root.path())
        .args(["still", "--output", "x.png", "--size", "tiny"])
        .status()
        .expect("failed to run bulbmarch still");
    assert!(!status.success());
}
