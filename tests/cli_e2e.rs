//! End-to-end CLI tests for the media-fetch binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Command isolated from the developer's own config file.
fn media_fetch(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("media-fetch").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("xdg"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_binary_help_displays_usage() {
    let home = TempDir::new().unwrap();
    media_fetch(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolve random media"));
}

#[test]
fn test_binary_version_displays_version() {
    let home = TempDir::new().unwrap();
    media_fetch(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("media-fetch"));
}

#[test]
fn test_binary_without_subcommand_fails() {
    let home = TempDir::new().unwrap();
    media_fetch(&home).assert().failure();
}

#[test]
fn test_run_direct_url_prints_seed_without_network() {
    let home = TempDir::new().unwrap();
    media_fetch(&home)
        .args([
            "-q",
            "run",
            "--url",
            "http://127.0.0.1:9/never-contacted.jpg",
            "--pipeline",
            "direct_url",
        ])
        .assert()
        .success()
        .stdout("http://127.0.0.1:9/never-contacted.jpg\n");
}

#[test]
fn test_run_rejects_blank_step() {
    let home = TempDir::new().unwrap();
    media_fetch(&home)
        .args([
            "run",
            "--url",
            "https://api.example.com/r",
            "--pipeline",
            "fetch || direct_url",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid pipeline"));
}

#[test]
fn test_video_without_configured_api_fails() {
    let home = TempDir::new().unwrap();
    media_fetch(&home)
        .arg("video")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no video API configured"));
}

#[test]
fn test_invalid_config_file_fails() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("config.toml");
    std::fs::write(&config, "[download]\ntimeout_secs = 0\n").unwrap();

    media_fetch(&home)
        .arg("picture")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config file"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_video_downloads_into_cache_dir() {
    let mock_server = MockServer::start().await;
    let video_url = format!("{}/media/clip", mock_server.uri());
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"data": {"video_url": video_url}})),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/media/clip"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "video/mp4")
                .set_body_bytes(b"mp4".to_vec()),
        )
        .mount(&mock_server)
        .await;

    let home = TempDir::new().unwrap();
    let cache = home.path().join("cache");
    let config = home.path().join("config.toml");
    std::fs::write(
        &config,
        format!(
            "[[api.video_api]]\nurl = \"{}/api\"\npipeline = \"fetch | data | video_url | download_url\"\n",
            mock_server.uri()
        ),
    )
    .unwrap();

    let mut cmd = media_fetch(&home);
    cmd.arg("-q")
        .arg("video")
        .arg("--config")
        .arg(&config)
        .arg("--cache-dir")
        .arg(&cache);
    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let printed = String::from_utf8(output.stdout).unwrap();
    let written = std::path::PathBuf::from(printed.trim());
    assert!(written.starts_with(&cache), "unexpected path {written:?}");
    assert_eq!(written.extension().and_then(|e| e.to_str()), Some("mp4"));
    assert_eq!(std::fs::read(&written).unwrap(), b"mp4");
}
