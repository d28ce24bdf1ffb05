// tests/cli_dispatch_test.rs

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::{TempDir, tempdir};

// 辅助函数，避免重复
fn main_command() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

/// 写入一份最小配置，避免测试读写用户主目录
fn write_config(dir: &TempDir) -> String {
    let path = dir.path().join("config.json");
    let mut file = File::create(&path).unwrap();
    writeln!(file, "{{}}").unwrap();
    path.to_string_lossy().into_owned()
}

fn offline_command(config: &str) -> Command {
    let mut cmd = main_command();
    cmd.arg("--config").arg(config).arg("--no-backends");
    cmd
}

// --- 测试基本 CLI 行为 ---

#[test]
fn test_help_flag() {
    let mut cmd = main_command();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("显示此帮助信息并退出"))
        .stdout(predicate::str::contains("--no-backends"));
}

#[test]
fn test_missing_mode_shows_help() {
    let mut cmd = main_command();
    cmd.assert().failure().stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_missing_config_file_fails() {
    let mut cmd = main_command();
    cmd.arg("--url")
        .arg("https://youtu.be/dQw4w9WgXcQ")
        .arg("--config")
        .arg(Path::new("/definitely/not/here.json"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("配置文件"));
}

#[test]
fn test_zero_validity_window_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    let mut file = File::create(&path).unwrap();
    writeln!(file, r#"{{ "synthetic": {{ "validity_window_secs": 0 }} }}"#).unwrap();

    let mut cmd = main_command();
    cmd.arg("--url").arg("https://youtu.be/dQw4w9WgXcQ").arg("--config").arg(&path);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("validity_window_secs"));
}

// --- 测试核心分发逻辑 ---

#[test]
fn test_single_url_without_backends_outputs_synthetic_json() {
    let dir = tempdir().unwrap();
    let config = write_config(&dir);

    let mut cmd = offline_command(&config);
    cmd.arg("--url").arg("https://youtu.be/dQw4w9WgXcQ").arg("--json");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""status": "success""#))
        .stdout(predicate::str::contains(r#""video_id": "dQw4w9WgXcQ""#))
        .stdout(predicate::str::contains(r#""format_code": "18""#))
        .stdout(predicate::str::contains(r#""provenance": "synthetic""#));
}

#[test]
fn test_audio_format_maps_to_audio_code() {
    let dir = tempdir().unwrap();
    let config = write_config(&dir);

    let mut cmd = offline_command(&config);
    cmd.arg("--url")
        .arg("https://www.youtube.com/watch?v=abc12345678")
        .arg("-f")
        .arg("MP3")
        .arg("--json");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""format_code": "140""#))
        .stdout(predicate::str::contains("mime=audio%2Fmp4"));
}

#[test]
fn test_invalid_url_reports_error_json() {
    let dir = tempdir().unwrap();
    let config = write_config(&dir);

    let mut cmd = offline_command(&config);
    cmd.arg("--url").arg("https://example.com/watch?v=abc12345678").arg("--json");
    cmd.assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains(r#""status": "error""#))
        .stdout(predicate::str::contains(r#""reason": "invalid_url""#))
        .stdout(predicate::str::contains("primary_link").not());
}

#[test]
fn test_invalid_url_plain_output() {
    let dir = tempdir().unwrap();
    let config = write_config(&dir);

    let mut cmd = offline_command(&config);
    cmd.arg("--url").arg("not a link at all");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("程序执行出错"));
}

#[test]
fn test_batch_mode_dispatch() {
    let dir = tempdir().unwrap();
    let config = write_config(&dir);
    let batch_file_path = dir.path().join("batch.txt");
    let mut file = File::create(&batch_file_path).unwrap();
    writeln!(file, "# 注释行会被跳过").unwrap();
    writeln!(file, "https://youtu.be/dQw4w9WgXcQ").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "https://www.youtube.com/shorts/abc12345678").unwrap();

    let mut cmd = offline_command(&config);
    cmd.arg("-b").arg(&batch_file_path).arg("--json");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""video_id": "dQw4w9WgXcQ""#))
        .stdout(predicate::str::contains(r#""video_id": "abc12345678""#));
}

#[test]
fn test_batch_mode_reports_failed_tasks() {
    let dir = tempdir().unwrap();
    let config = write_config(&dir);
    let batch_file_path = dir.path().join("batch.txt");
    let mut file = File::create(&batch_file_path).unwrap();
    writeln!(file, "https://youtu.be/dQw4w9WgXcQ").unwrap();
    writeln!(file, "https://vimeo.com/12345").unwrap();

    let mut cmd = offline_command(&config);
    cmd.arg("-b").arg(&batch_file_path);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("1 个批量任务执行失败"));
}
