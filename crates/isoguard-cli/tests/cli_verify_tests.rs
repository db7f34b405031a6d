//! CLI verify tests against a local backtest stand-in.

use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::thread;
use tempfile::TempDir;

fn isoguard(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_isoguard"))
        .current_dir(dir)
        .env("RUST_LOG", "off")
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn read_body(stream: &mut std::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            return String::new();
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(split) = text.find("\r\n\r\n") {
            let length: usize = text[..split]
                .to_ascii_lowercase()
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .map(|v| v.trim().parse().unwrap())
                .unwrap_or(0);
            if buf.len() >= split + 4 + length {
                return text[split + 4..split + 4 + length].to_string();
            }
        }
    }
}

/// Serve `statuses.len()` requests. Each successful request writes
/// `<hash>.bin` under `root`, plus `shared.bin` when the workload asks to.
fn backend(root: PathBuf, statuses: Vec<u16>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/backtest", listener.local_addr().unwrap());
    thread::spawn(move || {
        for status in statuses {
            let (mut stream, _) = listener.accept().unwrap();
            let body: serde_json::Value = serde_json::from_str(&read_body(&mut stream)).unwrap();
            if status == 200 {
                let hash = body["hash"].as_str().unwrap();
                fs::write(root.join(format!("{}.bin", hash)), hash).unwrap();
                if let Some(shared) = body["json"]["shared"].as_str() {
                    fs::write(root.join("shared.bin"), shared).unwrap();
                }
            }
            let response = format!(
                "HTTP/1.1 {} X\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                status
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    url
}

fn write_config(dir: &Path, endpoint: &str, second_payload: &str) -> PathBuf {
    fs::write(dir.join("first.json"), r#"{"name": "first"}"#).unwrap();
    fs::write(dir.join("second.json"), second_payload).unwrap();
    let config = format!(
        r#"
root = "cache"
endpoint = "{}"
first_payload = "first.json"
second_payload = "second.json"
grace_period_ms = 0
invocation_timeout_ms = 5000
report_dir = "reports"
"#,
        endpoint
    );
    let path = dir.join("verify.toml");
    fs::write(&path, config).unwrap();
    path
}

#[test]
fn test_verify_pass_exits_zero_and_writes_report() {
    let temp_dir = TempDir::new().unwrap();
    let endpoint = backend(temp_dir.path().join("cache"), vec![200, 200]);
    write_config(temp_dir.path(), &endpoint, r#"{"name": "second"}"#);

    let output = isoguard(temp_dir.path(), &["verify", "--config", "verify.toml"]);

    assert_eq!(
        output.status.code(),
        Some(0),
        "stdout: {}",
        String::from_utf8_lossy(&output.stdout)
    );
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("Verdict: PASS"));
    let report: serde_json::Value = serde_json::from_slice(
        &fs::read(temp_dir.path().join("reports").join("verification.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(report["verdict"], "pass");
    assert_eq!(report["diff"]["added"].as_array().unwrap().len(), 1);
}

#[test]
fn test_verify_shared_artifact_overwrite_exits_one() {
    let temp_dir = TempDir::new().unwrap();
    let endpoint = backend(temp_dir.path().join("cache"), vec![200, 200]);
    write_config(temp_dir.path(), &endpoint, r#"{"shared": "second"}"#);
    // Both workloads write the same artifact
    fs::write(temp_dir.path().join("first.json"), r#"{"shared": "first"}"#).unwrap();

    let output = isoguard(temp_dir.path(), &["verify", "--config", "verify.toml"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stdout).contains("`shared.bin`"));
}

#[test]
fn test_verify_setup_failure_exits_two() {
    let temp_dir = TempDir::new().unwrap();
    let endpoint = backend(temp_dir.path().join("cache"), vec![500]);
    write_config(temp_dir.path(), &endpoint, "{}");

    let output = isoguard(temp_dir.path(), &["verify", "--config", "verify.toml"]);

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Phase: first_invocation"));
    assert!(stdout.contains("ERR_SETUP_FAILED"));
}

#[test]
fn test_verify_invalid_config_exits_two() {
    let temp_dir = TempDir::new().unwrap();
    write_config(temp_dir.path(), "http://127.0.0.1:9/backtest", "{}");

    let output = isoguard(
        temp_dir.path(),
        &["verify", "--config", "verify.toml", "--grace-ms", "999999"],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_CONFIG_INVALID"));
}

#[test]
fn test_verify_report_write_failure_keeps_verdict_exit_code() {
    let temp_dir = TempDir::new().unwrap();
    let endpoint = backend(temp_dir.path().join("cache"), vec![200, 200]);
    write_config(temp_dir.path(), &endpoint, r#"{"name": "second"}"#);
    // A regular file where the report directory should go
    fs::write(temp_dir.path().join("blocked"), b"").unwrap();

    let output = isoguard(
        temp_dir.path(),
        &["verify", "--config", "verify.toml", "--report-dir", "blocked"],
    );

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Verdict: PASS"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("report not written"));
}
