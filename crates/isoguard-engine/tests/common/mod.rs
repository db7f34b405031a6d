//! Shared fixtures for engine integration tests.
#![allow(dead_code)]

use isoguard_core::errors::{ExError, ExErrorKind, Result};
use isoguard_engine::{InvocationRequest, InvocationResponse, SystemUnderTest, VerifyPlan};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// Fake backend driven entirely by the workload payload:
///
/// - `root`: directory to write into
/// - `writes`: `{relative path: content}` written before answering
/// - `delete`: relative paths removed before answering
/// - `status`: HTTP-like status returned (default 200)
/// - `sleep_ms`: delay before answering
/// - `transport_error`: fail as if the connection broke
#[derive(Default)]
pub struct PayloadSut {
    pub calls: Mutex<Vec<InvocationRequest>>,
}

impl PayloadSut {
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl SystemUnderTest for PayloadSut {
    fn invoke(&self, request: &InvocationRequest, _timeout: Duration) -> Result<InvocationResponse> {
        self.calls.lock().unwrap().push(request.clone());
        let payload = &request.payload;

        if let Some(ms) = payload["sleep_ms"].as_u64() {
            std::thread::sleep(Duration::from_millis(ms));
        }
        if payload["transport_error"].as_bool() == Some(true) {
            return Err(ExError::new(ExErrorKind::InvocationError).with_message("connection reset"));
        }

        let root = PathBuf::from(payload["root"].as_str().unwrap());
        if let Some(writes) = payload["writes"].as_object() {
            for (rel, content) in writes {
                let path = root.join(rel);
                std::fs::create_dir_all(path.parent().unwrap()).unwrap();
                std::fs::write(path, content.as_str().unwrap()).unwrap();
            }
        }
        if let Some(deletes) = payload["delete"].as_array() {
            for rel in deletes {
                std::fs::remove_file(root.join(rel.as_str().unwrap())).unwrap();
            }
        }

        let status = payload["status"].as_u64().unwrap_or(200) as u16;
        Ok(InvocationResponse {
            status,
            success: (200..300).contains(&status),
        })
    }
}

pub fn workload(root: &Path, extra: Value) -> Value {
    let mut payload = json!({ "root": root.display().to_string() });
    if let (Some(obj), Some(extra)) = (payload.as_object_mut(), extra.as_object()) {
        for (k, v) in extra {
            obj.insert(k.clone(), v.clone());
        }
    }
    payload
}

pub fn plan(root: &Path, first: Value, second: Value) -> VerifyPlan {
    VerifyPlan {
        root: root.to_path_buf(),
        first_payload: workload(root, first),
        second_payload: workload(root, second),
        period: "5000".to_string(),
        end_date: "2024-09-30".to_string(),
        grace_period: Duration::ZERO,
        invocation_timeout: Duration::from_secs(10),
        capture_timeout: Duration::from_secs(10),
        workers: 2,
        cleanup_on_exit: false,
    }
}
