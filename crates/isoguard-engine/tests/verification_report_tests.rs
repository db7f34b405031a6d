mod common;

use common::{plan, PayloadSut};
use isoguard_core::fingerprint::Sha256Fingerprinter;
use isoguard_engine::{
    render_verification_summary, verify_isolation, write_verification_report, VerificationOutcome,
};
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_fail_report_files() {
    let dir = TempDir::new().unwrap();
    let plan = plan(
        &dir.path().join("cache"),
        json!({ "writes": { "a.txt": "x" } }),
        json!({ "writes": { "a.txt": "y" } }),
    );
    let outcome = verify_isolation(&plan, &PayloadSut::default(), &Sha256Fingerprinter::default());
    let out_dir = dir.path().join("reports");

    let paths = write_verification_report(&out_dir, &outcome).unwrap();

    assert_eq!(paths.json, out_dir.join("verification.json"));
    assert_eq!(paths.text, out_dir.join("verification.txt"));
    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&paths.json).unwrap()).unwrap();
    assert_eq!(json["verdict"], "fail");
    assert_eq!(json["diff"]["changed"][0], "a.txt");

    let reloaded: VerificationOutcome = serde_json::from_value(json).unwrap();
    assert_eq!(reloaded, outcome);

    let text = std::fs::read_to_string(&paths.text).unwrap();
    assert!(text.starts_with("Verdict: FAIL"));
    assert!(text.contains("- `a.txt`"));
}

#[test]
fn test_aborted_summary_names_phase() {
    let dir = TempDir::new().unwrap();
    let plan = plan(&dir.path().join("cache"), json!({ "status": 503 }), json!({}));
    let outcome = verify_isolation(&plan, &PayloadSut::default(), &Sha256Fingerprinter::default());

    let text = render_verification_summary(&outcome);

    assert!(text.starts_with("Verdict: ABORTED"));
    assert!(text.contains("Phase: first_invocation"));
    assert!(text.contains("ERR_SETUP_FAILED"));
    assert!(text.contains("Request: "));
}
