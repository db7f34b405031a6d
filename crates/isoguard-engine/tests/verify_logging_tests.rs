mod common;

use common::{plan, PayloadSut};
use isoguard_core::fingerprint::Sha256Fingerprinter;
use isoguard_core::logging_facility::schema::{
    EVENT_END, EVENT_END_ERROR, FIELD_PHASE, FIELD_RUN_ID, FIELD_VERDICT,
};
use isoguard_core::logging_facility::test_capture::init_test_capture;
use isoguard_engine::verify_isolation;
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_run_logs_verdict_and_aborted_phase() {
    let log = init_test_capture();
    let dir = TempDir::new().unwrap();

    let passing = plan(
        &dir.path().join("ok"),
        json!({ "writes": { "a.txt": "x" } }),
        json!({}),
    );
    let aborted = plan(&dir.path().join("bad"), json!({ "status": 500 }), json!({}));
    let sut = PayloadSut::default();
    let pass_outcome = verify_isolation(&passing, &sut, &Sha256Fingerprinter::default());
    let abort_outcome = verify_isolation(&aborted, &sut, &Sha256Fingerprinter::default());

    let runs = log.events_for("verify_isolation");
    let pass_id = pass_outcome.run_id().to_string();
    let abort_id = abort_outcome.run_id().to_string();

    let pass_end = runs
        .iter()
        .find(|e| e.event() == Some(EVENT_END) && e.field(FIELD_RUN_ID) == Some(pass_id.as_str()))
        .expect("pass end event");
    assert_eq!(pass_end.field(FIELD_VERDICT), Some("pass"));

    let abort_error = runs
        .iter()
        .find(|e| {
            e.event() == Some(EVENT_END_ERROR) && e.field(FIELD_RUN_ID) == Some(abort_id.as_str())
        })
        .expect("aborted end_error event");
    assert_eq!(abort_error.field(FIELD_PHASE), Some("first_invocation"));
}
