//! Snapshot differ laws and scenarios.

use isoguard_core::diff::{compute_diff, render_human_summary};
use isoguard_core::snapshot::{FileRecord, Snapshot};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn snapshot(files: &BTreeMap<String, String>) -> Snapshot {
    Snapshot::from_records(
        "/cache",
        "sha256",
        files.iter().map(|(path, hash)| FileRecord {
            path: path.clone(),
            content_hash: hash.clone(),
            size: hash.len() as u64,
            modified_at: None,
        }),
        Vec::new(),
    )
}

fn files_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("[a-e]{1,3}(/[a-e]{1,2})?", "[0-3]", 0..12)
}

proptest! {
    #[test]
    fn prop_self_diff_is_empty(files in files_strategy()) {
        let s = snapshot(&files);
        let diff = compute_diff(&s, &s).unwrap();
        prop_assert!(diff.is_empty());
        prop_assert_eq!(diff.unchanged, files.len());
    }

    #[test]
    fn prop_disjoint_snapshots_remove_all_and_add_all(
        left in prop::collection::btree_map("l[a-e]{1,4}", "[0-3]", 0..10),
        right in prop::collection::btree_map("r[a-e]{1,4}", "[0-3]", 0..10),
    ) {
        let diff = compute_diff(&snapshot(&left), &snapshot(&right)).unwrap();
        prop_assert_eq!(diff.removed, left.keys().cloned().collect::<Vec<_>>());
        prop_assert_eq!(diff.added, right.keys().cloned().collect::<Vec<_>>());
        prop_assert!(diff.changed.is_empty());
    }

    #[test]
    fn prop_partition_covers_union(before in files_strategy(), after in files_strategy()) {
        let diff = compute_diff(&snapshot(&before), &snapshot(&after)).unwrap();

        let mut seen = std::collections::BTreeSet::new();
        for p in diff.changed.iter().chain(&diff.added).chain(&diff.removed) {
            prop_assert!(seen.insert(p.clone()), "path {} classified twice", p);
        }
        let union: std::collections::BTreeSet<_> =
            before.keys().chain(after.keys()).cloned().collect();
        prop_assert_eq!(diff.total_paths(), union.len());
    }
}

// Scenario: a.txt captured, b.txt added → Pass-shaped diff
#[test]
fn test_added_file_only() {
    let mut before = BTreeMap::new();
    before.insert("a.txt".to_string(), "hashX".to_string());
    let mut after = before.clone();
    after.insert("b.txt".to_string(), "hashY".to_string());

    let diff = compute_diff(&snapshot(&before), &snapshot(&after)).unwrap();
    assert_eq!(diff.added, vec!["b.txt"]);
    assert!(diff.changed.is_empty());
    assert!(diff.removed.is_empty());
    assert!(!diff.violates_isolation());
}

// Scenario: a.txt overwritten between captures → Fail-shaped diff
#[test]
fn test_overwritten_file_is_changed() {
    let mut before = BTreeMap::new();
    before.insert("a.txt".to_string(), "hashX".to_string());
    let mut after = BTreeMap::new();
    after.insert("a.txt".to_string(), "hashZ".to_string());

    let diff = compute_diff(&snapshot(&before), &snapshot(&after)).unwrap();
    assert_eq!(diff.changed, vec!["a.txt"]);
    assert!(diff.violates_isolation());
    assert!(render_human_summary(&diff).contains("`a.txt`"));
}

#[test]
fn test_diff_is_deterministic_when_serialized() {
    let mut before = BTreeMap::new();
    before.insert("x/1".to_string(), "0".to_string());
    before.insert("x/2".to_string(), "1".to_string());
    let mut after = BTreeMap::new();
    after.insert("x/2".to_string(), "2".to_string());
    after.insert("x/3".to_string(), "3".to_string());

    let d1 = compute_diff(&snapshot(&before), &snapshot(&after)).unwrap();
    let d2 = compute_diff(&snapshot(&before), &snapshot(&after)).unwrap();
    assert_eq!(
        serde_json::to_string(&d1).unwrap(),
        serde_json::to_string(&d2).unwrap()
    );
}
