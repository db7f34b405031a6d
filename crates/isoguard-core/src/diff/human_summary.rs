//! Human-readable summary renderer for snapshot diffs.

use crate::diff::model::SnapshotDiff;

/// Render a short Markdown/text summary of a [`SnapshotDiff`].
pub fn render_human_summary(diff: &SnapshotDiff) -> String {
    let mut out = String::new();

    out.push_str("## Snapshot Diff\n\n");
    out.push_str(&format!(
        "- unchanged: {}\n- changed: {}\n- added: {}\n- removed: {}\n\n",
        diff.unchanged,
        diff.changed.len(),
        diff.added.len(),
        diff.removed.len()
    ));

    if diff.is_empty() {
        out.push_str("_No changes detected._\n");
        return out;
    }

    for (title, paths) in [
        ("Changed", &diff.changed),
        ("Removed", &diff.removed),
        ("Added", &diff.added),
    ] {
        if paths.is_empty() {
            continue;
        }
        out.push_str(&format!("### {}\n\n", title));
        for path in paths {
            out.push_str(&format!("- `{}`\n", path));
        }
        out.push('\n');
    }

    out
}
