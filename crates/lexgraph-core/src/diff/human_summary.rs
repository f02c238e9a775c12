//! Human-readable summary renderer for drift results.

use crate::diff::model::{ChangeSummary, Classification, DiffResult};

/// Render a Markdown summary of one run's drift results.
///
/// Informational only; the structured [`DiffResult`]s are authoritative.
pub fn render_human_summary(results: &[DiffResult]) -> String {
    let mut out = String::new();

    out.push_str("## Drift Report\n\n");

    if results.is_empty() {
        out.push_str("_No documents were classified._\n");
        return out;
    }

    out.push_str("| Document | Classification | Prior | Current |\n|---|---|---|---|\n");
    for result in results {
        out.push_str(&format!(
            "| {} | {} | {} | `{}` |\n",
            result.id,
            result.classification,
            result
                .prior
                .as_ref()
                .map(|p| format!("`{}`", p.short()))
                .unwrap_or_else(|| "-".to_string()),
            result.current.short(),
        ));
    }
    out.push('\n');

    for result in results.iter().filter(|r| r.classification == Classification::Changed) {
        out.push_str(&format!("### {}\n\n", result.id));
        if let Some(at) = result.prior_recorded_at {
            out.push_str(&format!("Last accepted: {}\n\n", at.format("%Y-%m-%d %H:%M:%S UTC")));
        }
        match &result.summary {
            Some(summary) => render_change_summary(&mut out, summary),
            None => out.push_str("_No structural summary available._\n\n"),
        }
    }

    out
}

fn render_change_summary(out: &mut String, summary: &ChangeSummary) {
    if let Some(note) = &summary.note {
        out.push_str(&format!("_{note}_\n\n"));
        return;
    }
    if summary.is_empty() {
        out.push_str("_Content changed without structural differences (whitespace or markup only)._\n\n");
        return;
    }

    for change in &summary.metadata_changes {
        out.push_str(&format!(
            "- **{}**: {} → {}\n",
            change.field,
            change.before.as_deref().unwrap_or("(none)"),
            change.after.as_deref().unwrap_or("(none)"),
        ));
    }
    list(out, "Added articles", &summary.added_articles);
    list(out, "Removed articles", &summary.removed_articles);
    list(out, "Changed articles", &summary.changed_articles);
    out.push('\n');
}

fn list(out: &mut String, label: &str, paths: &[String]) {
    if !paths.is_empty() {
        out.push_str(&format!("- **{label}** ({}): {}\n", paths.len(), paths.join(", ")));
    }
}
