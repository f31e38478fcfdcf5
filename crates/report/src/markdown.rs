use extract::{DocumentResult, Topic, SENTINEL};
use std::fmt::Write;

/// Render the full report: table of contents, one section per topic in
/// declaration order, then any documents that failed.
pub fn render_markdown(topics: &[Topic], results: &[DocumentResult], generated_at: &str) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Document Analysis Report\n");
    let _ = writeln!(out, "Generated on: {}\n", generated_at);
    let _ = writeln!(
        out,
        "**This report contains information extracted from the analyzed documents.**\n"
    );

    out.push_str("## Table of Contents\n\n");
    for topic in topics {
        let _ = writeln!(out, "- {}", topic.heading());
    }
    out.push('\n');

    for topic in topics {
        let _ = writeln!(out, "## {}\n", topic.heading());

        let mut has_content = false;
        for doc in results.iter().filter(|d| !d.is_failed()) {
            let Some(result) = doc.get(topic) else {
                continue;
            };
            if result.is_empty() {
                continue;
            }

            has_content = true;
            let _ = writeln!(out, "### From: {}\n", doc.document_name);
            let _ = writeln!(out, "{}\n", result.content.trim());
            if !result.citations.is_empty() {
                let pages: Vec<String> = result.citations.iter().map(|p| p.to_string()).collect();
                let _ = writeln!(out, "_Pages cited: {}_\n", pages.join(", "));
            }
            out.push_str("---\n\n");
        }

        if !has_content {
            let _ = writeln!(out, "{}\n", SENTINEL);
        }
    }

    let failed: Vec<&DocumentResult> = results.iter().filter(|d| d.is_failed()).collect();
    if !failed.is_empty() {
        out.push_str("## Failed Documents\n\n");
        for doc in failed {
            let _ = writeln!(
                out,
                "- **{}** ({}): {}",
                doc.document_name,
                doc.document_path,
                doc.failure.as_deref().unwrap_or_default()
            );
        }
        out.push('\n');
    }

    out
}
