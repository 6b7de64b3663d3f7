//! Batch report generation.
//!
//! This module renders a [`BatchReport`] as Markdown or JSON. Analysis
//! results are embedded as-is; their contents are never interpreted.

use crate::models::{BatchItem, BatchReport, BatchSummary, Outcome, ReportMetadata};
use anyhow::Result;
use serde::Serialize;
use std::path::Path;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &BatchReport, metadata: &ReportMetadata) -> String {
    let mut output = String::new();

    // Title
    output.push_str("# cyclecheck Batch Report\n\n");

    // Metadata section
    output.push_str(&generate_metadata_section(metadata));

    // Summary section
    output.push_str(&generate_summary_section(&metadata.summary));

    // Items in input order
    output.push_str(&generate_items_section(&report.items));

    // Footer
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Program:** `{}`\n", metadata.program));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the summary section.
fn generate_summary_section(summary: &BatchSummary) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str("| ✅ Succeeded | ❌ Failed | **Total** |\n");
    section.push_str("|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | **{}** |\n\n",
        summary.succeeded, summary.failed, summary.total
    ));

    section
}

/// Generate one section per batch item.
fn generate_items_section(items: &[BatchItem]) -> String {
    let mut section = String::new();

    section.push_str("## Results\n\n");

    if items.is_empty() {
        section.push_str("No inputs were analyzed.\n\n");
        return section;
    }

    for (index, item) in items.iter().enumerate() {
        section.push_str(&generate_item_block(index, item));
    }

    section
}

/// Generate a single item block.
fn generate_item_block(index: usize, item: &BatchItem) -> String {
    let mut block = String::new();

    let badge = if item.is_success() {
        "✅ **OK**"
    } else {
        "❌ **FAILED**"
    };

    block.push_str(&format!(
        "### {}. {} `{}`\n\n",
        index + 1,
        badge,
        item.input.display()
    ));

    match &item.outcome {
        Outcome::Success(result) => {
            let pretty =
                serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string());
            block.push_str("<details>\n<summary>View Result</summary>\n\n```json\n");
            block.push_str(&pretty);
            block.push_str("\n```\n</details>\n\n");
        }
        Outcome::Failure(error) => {
            block.push_str(&format!("> **Error:** {}\n\n", error));
        }
    }

    block.push_str("---\n\n");

    block
}

/// Generate the report footer.
fn generate_footer() -> String {
    "*Report generated by cyclecheck*\n".to_string()
}

#[derive(Serialize)]
struct JsonReport<'a> {
    metadata: &'a ReportMetadata,
    items: &'a [BatchItem],
}

/// Generate a JSON report.
pub fn generate_json_report(report: &BatchReport, metadata: &ReportMetadata) -> Result<String> {
    let document = JsonReport {
        metadata,
        items: &report.items,
    };
    serde_json::to_string_pretty(&document).map_err(Into::into)
}

/// Write rendered report content to a file.
pub fn write_report(content: &str, path: &Path) -> Result<()> {
    std::fs::write(path, content)?;
    Ok(())
}
