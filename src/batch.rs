//! Batch coordination.
//!
//! Each input is staged and analyzed independently. A failing item is
//! recorded and the batch moves on; the report always has one entry per
//! input, in input order, whatever order the items finish in.

use crate::analyzer::Analyzer;
use crate::models::{BatchItem, BatchReport};
use crate::runner::ProcessRunner;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Maximum number of items in flight (1 runs sequentially).
    pub concurrency: usize,
    /// Show a progress bar on stderr.
    pub show_progress: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            show_progress: false,
        }
    }
}

/// Analyze every input and collect one outcome per input.
pub async fn run_batch<R: ProcessRunner>(
    analyzer: &Analyzer<R>,
    inputs: &[PathBuf],
    options: &BatchOptions,
) -> BatchReport {
    let concurrency = options.concurrency.max(1);
    info!(
        "Running batch of {} inputs (concurrency {})",
        inputs.len(),
        concurrency
    );

    let progress = progress_bar(inputs.len(), options.show_progress);

    // `buffered` yields in submission order, not completion order.
    let items: Vec<BatchItem> = stream::iter(inputs.iter().enumerate())
        .map(|(index, input)| analyze_item(analyzer, index, input.as_path()))
        .buffered(concurrency)
        .inspect(|_| progress.inc(1))
        .collect()
        .await;

    progress.finish_and_clear();

    let report = BatchReport { items };
    let summary = report.summary();
    info!(
        "Batch complete: {} succeeded, {} failed",
        summary.succeeded, summary.failed
    );

    report
}

async fn analyze_item<R: ProcessRunner>(
    analyzer: &Analyzer<R>,
    index: usize,
    input: &Path,
) -> BatchItem {
    match analyzer.analyze_file(input).await {
        Ok(result) => {
            info!("[{}] {}: ok", index + 1, input.display());
            BatchItem::success(input.to_path_buf(), result)
        }
        Err(e) => {
            warn!("[{}] {}: {}", index + 1, input.display(), e);
            BatchItem::failure(input.to_path_buf(), e.to_string())
        }
    }
}

fn progress_bar(len: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}
