//! `newsvec index`: load a dataset, embed it and fill the vector store.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;

use newsvec_core::article::store::ArticleStore;
use newsvec_infra::dataset::nyt::load_articles;
use newsvec_types::article::IndexReport;

use crate::state::AppState;

/// Index the first `limit` rows of `csv`.
///
/// Ctrl+C stops submitting new batches and abandons calls still in flight;
/// articles from batches that already finished are still stored.
///
/// # Examples
///
/// ```bash
/// newsvec index nyt-metadata.csv --limit 5000 --reset
/// ```
pub async fn index(
    state: &AppState,
    csv: &Path,
    limit: usize,
    reset: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let path = csv.to_path_buf();
    let records = tokio::task::spawn_blocking(move || load_articles(&path, limit))
        .await?
        .with_context(|| format!("Failed to load dataset {}", csv.display()))?;

    if reset {
        state.store.reset().await.context("Failed to reset the vector store")?;
    }

    let batches = records
        .len()
        .div_ceil(state.config.pipeline.batch_size.get()) as u64;
    let bar = if json || quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(batches)
    };
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} batches ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar.enable_steady_tick(Duration::from_millis(120));

    let progress_bar = bar.clone();
    let service = state.indexing_service(move |p| {
        progress_bar.set_position(p.completed as u64);
        if p.failed > 0 {
            progress_bar.set_message(format!("{} failed", p.failed));
        }
    })?;

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let report = service.index_with_cancel(&records, &cancel).await;
    watcher.abort();
    bar.finish_and_clear();
    let report = report.context("Indexing failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !quiet {
        print_report(&report, state.store.count().await?);
    }
    Ok(())
}

fn print_report(report: &IndexReport, stored_total: u64) {
    println!();
    if report.cancelled {
        println!("  {} Indexing cancelled", style("!").yellow().bold());
    } else {
        println!("  {} Indexing finished", style("✓").green().bold());
    }
    println!();
    println!("  {}  {}", style("Articles:").bold(), report.total);
    println!("  {}   {}", style("Indexed:").bold(), style(report.indexed).green());
    if !report.failed_ids.is_empty() {
        println!(
            "  {}    {}",
            style("Failed:").bold(),
            style(report.failed_ids.len()).red()
        );
    }
    println!("  {}     {}", style("Store:").bold(), style(stored_total).cyan());
    println!();
}
