//! Cellcount Summary - per-condition averages of CellProfiler exports
//!
//! Loads a measurement table, groups rows by one or more condition columns,
//! and writes the mean (with n, std, sem) of a measurement column per group.

pub mod config;
pub mod data;
pub mod logging;
pub mod stats;

use anyhow::{Context, Result};
use tracing::{info, warn};

pub use config::{CliArgs, RunConfig, DEFAULT_VALUE_COLUMN};
pub use data::{DataLoader, DataProcessor, SchemaError, SummaryWriter, Table, WriteOptions};
pub use logging::{init_logging, LoggingConfig};
pub use stats::{EmptyGroupWarning, GroupAggregator, GroupOrder, Summary};

/// Load, filter and aggregate without touching the output path.
pub fn summarize(config: &RunConfig) -> Result<Summary> {
    let loader = DataLoader::new().with_delimiter(config.delimiter);
    let mut table = loader
        .load(&config.input_path, &config.key_columns, &config.value_column)
        .with_context(|| format!("failed to load {}", config.input_path.display()))?;

    if let Some((left, right)) = &config.match_columns {
        table = DataProcessor::filter_matching_columns(&table, left, right)?;
    }

    let summary = GroupAggregator::new()
        .with_order(config.order)
        .aggregate(&table, &config.key_columns, &config.value_column)?;
    Ok(summary)
}

/// Run the full pipeline: summarize, then write the table (and report).
///
/// Both files are rendered before either is moved into place, and the table
/// is moved last, so a failed run never leaves a summary table behind.
pub fn run(config: &RunConfig) -> Result<Summary> {
    let summary = summarize(config)?;

    let options = WriteOptions {
        delimiter: config.delimiter,
        null_marker: config.null_marker.clone(),
    };
    let table = SummaryWriter::render_table(&config.output_path, &summary, &options)
        .with_context(|| format!("failed to write {}", config.output_path.display()))?;

    if let Some(report) = &config.report_path {
        let rendered = SummaryWriter::render_report(report, &summary)
            .with_context(|| format!("failed to write report {}", report.display()))?;
        SummaryWriter::persist(rendered, report)
            .with_context(|| format!("failed to write report {}", report.display()))?;
        info!(path = %report.display(), "wrote run report");
    }

    SummaryWriter::persist(table, &config.output_path)
        .with_context(|| format!("failed to write {}", config.output_path.display()))?;
    info!(path = %config.output_path.display(), groups = summary.group_count(), "wrote summary table");

    if !summary.warnings.is_empty() {
        warn!(
            empty_groups = summary.warnings.len(),
            "some condition combinations had no numeric {} values",
            config.value_column
        );
    }
    info!(
        groups = summary.group_count(),
        skipped_rows = summary.skipped_rows,
        "summary complete"
    );
    Ok(summary)
}
