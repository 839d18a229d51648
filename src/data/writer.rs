//! Summary Writer Module
//! Renders a [`Summary`] as a Polars DataFrame and writes it atomically.

use crate::stats::Summary;
use polars::prelude::*;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

/// Marker written for undefined statistics.
pub const DEFAULT_NULL_MARKER: &str = "NA";

#[derive(Error, Debug)]
pub enum WriterError {
    #[error("Failed to build output table: {0}")]
    Polars(#[from] PolarsError),
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    pub delimiter: u8,
    pub null_marker: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            null_marker: DEFAULT_NULL_MARKER.to_string(),
        }
    }
}

/// Output column names derived from the measurement column.
pub fn stat_column_names(value_column: &str) -> [String; 5] {
    [
        format!("{value_column}_mean"),
        format!("{value_column}_n"),
        format!("{value_column}_std"),
        format!("{value_column}_sem"),
        format!("{value_column}_skipped"),
    ]
}

/// Writes summaries to delimited files.
pub struct SummaryWriter;

impl SummaryWriter {
    /// Build the output frame: key columns in the order supplied, then stats.
    pub fn to_dataframe(summary: &Summary) -> Result<DataFrame, WriterError> {
        let mut columns: Vec<Column> = summary
            .key_columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let values: Vec<String> = summary
                    .rows
                    .iter()
                    .map(|r| r.key.values()[i].clone())
                    .collect();
                Column::new(name.as_str().into(), values)
            })
            .collect();

        let [mean, n, std, sem, skipped] = stat_column_names(&summary.value_column);
        let means: Vec<Option<f64>> = summary.rows.iter().map(|r| r.stats.mean).collect();
        let counts: Vec<u64> = summary.rows.iter().map(|r| r.stats.count as u64).collect();
        let stds: Vec<Option<f64>> = summary.rows.iter().map(|r| r.stats.std).collect();
        let sems: Vec<Option<f64>> = summary.rows.iter().map(|r| r.stats.sem).collect();
        let skips: Vec<u64> = summary.rows.iter().map(|r| r.stats.skipped as u64).collect();

        columns.extend([
            Column::new(mean.into(), means),
            Column::new(n.into(), counts),
            Column::new(std.into(), stds),
            Column::new(sem.into(), sems),
            Column::new(skipped.into(), skips),
        ]);

        Ok(DataFrame::new(columns)?)
    }

    /// Render `summary` into a temporary file beside `path`.
    ///
    /// Nothing appears at `path` until the returned file is persisted.
    pub fn render_table(
        path: &Path,
        summary: &Summary,
        options: &WriteOptions,
    ) -> Result<NamedTempFile, WriterError> {
        let mut df = Self::to_dataframe(summary)?;

        let mut tmp = temp_beside(path)?;
        CsvWriter::new(&mut tmp)
            .include_header(true)
            .with_separator(options.delimiter)
            .with_null_value(options.null_marker.clone())
            .finish(&mut df)?;
        tmp.as_file().sync_all()?;
        Ok(tmp)
    }

    /// Render the summary (rows and warnings) as pretty JSON beside `path`.
    pub fn render_report(path: &Path, summary: &Summary) -> Result<NamedTempFile, WriterError> {
        let mut tmp = temp_beside(path)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, summary)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        Ok(tmp)
    }

    /// Move a rendered file into place.
    pub fn persist(rendered: NamedTempFile, path: &Path) -> Result<(), WriterError> {
        rendered.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Write `summary` to `path`; `path` is either the complete table or untouched.
    pub fn write_table(
        path: &Path,
        summary: &Summary,
        options: &WriteOptions,
    ) -> Result<(), WriterError> {
        let rendered = Self::render_table(path, summary, options)?;
        Self::persist(rendered, path)?;
        info!(path = %path.display(), groups = summary.group_count(), "wrote summary table");
        Ok(())
    }

    /// Write the summary as pretty JSON to `path`.
    pub fn write_report(path: &Path, summary: &Summary) -> Result<(), WriterError> {
        let rendered = Self::render_report(path, summary)?;
        Self::persist(rendered, path)?;
        info!(path = %path.display(), "wrote run report");
        Ok(())
    }
}

fn temp_beside(path: &Path) -> Result<NamedTempFile, WriterError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(NamedTempFile::new_in(dir)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{KeyTuple, Table};
    use crate::stats::{GroupAggregator, GroupStats, SummaryRow};

    fn summary() -> Summary {
        Summary {
            key_columns: vec!["day".into(), "cond".into()],
            value_column: "cnt".into(),
            rows: vec![
                SummaryRow {
                    key: KeyTuple::new(vec!["1".into(), "A".into()]),
                    stats: GroupStats {
                        count: 2,
                        mean: Some(20.0),
                        std: Some(1.5),
                        sem: Some(0.5),
                        skipped: 0,
                    },
                },
                SummaryRow {
                    key: KeyTuple::new(vec!["".into(), "B".into()]),
                    stats: GroupStats {
                        skipped: 1,
                        ..GroupStats::default()
                    },
                },
            ],
            warnings: Vec::new(),
            skipped_rows: 1,
        }
    }

    #[test]
    fn frame_has_keys_then_stats() {
        let df = SummaryWriter::to_dataframe(&summary()).unwrap();
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(
            names,
            vec!["day", "cond", "cnt_mean", "cnt_n", "cnt_std", "cnt_sem", "cnt_skipped"]
        );
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn undefined_stats_use_null_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        SummaryWriter::write_table(&path, &summary(), &WriteOptions::default()).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "day,cond,cnt_mean,cnt_n,cnt_std,cnt_sem,cnt_skipped");
        let first: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(&first[..2], ["1", "A"]);
        assert_eq!(first[2].parse::<f64>().unwrap(), 20.0);
        assert_eq!(first[3], "2");
        assert_eq!(first[4].parse::<f64>().unwrap(), 1.5);
        assert_eq!(first[6], "0");
        assert!(lines[2].ends_with("B,NA,0,NA,NA,1"));
    }

    #[test]
    fn empty_summary_writes_header_only() {
        let table = Table::from_records(["cond", "cnt"], Vec::new()).unwrap();
        let summary = GroupAggregator::new()
            .aggregate(&table, &["cond".to_string()], "cnt")
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        SummaryWriter::write_table(&path, &summary, &WriteOptions::default()).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 1);
    }

    #[test]
    fn rendered_table_is_invisible_until_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rendered =
            SummaryWriter::render_table(&path, &summary(), &WriteOptions::default()).unwrap();
        assert!(!path.exists());

        SummaryWriter::persist(rendered, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn report_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("report.json");
        assert!(matches!(
            SummaryWriter::render_report(&path, &summary()),
            Err(WriterError::Io(_))
        ));
    }

    #[test]
    fn report_serializes_rows_and_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        SummaryWriter::write_report(&path, &summary()).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["rows"][0]["key"], serde_json::json!(["1", "A"]));
        assert_eq!(json["rows"][0]["mean"], serde_json::json!(20.0));
        assert!(json["rows"][1]["mean"].is_null());
        assert_eq!(json["skipped_rows"], 1);
    }
}
