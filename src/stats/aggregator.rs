//! Group Aggregator Module
//! Partitions rows by key tuple and summarises the measurement column.

use super::calculator::{GroupStats, Measurement, StatsCalculator};
use crate::data::{KeyTuple, SchemaError, Table};
use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("At least one key column is required")]
    NoKeyColumns,
}

/// Output ordering of summary rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupOrder {
    /// Order in which each key combination first appears in the input.
    #[default]
    FirstSeen,
    /// Lexicographic by key tuple. Keys are compared as text, so `"10"`
    /// sorts before `"2"`.
    Sorted,
}

/// A group that had no numeric value to average.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyGroupWarning {
    pub key: KeyTuple,
    pub skipped: usize,
}

impl std::fmt::Display for EmptyGroupWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "group {} has no numeric values ({} row(s) skipped)",
            self.key, self.skipped
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub key: KeyTuple,
    #[serde(flatten)]
    pub stats: GroupStats,
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub key_columns: Vec<String>,
    pub value_column: String,
    pub rows: Vec<SummaryRow>,
    pub warnings: Vec<EmptyGroupWarning>,
    pub skipped_rows: usize,
}

impl Summary {
    pub fn group_count(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, key: &[&str]) -> Option<&GroupStats> {
        self.rows
            .iter()
            .find(|r| r.key.values().iter().map(String::as_str).eq(key.iter().copied()))
            .map(|r| &r.stats)
    }
}

#[derive(Default)]
struct GroupAccumulator {
    values: Vec<f64>,
    skipped: usize,
}

/// Groups rows and computes the per-group mean of a value column.
pub struct GroupAggregator {
    order: GroupOrder,
}

impl Default for GroupAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupAggregator {
    pub fn new() -> Self {
        Self {
            order: GroupOrder::FirstSeen,
        }
    }

    pub fn with_order(mut self, order: GroupOrder) -> Self {
        self.order = order;
        self
    }

    /// Aggregate `value_column` over the groups formed by `key_columns`.
    pub fn aggregate(
        &self,
        table: &Table,
        key_columns: &[String],
        value_column: &str,
    ) -> Result<Summary, AggregateError> {
        if key_columns.is_empty() {
            return Err(AggregateError::NoKeyColumns);
        }
        SchemaError::check(table, key_columns, value_column)?;

        let key_indices: Vec<usize> = key_columns
            .iter()
            .filter_map(|k| table.column_index(k))
            .collect();
        let value_index = table
            .column_index(value_column)
            .ok_or_else(|| SchemaError {
                missing: vec![value_column.to_string()],
                available: table.header().to_vec(),
            })?;

        let mut groups: IndexMap<KeyTuple, GroupAccumulator> = IndexMap::new();
        for (i, row) in table.rows().iter().enumerate() {
            let acc = groups
                .entry(KeyTuple::from_row(row, &key_indices))
                .or_default();
            match StatsCalculator::parse_measurement(row.cell(value_index)) {
                Measurement::Numeric(v) => acc.values.push(v),
                Measurement::NotNumeric => {
                    debug!(row = i + 1, column = value_column, "skipping non-numeric value");
                    acc.skipped += 1;
                }
            }
        }

        if self.order == GroupOrder::Sorted {
            groups.sort_keys();
        }

        let mut rows = Vec::with_capacity(groups.len());
        let mut warnings = Vec::new();
        let mut skipped_rows = 0;
        for (key, acc) in groups {
            skipped_rows += acc.skipped;
            let stats = StatsCalculator::compute_descriptive_stats(&acc.values, acc.skipped);
            if stats.is_empty() {
                let warning = EmptyGroupWarning {
                    key: key.clone(),
                    skipped: acc.skipped,
                };
                warn!("{warning}");
                warnings.push(warning);
            }
            rows.push(SummaryRow { key, stats });
        }

        debug!(
            groups = rows.len(),
            skipped_rows,
            empty_groups = warnings.len(),
            "aggregation complete"
        );

        Ok(Summary {
            key_columns: key_columns.to_vec(),
            value_column: value_column.to_string(),
            rows,
            warnings,
            skipped_rows,
        })
    }
}
