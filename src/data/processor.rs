//! Data Processor Module
//! Row filtering and column-list handling applied before aggregation.

use super::loader::SchemaError;
use super::table::{Table, BLANK_KEY};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("No key columns given")]
    EmptyKeyList,
    #[error("Key column '{0}' listed more than once")]
    DuplicateKey(String),
}

/// Handles data cleaning operations on loaded tables.
pub struct DataProcessor;

impl DataProcessor {
    /// Split a comma-separated column list, trimming names and dropping blanks.
    ///
    /// `"Metadata_Day, Metadata_Condition,"` -> `["Metadata_Day", "Metadata_Condition"]`
    pub fn parse_column_list(list: &str) -> Result<Vec<String>, ProcessorError> {
        let mut columns: Vec<String> = Vec::new();
        for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if columns.iter().any(|c| c == name) {
                return Err(ProcessorError::DuplicateKey(name.to_string()));
            }
            columns.push(name.to_string());
        }
        if columns.is_empty() {
            return Err(ProcessorError::EmptyKeyList);
        }
        Ok(columns)
    }

    /// Keep only rows where `left` and `right` hold the same value.
    ///
    /// Values are compared as text after blank normalisation, so two blank
    /// cells match each other.
    pub fn filter_matching_columns(
        table: &Table,
        left: &str,
        right: &str,
    ) -> Result<Table, ProcessorError> {
        let (li, ri) = match (table.column_index(left), table.column_index(right)) {
            (Some(li), Some(ri)) => (li, ri),
            _ => {
                return Err(SchemaError {
                    missing: table.missing_columns([left, right]),
                    available: table.header().to_vec(),
                }
                .into())
            }
        };

        let filtered = table.retain_rows(|row| {
            let l = row.cell(li).as_text().unwrap_or(BLANK_KEY);
            let r = row.cell(ri).as_text().unwrap_or(BLANK_KEY);
            l == r
        });

        if filtered.row_count() == 0 {
            warn!(left, right, "no rows where {left} == {right}");
        } else {
            info!(
                left,
                right,
                kept = filtered.row_count(),
                dropped = table.row_count() - filtered.row_count(),
                "filtered rows on matching columns"
            );
        }
        Ok(filtered)
    }
}
