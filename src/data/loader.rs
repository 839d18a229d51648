//! CSV Data Loader Module
//! Handles CSV file loading and column validation using Polars.

use super::table::{Cell, Row, Table, TableError};
use polars::prelude::*;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Delimiter used when none is configured.
pub const DEFAULT_DELIMITER: u8 = b',';

/// One or more requested columns are absent from the header.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", describe_missing(.missing, .available))]
pub struct SchemaError {
    pub missing: Vec<String>,
    pub available: Vec<String>,
}

impl SchemaError {
    /// Check `key_columns` and `value_column` against the table header.
    pub fn check(table: &Table, key_columns: &[String], value_column: &str) -> Result<(), Self> {
        let requested = key_columns
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(value_column));
        let missing = table.missing_columns(requested);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SchemaError {
                missing,
                available: table.header().to_vec(),
            })
        }
    }

    /// Case-insensitive near misses for each missing column.
    pub fn suggestions(&self) -> Vec<(&str, &str)> {
        self.missing
            .iter()
            .filter_map(|m| {
                self.available
                    .iter()
                    .find(|a| a.eq_ignore_ascii_case(m))
                    .map(|a| (m.as_str(), a.as_str()))
            })
            .collect()
    }
}

fn describe_missing(missing: &[String], available: &[String]) -> String {
    let mut msg = format!("Column(s) not found: {}", missing.join(", "));
    let hints: Vec<String> = missing
        .iter()
        .filter_map(|m| {
            available
                .iter()
                .find(|a| a.eq_ignore_ascii_case(m))
                .map(|a| format!("'{m}' -> '{a}'"))
        })
        .collect();
    if !hints.is_empty() {
        msg.push_str(&format!(" (did you mean {}?)", hints.join(", ")));
    }
    msg.push_str(&format!(". Available columns: {}", available.join(", ")));
    msg
}

/// Polars renames a repeated header name to `<name>_duplicated_<n>`; map
/// such a column back to the name that was repeated in the file.
fn renamed_duplicate(header: &[String]) -> Option<String> {
    header.iter().find_map(|name| {
        let (base, n) = name.rsplit_once("_duplicated_")?;
        let numbered = !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit());
        (numbered && header.iter().any(|h| h == base)).then(|| base.to_string())
    })
}

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Input file not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("At least one key column is required")]
    NoKeyColumns,
}

/// Loads delimited exports into a [`Table`].
pub struct DataLoader {
    delimiter: u8,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Read the file at `path` without validating any columns.
    ///
    /// Schema inference is disabled so every cell arrives as text and no
    /// value is coerced before the aggregator parses it explicitly.
    pub fn read_table(&self, path: &Path) -> Result<Table, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::NotFound(path.display().to_string()));
        }

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_separator(self.delimiter)
            .with_infer_schema_length(Some(0))
            .finish()?
            .collect()?;

        let header: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        if let Some(name) = renamed_duplicate(&header) {
            return Err(TableError::DuplicateColumn(name).into());
        }

        let mut cells: Vec<Vec<Cell>> = (0..df.height())
            .map(|_| Vec::with_capacity(header.len()))
            .collect();

        for column in df.get_columns() {
            let text = column.as_materialized_series().cast(&DataType::String)?;
            for (row, value) in cells.iter_mut().zip(text.str()?.into_iter()) {
                row.push(Cell::from_raw(value));
            }
        }

        let table = Table::from_records(header, cells.into_iter().map(Row::new).collect())?;
        debug!(
            path = %path.display(),
            columns = table.header().len(),
            rows = table.row_count(),
            "read input table"
        );
        Ok(table)
    }

    /// Read the table at `path` and check the requested columns exist.
    pub fn load(
        &self,
        path: &Path,
        key_columns: &[String],
        value_column: &str,
    ) -> Result<Table, LoaderError> {
        if key_columns.is_empty() {
            return Err(LoaderError::NoKeyColumns);
        }

        let table = self.read_table(path)?;
        SchemaError::check(&table, key_columns, value_column)?;

        info!(
            path = %path.display(),
            rows = table.row_count(),
            keys = ?key_columns,
            value = value_column,
            "loaded input table"
        );
        Ok(table)
    }
}
