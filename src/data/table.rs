//! In-memory Table Module
//! Rows of text cells sharing one validated header.

use serde::Serialize;
use thiserror::Error;

/// Sentinel used for blank or missing key cells.
pub const BLANK_KEY: &str = "";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TableError {
    #[error("Row {row} has {found} cells but the header has {expected} columns")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Duplicate column name '{0}' in header")]
    DuplicateColumn(String),
}

/// A single cell value as read from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Missing,
    Text(String),
}

impl Cell {
    /// Build a cell from an optional raw field; empty fields become `Missing`.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if !s.is_empty() => Cell::Text(s.to_string()),
            _ => Cell::Missing,
        }
    }

    /// Text content, or `None` for missing and whitespace-only cells.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::from_raw(Some(value))
    }
}

/// One row, aligned position-by-position with the owning table's header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    pub fn cell(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Ordered grouping-column values of one row.
///
/// Blank and missing cells are normalised to [`BLANK_KEY`] so that such rows
/// still form a group of their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct KeyTuple(Vec<String>);

impl KeyTuple {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    /// Extract the key for `row` from the pre-resolved column indices.
    pub fn from_row(row: &Row, key_indices: &[usize]) -> Self {
        Self(
            key_indices
                .iter()
                .map(|&i| row.cell(i).as_text().unwrap_or(BLANK_KEY).to_string())
                .collect(),
        )
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }
}

impl std::fmt::Display for KeyTuple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value:?}")?;
        }
        write!(f, ")")
    }
}

/// Header plus rows; every row has exactly the header's width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    /// Build a table, trimming column names and checking row widths.
    pub fn from_records<H, S>(header: H, rows: Vec<Row>) -> Result<Self, TableError>
    where
        H: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let header: Vec<String> = header
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .collect();

        for (i, name) in header.iter().enumerate() {
            if header[..i].contains(name) {
                return Err(TableError::DuplicateColumn(name.clone()));
            }
        }

        if let Some((row, found)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != header.len())
            .map(|(i, r)| (i + 1, r.len()))
        {
            return Err(TableError::RaggedRow {
                row,
                expected: header.len(),
                found,
            });
        }

        Ok(Self { header, rows })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column in the header (exact, case-sensitive match).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Names from `requested` that are not in the header, in request order.
    pub fn missing_columns<'a, I>(&self, requested: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut missing: Vec<String> = Vec::new();
        for name in requested {
            if self.column_index(name).is_none() && !missing.iter().any(|m| m == name) {
                missing.push(name.to_string());
            }
        }
        missing
    }

    /// A new table holding only the rows accepted by `keep`.
    pub fn retain_rows<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&Row) -> bool,
    {
        Table {
            header: self.header.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        Row::new(cells.iter().map(|c| Cell::from(*c)).collect())
    }

    #[test]
    fn header_names_are_trimmed() {
        let table = Table::from_records([" cond ", "cnt"], vec![row(&["A", "1"])]).unwrap();
        assert_eq!(table.header(), &["cond".to_string(), "cnt".to_string()]);
        assert_eq!(table.column_index("cond"), Some(0));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = Table::from_records(["a", "b"], vec![row(&["1", "2"]), row(&["3"])]).unwrap_err();
        assert_eq!(
            err,
            TableError::RaggedRow {
                row: 2,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn duplicate_header_is_rejected() {
        let err = Table::from_records(["a", " a"], Vec::new()).unwrap_err();
        assert_eq!(err, TableError::DuplicateColumn("a".into()));
    }

    #[test]
    fn blank_key_cells_collapse_to_sentinel() {
        let table = Table::from_records(
            ["cond", "day"],
            vec![row(&["", "1"]), row(&["   ", "1"]), Row::new(vec![Cell::Missing, "1".into()])],
        )
        .unwrap();

        let keys: Vec<KeyTuple> = table
            .rows()
            .iter()
            .map(|r| KeyTuple::from_row(r, &[0, 1]))
            .collect();
        assert!(keys.iter().all(|k| k.values() == ["", "1"]));
    }

    #[test]
    fn missing_columns_keeps_request_order_without_duplicates() {
        let table = Table::from_records(["a"], Vec::new()).unwrap();
        assert_eq!(table.missing_columns(["z", "a", "y", "z"]), vec!["z", "y"]);
    }
}
