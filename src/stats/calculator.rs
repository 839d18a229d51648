//! Statistics Calculator Module
//! Explicit measurement parsing and per-group descriptive statistics.

use crate::data::Cell;
use serde::Serialize;

/// Result of parsing one measurement cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement {
    Numeric(f64),
    NotNumeric,
}

/// Statistics for a single group.
///
/// `mean`, `std` and `sem` are `None` when undefined, never zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub sem: Option<f64>,
    pub skipped: usize,
}

impl Default for GroupStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: None,
            std: None,
            sem: None,
            skipped: 0,
        }
    }
}

impl GroupStats {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Parse a value cell. Never fails: anything that is not a finite
    /// number (blank, text, `NaN`, `inf`) is `NotNumeric`.
    pub fn parse_measurement(cell: &Cell) -> Measurement {
        let Some(text) = cell.as_text() else {
            return Measurement::NotNumeric;
        };
        match text.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Measurement::Numeric(v),
            _ => Measurement::NotNumeric,
        }
    }

    /// Compute descriptive statistics for an array of values.
    ///
    /// Standard deviation uses the sample (n - 1) denominator and is undefined
    /// below two values; sem follows std.
    pub fn compute_descriptive_stats(values: &[f64], skipped: usize) -> GroupStats {
        let n = values.len();
        if n == 0 {
            return GroupStats {
                skipped,
                ..GroupStats::default()
            };
        }

        let mean = values.iter().sum::<f64>() / n as f64;

        let std = if n > 1 {
            let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            Some(variance.sqrt())
        } else {
            None
        };
        let sem = std.map(|s| s / (n as f64).sqrt());

        GroupStats {
            count: n,
            mean: Some(mean),
            std,
            sem,
            skipped,
        }
    }
}
