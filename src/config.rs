use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::data::{DataProcessor, DEFAULT_NULL_MARKER};
use crate::stats::GroupOrder;

/// Measurement column averaged when none is given (CellProfiler per-image count).
pub const DEFAULT_VALUE_COLUMN: &str = "Count_Cells";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "cellcount-summary",
    version,
    about = "Average CellProfiler measurements per experimental condition"
)]
pub struct CliArgs {
    /// Path to the CellProfiler CSV export
    #[arg(value_name = "INPUT_CSV", env = "CELLCOUNT_INPUT")]
    pub input_csv: PathBuf,

    /// Path of the summary CSV to write
    #[arg(value_name = "OUTPUT_CSV", env = "CELLCOUNT_OUTPUT")]
    pub output_csv: PathBuf,

    /// Condition column(s); comma-separated for several (e.g. Metadata_Day,Metadata_Condition)
    #[arg(value_name = "CONDITION_COLS", env = "CELLCOUNT_CONDITIONS")]
    pub condition_cols: String,

    /// Measurement column to average
    #[arg(value_name = "MEASURE_COL", env = "CELLCOUNT_MEASURE")]
    pub measure_col: Option<String>,

    /// Keep only rows where two columns are equal, given as LEFT,RIGHT
    #[arg(long, value_name = "LEFT,RIGHT", env = "CELLCOUNT_MATCH_COLUMNS")]
    pub match_columns: Option<String>,

    /// Sort groups by key instead of first-seen order (text comparison: "10" sorts before "2")
    #[arg(long, env = "CELLCOUNT_SORT_KEYS")]
    pub sort_keys: bool,

    /// Field delimiter for input and output
    #[arg(long, default_value_t = ',', env = "CELLCOUNT_DELIMITER")]
    pub delimiter: char,

    /// Text written for undefined statistics
    #[arg(long, default_value = DEFAULT_NULL_MARKER, env = "CELLCOUNT_NULL_MARKER")]
    pub null_marker: String,

    /// Also write a JSON report of the summary and its warnings
    #[arg(long, value_name = "PATH", env = "CELLCOUNT_REPORT")]
    pub report: Option<PathBuf>,
}

/// Everything one run needs, resolved once from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub key_columns: Vec<String>,
    pub value_column: String,
    pub match_columns: Option<(String, String)>,
    pub order: GroupOrder,
    pub delimiter: u8,
    pub null_marker: String,
    pub report_path: Option<PathBuf>,
}

impl RunConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            input_csv,
            output_csv,
            condition_cols,
            measure_col,
            match_columns,
            sort_keys,
            delimiter,
            null_marker,
            report,
        } = args;

        let key_columns = DataProcessor::parse_column_list(&condition_cols)
            .with_context(|| format!("invalid condition columns {condition_cols:?}"))?;

        let value_column = measure_col
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_VALUE_COLUMN.to_string());

        let match_columns = match match_columns {
            Some(pair) => {
                let cols = DataProcessor::parse_column_list(&pair)
                    .with_context(|| format!("invalid --match-columns {pair:?}"))?;
                anyhow::ensure!(
                    cols.len() == 2,
                    "--match-columns expects exactly two column names, got {}",
                    cols.len()
                );
                Some((cols[0].clone(), cols[1].clone()))
            }
            None => None,
        };

        anyhow::ensure!(
            delimiter.is_ascii() && delimiter != '"' && delimiter != '\n',
            "delimiter must be a single ASCII character other than quote or newline"
        );

        Ok(Self {
            input_path: input_csv,
            output_path: output_csv,
            key_columns,
            value_column,
            match_columns,
            order: if sort_keys {
                GroupOrder::Sorted
            } else {
                GroupOrder::FirstSeen
            },
            delimiter: delimiter as u8,
            null_marker,
            report_path: report,
        })
    }

    /// Fail fast on settings that cannot produce a valid run.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.input_path.is_file(),
            "input file {:?} does not exist",
            self.input_path
        );
        anyhow::ensure!(
            self.input_path != self.output_path,
            "output path must differ from the input path"
        );
        if let Some(report) = &self.report_path {
            anyhow::ensure!(
                report != &self.output_path,
                "report path must differ from the output path"
            );
        }
        Ok(())
    }
}
