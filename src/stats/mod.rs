//! Stats module - grouping and descriptive statistics

mod aggregator;
mod calculator;

pub use aggregator::{
    AggregateError, EmptyGroupWarning, GroupAggregator, GroupOrder, Summary, SummaryRow,
};
pub use calculator::{GroupStats, Measurement, StatsCalculator};
