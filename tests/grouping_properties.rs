//! Property-based checks of the grouping invariants.

use cellcount_summary::data::{Cell, KeyTuple, Row, Table};
use cellcount_summary::GroupAggregator;
use proptest::prelude::*;
use std::collections::HashSet;

/// (condition, value) pairs; `None` values are written as non-numeric text.
fn rows_strategy() -> impl Strategy<Value = Vec<(u8, Option<i32>)>> {
    prop::collection::vec((0u8..5, prop::option::of(-1000i32..1000)), 0..60)
}

fn build_table(rows: &[(u8, Option<i32>)]) -> Table {
    let rows = rows
        .iter()
        .map(|(cond, value)| {
            let cond = if *cond == 0 {
                Cell::Missing
            } else {
                Cell::Text(format!("c{cond}"))
            };
            let value = match value {
                Some(v) => Cell::Text(v.to_string()),
                None => Cell::Text("not-a-number".to_string()),
            };
            Row::new(vec![cond, value])
        })
        .collect();
    Table::from_records(["cond", "cnt"], rows).unwrap()
}

fn keys() -> Vec<String> {
    vec!["cond".to_string()]
}

proptest! {
    #[test]
    fn one_summary_row_per_distinct_key(rows in rows_strategy()) {
        let table = build_table(&rows);
        let summary = GroupAggregator::new().aggregate(&table, &keys(), "cnt").unwrap();

        let distinct: HashSet<u8> = rows.iter().map(|(c, _)| *c).collect();
        prop_assert_eq!(summary.group_count(), distinct.len());
    }

    #[test]
    fn counts_only_numeric_cells(rows in rows_strategy()) {
        let table = build_table(&rows);
        let summary = GroupAggregator::new().aggregate(&table, &keys(), "cnt").unwrap();

        for row in &summary.rows {
            let member = |c: &u8| {
                let name = if *c == 0 { String::new() } else { format!("c{c}") };
                KeyTuple::new(vec![name]) == row.key
            };
            let numeric = rows.iter().filter(|(c, v)| member(c) && v.is_some()).count();
            let skipped = rows.iter().filter(|(c, v)| member(c) && v.is_none()).count();
            prop_assert_eq!(row.stats.count, numeric);
            prop_assert_eq!(row.stats.skipped, skipped);
            prop_assert_eq!(row.stats.mean.is_none(), numeric == 0);
        }
        let empty = summary.rows.iter().filter(|r| r.stats.count == 0).count();
        prop_assert_eq!(summary.warnings.len(), empty);
    }

    #[test]
    fn order_follows_first_appearance(rows in rows_strategy()) {
        let table = build_table(&rows);
        let summary = GroupAggregator::new().aggregate(&table, &keys(), "cnt").unwrap();

        let mut seen: Vec<u8> = Vec::new();
        for (c, _) in &rows {
            if !seen.contains(c) {
                seen.push(*c);
            }
        }
        let expected: Vec<String> = seen
            .iter()
            .map(|c| if *c == 0 { String::new() } else { format!("c{c}") })
            .collect();
        let actual: Vec<String> = summary.rows.iter().map(|r| r.key.values()[0].clone()).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn means_do_not_depend_on_row_order(rows in rows_strategy()) {
        let forward = GroupAggregator::new()
            .aggregate(&build_table(&rows), &keys(), "cnt")
            .unwrap();
        let reversed_rows: Vec<_> = rows.iter().rev().cloned().collect();
        let reversed = GroupAggregator::new()
            .aggregate(&build_table(&reversed_rows), &keys(), "cnt")
            .unwrap();

        for row in &forward.rows {
            let values: Vec<&str> = row.key.values().iter().map(String::as_str).collect();
            let other = reversed.get(&values).unwrap();
            prop_assert_eq!(row.stats.count, other.count);
            match (row.stats.mean, other.mean) {
                (Some(a), Some(b)) => prop_assert!((a - b).abs() < 1e-9),
                (a, b) => prop_assert_eq!(a, b),
            }
        }
    }
}
