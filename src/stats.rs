//! Per-column statistical summaries
//!
//! Aggregates each table independently, enabling distributional comparison
//! when row alignment is unavailable or as supplementary context. A column
//! counts as numeric when every non-null cell is numeric; otherwise it is
//! summarized by its distinct normalized values.

use crate::config::CompareConfig;
use crate::table::{Cell, Table};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ColumnStats {
    pub count: u64,
    pub null_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distinct_count: Option<u64>,
}

/// Summarize every non-ignored column of a table, in column order.
pub fn summarize(table: &Table, config: &CompareConfig) -> IndexMap<String, ColumnStats> {
    let mut stats = IndexMap::new();
    for (col_idx, column) in table.columns().iter().enumerate() {
        if config.is_ignored(&column.name) {
            continue;
        }
        stats.insert(column.name.clone(), summarize_column(table, col_idx, config));
    }
    stats
}

fn summarize_column(table: &Table, col_idx: usize, config: &CompareConfig) -> ColumnStats {
    let mut null_count = 0u64;
    let mut numeric: Vec<f64> = Vec::new();
    let mut all_numeric = true;

    for row in table.rows() {
        match &row[col_idx] {
            Cell::Null => null_count += 1,
            cell => match cell.as_f64() {
                Some(v) => numeric.push(v),
                None => all_numeric = false,
            },
        }
    }

    let count = table.row_count();
    if all_numeric && !numeric.is_empty() {
        let sum: f64 = numeric.iter().sum();
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in &numeric {
            min = min.min(*v);
            max = max.max(*v);
        }
        ColumnStats {
            count,
            null_count,
            mean: Some(sum / numeric.len() as f64),
            min: Some(min),
            max: Some(max),
            distinct_count: None,
        }
    } else {
        let mut distinct: HashSet<String> = HashSet::new();
        for row in table.rows() {
            let cell = &row[col_idx];
            if !cell.is_null() {
                distinct.insert(config.normalize(&cell.render()));
            }
        }
        ColumnStats {
            count,
            null_count,
            mean: None,
            min: None,
            max: None,
            distinct_count: Some(distinct.len() as u64),
        }
    }
}
