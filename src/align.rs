//! Key-based row alignment
//!
//! Builds the row correspondence between two tables from the configured key
//! columns. Keys seen more than once within one table keep their first
//! occurrence; the occurrence count is carried through so duplicates are
//! never silently dropped.

use crate::error::{FundrecError, Result};
use crate::table::Table;
use crate::KEY_SEPARATOR;
use indexmap::{IndexMap, IndexSet};

/// Row correspondence between two tables.
#[derive(Debug, Clone)]
pub struct KeyAlignment {
    /// Keys present only in the left table, in left row order.
    pub rows_only_in_left: IndexSet<String>,
    /// Keys present only in the right table, in right row order.
    pub rows_only_in_right: IndexSet<String>,
    /// (key, left row index, right row index), in left row order.
    pub common: Vec<(String, usize, usize)>,
    /// Extra occurrences of already-seen keys, per side.
    pub duplicate_keys_left: u64,
    pub duplicate_keys_right: u64,
}

/// Align two tables on the configured key columns.
///
/// Missing key columns are a precondition violation, not a data anomaly:
/// the whole comparison fails before any row is touched.
pub fn align_keys(left: &Table, right: &Table, key_columns: &[String]) -> Result<KeyAlignment> {
    if key_columns.is_empty() {
        return Err(FundrecError::config(
            "key_columns must be configured for row-level comparison",
        ));
    }
    let left_indices = key_indices(left, key_columns, "left")?;
    let right_indices = key_indices(right, key_columns, "right")?;

    let (left_map, duplicate_keys_left) = build_key_map(left, &left_indices);
    let (right_map, duplicate_keys_right) = build_key_map(right, &right_indices);

    let mut rows_only_in_left = IndexSet::new();
    let mut common = Vec::new();
    for (key, &left_row) in &left_map {
        match right_map.get(key) {
            Some(&right_row) => common.push((key.clone(), left_row, right_row)),
            None => {
                rows_only_in_left.insert(key.clone());
            }
        }
    }

    let mut rows_only_in_right = IndexSet::new();
    for key in right_map.keys() {
        if !left_map.contains_key(key) {
            rows_only_in_right.insert(key.clone());
        }
    }

    Ok(KeyAlignment {
        rows_only_in_left,
        rows_only_in_right,
        common,
        duplicate_keys_left,
        duplicate_keys_right,
    })
}

/// Render the key of one row: key-column values joined in configured order.
pub fn render_key(table: &Table, row: usize, key_indices: &[usize]) -> String {
    let mut parts = Vec::with_capacity(key_indices.len());
    for &col in key_indices {
        let value = table
            .cell(row, col)
            .map(|c| c.render())
            .unwrap_or_default();
        parts.push(value);
    }
    parts.join(KEY_SEPARATOR)
}

fn key_indices(table: &Table, key_columns: &[String], side: &str) -> Result<Vec<usize>> {
    key_columns
        .iter()
        .map(|name| {
            table.column_index(name).ok_or_else(|| {
                FundrecError::config(format!(
                    "Key column '{}' not found in {} table ({})",
                    name, side, table.source
                ))
            })
        })
        .collect()
}

/// First occurrence wins; later occurrences of the same key only bump the
/// duplicate counter.
fn build_key_map(table: &Table, key_indices: &[usize]) -> (IndexMap<String, usize>, u64) {
    let mut map = IndexMap::with_capacity(table.rows().len());
    let mut duplicates = 0u64;
    for row in 0..table.rows().len() {
        let key = render_key(table, row, key_indices);
        if map.contains_key(&key) {
            duplicates += 1;
        } else {
            map.insert(key, row);
        }
    }
    (map, duplicates)
}
