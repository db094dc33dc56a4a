//! Comparison result types and projections
//!
//! `CompareResult` is the engine's sole output: constructed once per
//! invocation, read-only afterward, handed to one or more reporters. The
//! two projection operations (`key_differences`, `flatten`) are pure views
//! over the already-computed result.

use crate::cells::{CellDiff, DiffKind};
use crate::schema::TypePair;
use crate::stats::ColumnStats;
use crate::table::Cell;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

/// What the comparison looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareKind {
    Full,
    Schema,
    Statistical,
    Subset,
}

impl CompareKind {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "schema" => Ok(Self::Schema),
            "statistical" => Ok(Self::Statistical),
            "subset" => Ok(Self::Subset),
            _ => Err(format!(
                "Invalid comparison mode: {}. Use 'full', 'schema', 'statistical', or 'subset'",
                s
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Schema => "schema",
            Self::Statistical => "statistical",
            Self::Subset => "subset",
        }
    }
}

/// Subset-mode verdict: is every distinct left row present on the right?
#[derive(Debug, Clone, Default, Serialize)]
pub struct SubsetSummary {
    pub is_subset: bool,
    pub distinct_rows_left: u64,
    pub distinct_rows_right: u64,
    pub matching_rows: u64,
}

/// Headline counts of one comparison.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub rows_left: u64,
    pub rows_right: u64,
    pub common_rows: u64,
    pub rows_only_in_left: u64,
    pub rows_only_in_right: u64,
    pub identical_rows: u64,
    pub different_rows: u64,
    pub duplicate_keys_left: u64,
    pub duplicate_keys_right: u64,
    /// identical / common, as a percentage. 100 when there is nothing to
    /// mismatch.
    pub match_percentage: f64,
    /// common / rows_right, as a percentage: how much of the fund report the
    /// internal extract covers. Both percentages are vacuously 100 for
    /// comparison kinds that skip row alignment.
    pub coverage_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subset: Option<SubsetSummary>,
}

/// Structured detail of everything that differs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Differences {
    pub columns_only_in_left: Vec<String>,
    pub columns_only_in_right: Vec<String>,
    pub type_mismatches: IndexMap<String, TypePair>,
    pub rows_only_in_left: IndexSet<String>,
    pub rows_only_in_right: IndexSet<String>,
    /// row key -> column name -> differing cell pair, in left row order.
    pub cell_diffs: IndexMap<String, IndexMap<String, CellDiff>>,
}

/// Per-column aggregates for each side.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Statistics {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub left: IndexMap<String, ColumnStats>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub right: IndexMap<String, ColumnStats>,
}

/// The engine's output for one comparison invocation.
#[derive(Debug, Clone, Serialize)]
pub struct CompareResult {
    pub kind: CompareKind,
    pub left_source: String,
    pub right_source: String,
    pub summary: Summary,
    pub differences: Differences,
    pub statistics: Statistics,
}

/// Reduced counts-by-category view for a short status summary.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KeyDifferences {
    pub rows_only_in_left: u64,
    pub rows_only_in_right: u64,
    pub columns_only_in_left: u64,
    pub columns_only_in_right: u64,
    pub type_mismatches: u64,
    pub rows_with_cell_diffs: u64,
    pub duplicate_keys: u64,
    pub missing_values: u64,
    pub numeric_differences: u64,
    pub significant_numeric_differences: u64,
    pub text_differences: u64,
    pub type_differences: u64,
}

/// One differing cell, flattened for tabular export.
#[derive(Debug, Clone, Serialize)]
pub struct FlatDiff {
    pub key: String,
    pub column: String,
    pub left: Cell,
    pub right: Cell,
    pub classification: &'static str,
}

impl CompareResult {
    /// True when nothing differed at any level the comparison looked at.
    pub fn is_clean(&self) -> bool {
        let d = &self.differences;
        d.columns_only_in_left.is_empty()
            && d.columns_only_in_right.is_empty()
            && d.type_mismatches.is_empty()
            && d.rows_only_in_left.is_empty()
            && d.rows_only_in_right.is_empty()
            && d.cell_diffs.is_empty()
            && self.summary.subset.as_ref().map_or(true, |s| s.is_subset)
    }

    /// Counts-by-category projection. Pure: no recomputation beyond tallying
    /// what the result already holds.
    pub fn key_differences(&self) -> KeyDifferences {
        let d = &self.differences;
        let mut view = KeyDifferences {
            rows_only_in_left: d.rows_only_in_left.len() as u64,
            rows_only_in_right: d.rows_only_in_right.len() as u64,
            columns_only_in_left: d.columns_only_in_left.len() as u64,
            columns_only_in_right: d.columns_only_in_right.len() as u64,
            type_mismatches: d.type_mismatches.len() as u64,
            rows_with_cell_diffs: d.cell_diffs.len() as u64,
            duplicate_keys: self.summary.duplicate_keys_left + self.summary.duplicate_keys_right,
            ..KeyDifferences::default()
        };

        for row in d.cell_diffs.values() {
            for diff in row.values() {
                match &diff.kind {
                    DiffKind::MissingInLeft | DiffKind::MissingInRight => {
                        view.missing_values += 1;
                    }
                    DiffKind::NumericDifference { significant, .. } => {
                        view.numeric_differences += 1;
                        if *significant {
                            view.significant_numeric_differences += 1;
                        }
                    }
                    DiffKind::TextDifference => view.text_differences += 1,
                    DiffKind::TypeDifference => view.type_differences += 1,
                }
            }
        }
        view
    }

    /// Flattened per-cell projection, suitable for CSV export. Ordering
    /// follows the result's own ordering (left row order, column order).
    pub fn flatten(&self) -> Vec<FlatDiff> {
        let mut flat = Vec::new();
        for (key, row) in &self.differences.cell_diffs {
            for (column, diff) in row {
                flat.push(FlatDiff {
                    key: key.clone(),
                    column: column.clone(),
                    left: diff.left.clone(),
                    right: diff.right.clone(),
                    classification: diff.kind.label(),
                });
            }
        }
        flat
    }
}
