//! Reconciliation engine
//!
//! Orchestrates one comparison invocation as a linear pipeline: schema
//! comparison, key alignment, cell-level classification, statistics,
//! summary. Each stage feeds the next; a configuration failure at any stage
//! aborts the whole invocation, so a partial result is unrepresentable.
//! The engine is synchronous, single-threaded, and never mutates its inputs.

use crate::align::{align_keys, KeyAlignment};
use crate::cells::{classify_pair, CellDiff, CellOutcome};
use crate::config::CompareConfig;
use crate::error::Result;
use crate::result::{
    CompareKind, CompareResult, Differences, Statistics, SubsetSummary, Summary,
};
use crate::schema::compare_schemas;
use crate::stats::summarize;
use crate::table::Table;
use indexmap::IndexMap;
use std::collections::HashSet;

pub struct Reconciler<'a> {
    config: &'a CompareConfig,
}

impl<'a> Reconciler<'a> {
    pub fn new(config: &'a CompareConfig) -> Self {
        Self { config }
    }

    /// Run one comparison. Configuration is validated before any row
    /// processing; configuration errors are never demoted to data.
    pub fn compare(&self, left: &Table, right: &Table, kind: CompareKind) -> Result<CompareResult> {
        self.config.validate()?;
        match kind {
            CompareKind::Full => self.compare_full(left, right),
            CompareKind::Schema => self.compare_schema(left, right),
            CompareKind::Statistical => self.compare_statistical(left, right),
            CompareKind::Subset => self.compare_subset(left, right),
        }
    }

    fn compare_full(&self, left: &Table, right: &Table) -> Result<CompareResult> {
        let schema = compare_schemas(left, right, self.config);
        let alignment = align_keys(left, right, &self.config.key_columns)?;
        let cell_diffs = self.compare_cells(left, right, &alignment);

        let common_rows = alignment.common.len() as u64;
        let different_rows = cell_diffs.len() as u64;
        let identical_rows = common_rows - different_rows;

        let summary = Summary {
            rows_left: left.row_count(),
            rows_right: right.row_count(),
            common_rows,
            rows_only_in_left: alignment.rows_only_in_left.len() as u64,
            rows_only_in_right: alignment.rows_only_in_right.len() as u64,
            identical_rows,
            different_rows,
            duplicate_keys_left: alignment.duplicate_keys_left,
            duplicate_keys_right: alignment.duplicate_keys_right,
            match_percentage: percentage(identical_rows, common_rows),
            coverage_percentage: percentage(common_rows, right.row_count()),
            subset: None,
        };

        Ok(CompareResult {
            kind: CompareKind::Full,
            left_source: left.source.clone(),
            right_source: right.source.clone(),
            summary,
            differences: Differences {
                columns_only_in_left: schema.columns_only_in_left,
                columns_only_in_right: schema.columns_only_in_right,
                type_mismatches: schema.type_mismatches,
                rows_only_in_left: alignment.rows_only_in_left,
                rows_only_in_right: alignment.rows_only_in_right,
                cell_diffs,
            },
            statistics: Statistics {
                left: summarize(left, self.config),
                right: summarize(right, self.config),
            },
        })
    }

    fn compare_schema(&self, left: &Table, right: &Table) -> Result<CompareResult> {
        let schema = compare_schemas(left, right, self.config);
        Ok(CompareResult {
            kind: CompareKind::Schema,
            left_source: left.source.clone(),
            right_source: right.source.clone(),
            summary: Summary {
                rows_left: left.row_count(),
                rows_right: right.row_count(),
                match_percentage: 100.0,
                coverage_percentage: 100.0,
                ..Summary::default()
            },
            differences: Differences {
                columns_only_in_left: schema.columns_only_in_left,
                columns_only_in_right: schema.columns_only_in_right,
                type_mismatches: schema.type_mismatches,
                ..Differences::default()
            },
            statistics: Statistics::default(),
        })
    }

    fn compare_statistical(&self, left: &Table, right: &Table) -> Result<CompareResult> {
        Ok(CompareResult {
            kind: CompareKind::Statistical,
            left_source: left.source.clone(),
            right_source: right.source.clone(),
            summary: Summary {
                rows_left: left.row_count(),
                rows_right: right.row_count(),
                match_percentage: 100.0,
                coverage_percentage: 100.0,
                ..Summary::default()
            },
            differences: Differences::default(),
            statistics: Statistics {
                left: summarize(left, self.config),
                right: summarize(right, self.config),
            },
        })
    }

    /// Does every distinct left row (projected onto shared columns,
    /// normalized) occur in the right table? Used when key-level alignment
    /// is impractical.
    fn compare_subset(&self, left: &Table, right: &Table) -> Result<CompareResult> {
        let shared: Vec<(usize, usize)> = left
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| !self.config.is_ignored(&c.name))
            .filter_map(|(li, c)| right.column_index(&c.name).map(|ri| (li, ri)))
            .collect();

        let subset = if shared.is_empty() {
            SubsetSummary::default()
        } else {
            let left_rows = self.distinct_projected_rows(left, shared.iter().map(|(li, _)| *li));
            let right_rows = self.distinct_projected_rows(right, shared.iter().map(|(_, ri)| *ri));
            let matching_rows = left_rows.intersection(&right_rows).count() as u64;
            SubsetSummary {
                is_subset: matching_rows == left_rows.len() as u64,
                distinct_rows_left: left_rows.len() as u64,
                distinct_rows_right: right_rows.len() as u64,
                matching_rows,
            }
        };

        Ok(CompareResult {
            kind: CompareKind::Subset,
            left_source: left.source.clone(),
            right_source: right.source.clone(),
            summary: Summary {
                rows_left: left.row_count(),
                rows_right: right.row_count(),
                match_percentage: 100.0,
                coverage_percentage: 100.0,
                subset: Some(subset),
                ..Summary::default()
            },
            differences: Differences::default(),
            statistics: Statistics::default(),
        })
    }

    /// Cell-level comparison over the common set. Output is keyed by row
    /// identity in left row order; rows with no differing cells are counted
    /// but not materialized.
    fn compare_cells(
        &self,
        left: &Table,
        right: &Table,
        alignment: &KeyAlignment,
    ) -> IndexMap<String, IndexMap<String, CellDiff>> {
        let value_columns: Vec<(String, usize, usize)> = left
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, c)| !self.config.is_ignored(&c.name) && !self.config.is_key(&c.name))
            .filter_map(|(li, c)| right.column_index(&c.name).map(|ri| (c.name.clone(), li, ri)))
            .collect();

        let mut cell_diffs = IndexMap::new();
        for (key, left_row, right_row) in &alignment.common {
            let mut row_diffs: IndexMap<String, CellDiff> = IndexMap::new();
            for (name, li, ri) in &value_columns {
                let left_cell = &left.rows()[*left_row][*li];
                let right_cell = &right.rows()[*right_row][*ri];
                if let CellOutcome::Different(diff) =
                    classify_pair(left_cell, right_cell, self.config)
                {
                    row_diffs.insert(name.clone(), diff);
                }
            }
            if !row_diffs.is_empty() {
                cell_diffs.insert(key.clone(), row_diffs);
            }
        }
        cell_diffs
    }

    fn distinct_projected_rows(
        &self,
        table: &Table,
        indices: impl Iterator<Item = usize>,
    ) -> HashSet<Vec<String>> {
        let indices: Vec<usize> = indices.collect();
        let mut rows = HashSet::new();
        for row in table.rows() {
            let projected: Vec<String> = indices
                .iter()
                .map(|&i| self.config.normalize(&row[i].render()))
                .collect();
            rows.insert(projected);
        }
        rows
    }
}

/// part / whole as a percentage; 100 when there is nothing to measure.
fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        100.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
