//! Schema comparison between two tables
//!
//! Compares column sets and loader-inferred types independent of row
//! content. Schema mismatches are data, not errors: a column present on one
//! side only, or typed differently on the two sides, is recorded and the
//! comparison carries on.

use crate::config::CompareConfig;
use crate::table::Table;
use indexmap::IndexMap;
use serde::Serialize;

/// Inferred types of a column that exists on both sides with different types.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TypePair {
    pub left: String,
    pub right: String,
}

/// Column-level differences between two tables.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemaDiff {
    pub columns_only_in_left: Vec<String>,
    pub columns_only_in_right: Vec<String>,
    pub type_mismatches: IndexMap<String, TypePair>,
}

impl SchemaDiff {
    pub fn has_differences(&self) -> bool {
        !self.columns_only_in_left.is_empty()
            || !self.columns_only_in_right.is_empty()
            || !self.type_mismatches.is_empty()
    }
}

/// Compare the column sets of two tables. Ignored columns are excluded
/// before comparison; output ordering follows each table's column order.
pub fn compare_schemas(left: &Table, right: &Table, config: &CompareConfig) -> SchemaDiff {
    let mut diff = SchemaDiff::default();

    for column in left.columns() {
        if config.is_ignored(&column.name) {
            continue;
        }
        match right.column_index(&column.name) {
            None => diff.columns_only_in_left.push(column.name.clone()),
            Some(idx) => {
                let right_type = &right.columns()[idx].data_type;
                if &column.data_type != right_type {
                    diff.type_mismatches.insert(
                        column.name.clone(),
                        TypePair {
                            left: column.data_type.clone(),
                            right: right_type.clone(),
                        },
                    );
                }
            }
        }
    }

    for column in right.columns() {
        if config.is_ignored(&column.name) {
            continue;
        }
        if !left.has_column(&column.name) {
            diff.columns_only_in_right.push(column.name.clone());
        }
    }

    diff
}
