//! Canonical in-memory table model
//!
//! A `Table` is what the dataset loader hands to the reconciliation engine:
//! an ordered list of named, typed columns and an ordered list of rows whose
//! cells are a closed tagged variant. Tables are never mutated once built.

use crate::error::{FundrecError, Result};
use serde::ser::Serializer;
use serde::Serialize;

/// A single cell value. The variant set is closed so the cell-level
/// classifier can match exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Integer(_) | Cell::Float(_))
    }

    /// Numeric view of the cell, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Canonical string rendering, used for key construction, distinct
    /// counting, and display. Null renders empty.
    pub fn render(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Boolean(b) => b.to_string(),
            Cell::Integer(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }

    /// Runtime type name, used in type-difference reporting.
    pub fn type_name(&self) -> &'static str {
        match self {
            Cell::Null => "null",
            Cell::Boolean(_) => "boolean",
            Cell::Integer(_) => "integer",
            Cell::Float(_) => "float",
            Cell::Text(_) => "string",
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Cell::Null => serializer.serialize_none(),
            Cell::Boolean(b) => serializer.serialize_bool(*b),
            Cell::Integer(i) => serializer.serialize_i64(*i),
            // Non-finite floats are not representable in JSON
            Cell::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Cell::Float(f) => serializer.serialize_str(&f.to_string()),
            Cell::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// A named column with its declared (loader-inferred) type.
#[derive(Debug, Clone, Serialize)]
pub struct Column {
    pub name: String,
    pub data_type: String,
}

/// An immutable table: ordered columns, ordered rows of cells.
#[derive(Debug, Clone)]
pub struct Table {
    /// Where this table came from (file path or query label), for reporting.
    pub source: String,
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table, checking that every row is as wide as the header.
    pub fn new(source: impl Into<String>, columns: Vec<Column>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let width = columns.len();
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(FundrecError::data_processing(format!(
                    "Row {} has {} cells, expected {}",
                    idx,
                    row.len(),
                    width
                )));
            }
        }
        Ok(Self {
            source: source.into(),
            columns,
            rows,
        })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> u64 {
        self.rows.len() as u64
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Rename a column in place. Applied by the loader before the table is
    /// handed to the engine, so the warehouse-side identifier can land under
    /// the report-side key-column name.
    pub fn rename_column(&mut self, from: &str, to: &str) -> Result<()> {
        if self.has_column(to) {
            return Err(FundrecError::invalid_input(format!(
                "Cannot rename '{}' to '{}': target column already exists",
                from, to
            )));
        }
        match self.columns.iter_mut().find(|c| c.name == from) {
            Some(col) => {
                col.name = to.to_string();
                Ok(())
            }
            None => Err(FundrecError::invalid_input(format!(
                "Cannot rename '{}': no such column",
                from
            ))),
        }
    }
}
