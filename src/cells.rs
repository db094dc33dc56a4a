//! Cell-level difference classification
//!
//! Decides equal/different for one pair of cells and classifies the
//! difference into the reporting taxonomy. Coercion is deliberately narrow:
//! integers and floats compare numerically against the tolerance, strings
//! compare after the configured normalization, and any other runtime type
//! combination is a type difference regardless of tolerance.

use crate::config::CompareConfig;
use crate::table::Cell;
use crate::SIGNIFICANT_TOLERANCE_FACTOR;
use serde::Serialize;

/// Classification of one differing cell pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "classification", rename_all = "snake_case")]
pub enum DiffKind {
    /// Left cell is null, right is not.
    MissingInLeft,
    /// Right cell is null, left is not.
    MissingInRight,
    /// Runtime types disagree and no coercion rule applies.
    TypeDifference,
    /// Both numeric, |delta| beyond tolerance. Delta is left minus right.
    NumericDifference { delta: f64, significant: bool },
    /// Both strings (or both booleans), unequal after normalization.
    TextDifference,
}

impl DiffKind {
    /// Short label for flat tabular export.
    pub fn label(&self) -> &'static str {
        match self {
            DiffKind::MissingInLeft => "missing_in_left",
            DiffKind::MissingInRight => "missing_in_right",
            DiffKind::TypeDifference => "type_difference",
            DiffKind::NumericDifference { .. } => "numeric_difference",
            DiffKind::TextDifference => "text_difference",
        }
    }
}

/// One differing cell with both values and the classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellDiff {
    pub left: Cell,
    pub right: Cell,
    #[serde(flatten)]
    pub kind: DiffKind,
}

/// Outcome of comparing one cell pair.
#[derive(Debug, Clone, PartialEq)]
pub enum CellOutcome {
    Equal,
    /// Both sides null: equal, but counted separately and never reported.
    BothNull,
    Different(CellDiff),
}

/// Classify one cell pair under the given policy.
pub fn classify_pair(left: &Cell, right: &Cell, config: &CompareConfig) -> CellOutcome {
    let kind = match (left, right) {
        (Cell::Null, Cell::Null) => return CellOutcome::BothNull,
        (Cell::Null, _) => DiffKind::MissingInLeft,
        (_, Cell::Null) => DiffKind::MissingInRight,
        (a, b) if a.is_numeric() && b.is_numeric() => {
            // as_f64 cannot fail for numeric cells
            let delta = a.as_f64().unwrap_or(0.0) - b.as_f64().unwrap_or(0.0);
            if delta.abs() <= config.float_tolerance {
                return CellOutcome::Equal;
            }
            DiffKind::NumericDifference {
                delta,
                significant: delta.abs() > config.float_tolerance * SIGNIFICANT_TOLERANCE_FACTOR,
            }
        }
        (Cell::Text(a), Cell::Text(b)) => {
            if config.normalize(a) == config.normalize(b) {
                return CellOutcome::Equal;
            }
            DiffKind::TextDifference
        }
        (Cell::Boolean(a), Cell::Boolean(b)) => {
            if a == b {
                return CellOutcome::Equal;
            }
            DiffKind::TextDifference
        }
        _ => DiffKind::TypeDifference,
    };

    CellOutcome::Different(CellDiff {
        left: left.clone(),
        right: right.clone(),
        kind,
    })
}
