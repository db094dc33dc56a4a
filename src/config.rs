//! Comparison policy configuration
//!
//! A `CompareConfig` is a plain immutable value passed explicitly into every
//! engine call. It can be loaded from a JSON file; the five fields below are
//! the recognized set and anything else in the file is ignored, so old
//! binaries keep accepting newer config files.

use crate::error::{FundrecError, Result};
use crate::DEFAULT_FLOAT_TOLERANCE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Maximum absolute difference treated as equal for numeric cells.
    #[serde(default = "default_tolerance")]
    pub float_tolerance: f64,

    /// Case-insensitive string comparison.
    #[serde(default)]
    pub ignore_case: bool,

    /// Trim and collapse whitespace before string comparison.
    #[serde(default = "default_true")]
    pub ignore_whitespace: bool,

    /// Columns excluded entirely from comparison.
    #[serde(default)]
    pub ignore_columns: BTreeSet<String>,

    /// Columns whose concatenated values identify a row across tables.
    #[serde(default)]
    pub key_columns: Vec<String>,
}

fn default_tolerance() -> f64 {
    DEFAULT_FLOAT_TOLERANCE
}

fn default_true() -> bool {
    true
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            float_tolerance: DEFAULT_FLOAT_TOLERANCE,
            ignore_case: false,
            ignore_whitespace: true,
            ignore_columns: BTreeSet::new(),
            key_columns: Vec::new(),
        }
    }
}

impl CompareConfig {
    /// Load configuration from a JSON file and validate it.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FundrecError::config(format!(
                "Cannot read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            FundrecError::config(format!(
                "Cannot parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants that must hold before any comparison runs.
    pub fn validate(&self) -> Result<()> {
        if !self.float_tolerance.is_finite() {
            return Err(FundrecError::config(format!(
                "float_tolerance must be finite, got {}",
                self.float_tolerance
            )));
        }
        if self.float_tolerance < 0.0 {
            return Err(FundrecError::config(format!(
                "float_tolerance must be >= 0, got {}",
                self.float_tolerance
            )));
        }
        Ok(())
    }

    /// Normalize a string per the configured comparison policy.
    pub fn normalize(&self, raw: &str) -> String {
        let mut text = if self.ignore_whitespace {
            raw.split_whitespace().collect::<Vec<_>>().join(" ")
        } else {
            raw.to_string()
        };
        if self.ignore_case {
            text = text.to_lowercase();
        }
        text
    }

    pub fn is_ignored(&self, column: &str) -> bool {
        self.ignore_columns.contains(column)
    }

    pub fn is_key(&self, column: &str) -> bool {
        self.key_columns.iter().any(|k| k == column)
    }

    /// Sample configuration written by `fundrec init-config`.
    pub fn template() -> Self {
        Self {
            float_tolerance: 1e-6,
            ignore_columns: ["DataProcessamento".to_string()].into_iter().collect(),
            key_columns: vec!["NumeroContrato".to_string()],
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CompareConfig::default();
        assert_eq!(config.float_tolerance, DEFAULT_FLOAT_TOLERANCE);
        assert!(!config.ignore_case);
        assert!(config.ignore_whitespace);
        assert!(config.key_columns.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unrecognized_fields_are_ignored() {
        let json = r#"{
            "float_tolerance": 0.001,
            "key_columns": ["NumeroContrato"],
            "some_future_option": true
        }"#;
        let config: CompareConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.float_tolerance, 0.001);
        assert_eq!(config.key_columns, vec!["NumeroContrato"]);
        // Unspecified fields keep their defaults
        assert!(config.ignore_whitespace);
    }

    #[test]
    fn test_invalid_tolerance_rejected() {
        let negative = CompareConfig {
            float_tolerance: -1.0,
            ..CompareConfig::default()
        };
        assert!(negative.validate().is_err());

        let nan = CompareConfig {
            float_tolerance: f64::NAN,
            ..CompareConfig::default()
        };
        assert!(nan.validate().is_err());

        let zero = CompareConfig {
            float_tolerance: 0.0,
            ..CompareConfig::default()
        };
        assert!(zero.validate().is_ok());
    }

    #[test]
    fn test_normalize() {
        let config = CompareConfig {
            ignore_case: true,
            ignore_whitespace: true,
            ..CompareConfig::default()
        };
        assert_eq!(config.normalize("  Fundo   ABC  "), "fundo abc");

        let strict = CompareConfig {
            ignore_case: false,
            ignore_whitespace: false,
            ..CompareConfig::default()
        };
        assert_eq!(strict.normalize("  Fundo ABC "), "  Fundo ABC ");
    }
}
