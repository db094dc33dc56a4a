//! Command-line interface for fundrec

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fundrec")]
#[command(about = "Key-based reconciliation of fund reports against warehouse extracts")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare two datasets and report discrepancies
    Compare {
        /// Left dataset: the internal extract (file path, or SQL file with --query)
        left: String,

        /// Right dataset: the fund report file
        right: String,

        /// Comparison mode: "full", "schema", "statistical", or "subset"
        #[arg(long, default_value = "full")]
        mode: String,

        /// Configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Comma-separated key columns (overrides config)
        #[arg(long)]
        key_columns: Option<String>,

        /// Comma-separated columns to exclude from comparison (overrides config)
        #[arg(long)]
        ignore_columns: Option<String>,

        /// Tolerance for floating point comparisons (overrides config)
        #[arg(long, value_parser = validate_tolerance)]
        tolerance: Option<f64>,

        /// Case-insensitive text comparison
        #[arg(long)]
        ignore_case: bool,

        /// Compare text exactly, without whitespace normalization
        #[arg(long)]
        keep_whitespace: bool,

        /// Treat the left argument as a SQL file to execute instead of a data file
        #[arg(long)]
        query: bool,

        /// Rename a left-side column before comparing, as FROM=TO
        #[arg(long, value_parser = parse_rename)]
        rename: Vec<(String, String)>,

        /// Write a JSON report file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write the flattened per-cell differences as CSV
        #[arg(long)]
        export: Option<PathBuf>,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,

        /// Print only the reduced key-differences summary
        #[arg(long)]
        summary_only: bool,
    },

    /// Show structure and row count of a dataset
    Info {
        /// Input file path
        file: PathBuf,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },

    /// Write a sample configuration file
    InitConfig {
        /// Destination path
        #[arg(default_value = "fundrec.json")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Parse output format string
#[derive(Debug, Clone)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'pretty' or 'json'", s)),
        }
    }
}

/// Split a comma-separated column list, dropping empty entries.
pub fn parse_column_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Validate that a tolerance is a finite, non-negative number
fn validate_tolerance(s: &str) -> Result<f64, String> {
    let tolerance: f64 = s
        .parse()
        .map_err(|_| format!("Invalid tolerance: '{}'. Must be a number.", s))?;
    if !tolerance.is_finite() || tolerance < 0.0 {
        return Err(format!(
            "Invalid tolerance: '{}'. Must be finite and >= 0.",
            s
        ));
    }
    Ok(tolerance)
}

/// Parse a FROM=TO rename mapping
fn parse_rename(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((from, to)) if !from.is_empty() && !to.is_empty() => {
            Ok((from.trim().to_string(), to.trim().to_string()))
        }
        _ => Err(format!("Invalid rename: '{}'. Use FROM=TO.", s)),
    }
}
