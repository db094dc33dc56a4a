//! Common test utilities and helpers

use fundrec::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture manager for creating temporary datasets
pub struct TestFixture {
    pub temp_dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
        })
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a test CSV file from rows of string cells
    pub fn create_csv(&self, name: &str, data: &[Vec<&str>]) -> Result<PathBuf> {
        let path = self.root().join(name);
        let mut content = String::new();
        for row in data {
            content.push_str(&row.join(","));
            content.push('\n');
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Create a test CSV file with raw string content
    pub fn create_csv_raw(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.root().join(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    /// Create a JSON file (config files, mostly)
    pub fn create_json(&self, name: &str, data: &serde_json::Value) -> Result<PathBuf> {
        let path = self.root().join(name);
        fs::write(&path, serde_json::to_string_pretty(data)?)?;
        Ok(path)
    }

    /// Create a small fund report in the shape real reconciliations see
    pub fn create_fund_report(&self, name: &str) -> Result<PathBuf> {
        self.create_csv(
            name,
            &[
                vec!["NumeroContrato", "ValorFace", "Cedente"],
                vec!["C-1001", "1500.00", "Alpha Ltda"],
                vec!["C-1002", "2750.50", "Beta SA"],
                vec!["C-1003", "990.25", "Gamma ME"],
            ],
        )
    }
}
