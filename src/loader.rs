//! Dataset loading via DuckDB
//!
//! The loader is the collaborator that turns a file or a SQL query into the
//! canonical `Table` the engine consumes. DuckDB supplies delimiter and
//! encoding sniffing plus column-type inference, so the engine only ever
//! sees well-formed typed cells.

use crate::error::{FundrecError, Result};
use crate::table::{Cell, Column, Table};
use duckdb::types::ValueRef;
use duckdb::Connection;
use std::path::Path;

/// Loads datasets into canonical tables.
pub struct DatasetLoader {
    connection: Connection,
}

impl DatasetLoader {
    pub fn new() -> Result<Self> {
        let connection = Connection::open_in_memory()?;
        connection.execute("SET memory_limit='4GB'", [])?;
        connection.execute("SET enable_progress_bar=false", [])?;
        Ok(Self { connection })
    }

    /// Load a CSV/Parquet/JSON file into a table.
    pub fn load_path(&self, file_path: &Path) -> Result<Table> {
        if !file_path.exists() {
            return Err(FundrecError::invalid_input(format!(
                "File not found: {}",
                file_path.display()
            )));
        }
        if !file_path.is_file() {
            return Err(FundrecError::invalid_input(format!(
                "Path is not a file: {}",
                file_path.display()
            )));
        }

        let create_view_sql = format!(
            "CREATE OR REPLACE VIEW dataset AS SELECT * FROM '{}'",
            file_path.to_string_lossy()
        );
        self.connection
            .execute(&create_view_sql, [])
            .map_err(|e| convert_duckdb_error(e, file_path))?;

        log::debug!("Loaded {} into dataset view", file_path.display());
        self.extract_table(&file_path.to_string_lossy())
    }

    /// Load the result of a SQL query into a table. The query can read
    /// files directly (DuckDB resolves paths in FROM clauses), which stands
    /// in for the warehouse extract in local runs.
    pub fn load_query(&self, sql: &str, label: &str) -> Result<Table> {
        let create_view_sql = format!("CREATE OR REPLACE VIEW dataset AS {}", sql);
        self.connection.execute(&create_view_sql, []).map_err(|e| {
            FundrecError::data_processing(format!("Failed to execute query '{}': {}", label, e))
        })?;

        log::debug!("Loaded query '{}' into dataset view", label);
        self.extract_table(label)
    }

    /// Materialize the current dataset view as a table.
    fn extract_table(&self, source: &str) -> Result<Table> {
        let columns = self.column_info()?;
        let column_count = columns.len();
        if column_count == 0 {
            return Table::new(source, columns, Vec::new());
        }

        let mut stmt = self
            .connection
            .prepare("SELECT * FROM dataset")
            .map_err(|e| {
                FundrecError::data_processing(format!("Failed to prepare extraction query: {}", e))
            })?;

        let rows = stmt
            .query_map([], |row| {
                let mut cells = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    cells.push(cell_from_value(row.get_ref(i)?));
                }
                Ok(cells)
            })
            .map_err(|e| {
                FundrecError::data_processing(format!("Failed to extract rows: {}", e))
            })?;

        let mut data = Vec::new();
        for row in rows {
            data.push(row.map_err(|e| {
                FundrecError::data_processing(format!("Failed to process row: {}", e))
            })?);
        }

        Table::new(source, columns, data)
    }

    /// Ordered column names and inferred types for the current view.
    fn column_info(&self) -> Result<Vec<Column>> {
        let mut stmt = self.connection.prepare("DESCRIBE dataset").map_err(|e| {
            FundrecError::data_processing(format!("Failed to prepare describe query: {}", e))
        })?;

        let rows = stmt
            .query_map([], |row| {
                Ok(Column {
                    name: row.get::<_, String>(0)?,
                    data_type: row.get::<_, String>(1)?,
                })
            })
            .map_err(|e| {
                FundrecError::data_processing(format!("Failed to query column info: {}", e))
            })?;

        let mut columns = Vec::new();
        for row in rows {
            columns.push(row.map_err(|e| {
                FundrecError::data_processing(format!("Failed to read column info: {}", e))
            })?);
        }
        Ok(columns)
    }

    /// Check if file format is supported
    pub fn is_supported_format(file_path: &Path) -> bool {
        if let Some(extension) = file_path.extension().and_then(|s| s.to_str()) {
            matches!(
                extension.to_lowercase().as_str(),
                "csv" | "parquet" | "json" | "jsonl" | "tsv"
            )
        } else {
            false
        }
    }
}

/// Map one DuckDB value onto the closed cell variant.
fn cell_from_value(value: ValueRef<'_>) -> Cell {
    match value {
        ValueRef::Null => Cell::Null,
        ValueRef::Boolean(b) => Cell::Boolean(b),
        ValueRef::TinyInt(i) => Cell::Integer(i as i64),
        ValueRef::SmallInt(i) => Cell::Integer(i as i64),
        ValueRef::Int(i) => Cell::Integer(i as i64),
        ValueRef::BigInt(i) => Cell::Integer(i),
        ValueRef::HugeInt(i) => match i64::try_from(i) {
            Ok(v) => Cell::Integer(v),
            Err(_) => Cell::Float(i as f64),
        },
        ValueRef::UTinyInt(i) => Cell::Integer(i as i64),
        ValueRef::USmallInt(i) => Cell::Integer(i as i64),
        ValueRef::UInt(i) => Cell::Integer(i as i64),
        ValueRef::UBigInt(i) => match i64::try_from(i) {
            Ok(v) => Cell::Integer(v),
            Err(_) => Cell::Float(i as f64),
        },
        ValueRef::Float(f) => Cell::Float(f as f64),
        ValueRef::Double(f) => Cell::Float(f),
        ValueRef::Decimal(d) => match d.to_string().parse::<f64>() {
            Ok(v) => Cell::Float(v),
            Err(_) => Cell::Text(d.to_string()),
        },
        ValueRef::Text(s) => Cell::Text(String::from_utf8_lossy(s).to_string()),
        ValueRef::Blob(b) => Cell::Text(format!("<blob:{} bytes>", b.len())),
        ValueRef::Date32(d) => Cell::Text(format!("{:?}", d)),
        ValueRef::Time64(t, _) => Cell::Text(format!("{:?}", t)),
        ValueRef::Timestamp(ts, _) => Cell::Text(format!("{:?}", ts)),
        _ => Cell::Text("<unknown>".to_string()),
    }
}

/// Convert DuckDB errors on file loading to appropriate error types.
fn convert_duckdb_error(error: duckdb::Error, file_path: &Path) -> FundrecError {
    let error_msg = error.to_string();

    if error_msg.contains("CSV Error")
        || error_msg.contains("Could not convert")
        || error_msg.contains("Invalid CSV")
        || error_msg.contains("Unterminated quoted field")
    {
        FundrecError::invalid_input(format!(
            "Malformed CSV file '{}': {}",
            file_path.display(),
            error_msg
        ))
    } else if error_msg.contains("JSON") || error_msg.contains("Malformed JSON") {
        FundrecError::invalid_input(format!(
            "Malformed JSON file '{}': {}",
            file_path.display(),
            error_msg
        ))
    } else if error_msg.contains("No files found") || error_msg.contains("does not exist") {
        FundrecError::invalid_input(format!("File not found: {}", file_path.display()))
    } else if error_msg.contains("Permission denied") {
        FundrecError::invalid_input(format!(
            "Permission denied accessing file: {}",
            file_path.display()
        ))
    } else {
        FundrecError::DuckDb(error)
    }
}
