//! Output formatting utilities

use crate::error::Result;
use crate::result::{CompareResult, KeyDifferences};
use crate::table::Table;
use std::path::Path;

/// Pretty printer for fundrec output
pub struct PrettyPrinter;

impl PrettyPrinter {
    /// Print a comparison result as a tree summary.
    pub fn print_result(result: &CompareResult, verbose: bool) {
        println!(
            "🔍 Reconciliation ({}): {} ↔ {}",
            result.kind.as_str(),
            result.left_source,
            result.right_source
        );

        Self::print_schema_section(result);
        Self::print_row_section(result, verbose);
        Self::print_tail_section(result);
    }

    fn print_schema_section(result: &CompareResult) {
        use crate::result::CompareKind;
        if !matches!(result.kind, CompareKind::Full | CompareKind::Schema) {
            return;
        }
        let d = &result.differences;
        let schema_clean = d.columns_only_in_left.is_empty()
            && d.columns_only_in_right.is_empty()
            && d.type_mismatches.is_empty();

        if schema_clean {
            println!("├─ ✅ Schema: aligned");
            return;
        }

        println!("├─ ❌ Schema: differences found");
        if !d.columns_only_in_left.is_empty() {
            println!("│  ├─ Only in left: {}", d.columns_only_in_left.join(", "));
        }
        if !d.columns_only_in_right.is_empty() {
            println!("│  ├─ Only in right: {}", d.columns_only_in_right.join(", "));
        }
        if !d.type_mismatches.is_empty() {
            println!("│  └─ Type mismatches: {}", d.type_mismatches.len());
            for (column, types) in &d.type_mismatches {
                println!("│     └─ {}: {} ↔ {}", column, types.left, types.right);
            }
        }
    }

    fn print_row_section(result: &CompareResult, verbose: bool) {
        let s = &result.summary;
        let d = &result.differences;

        if let Some(subset) = &s.subset {
            if subset.is_subset {
                println!("├─ ✅ Subset: every distinct left row occurs on the right");
            } else {
                println!(
                    "├─ ❌ Subset: {}/{} distinct left rows found on the right",
                    subset.matching_rows, subset.distinct_rows_left
                );
            }
            return;
        }

        if s.common_rows == 0 && d.rows_only_in_left.is_empty() && d.rows_only_in_right.is_empty() {
            return;
        }

        if !d.rows_only_in_left.is_empty() || !d.rows_only_in_right.is_empty() {
            println!(
                "├─ ❌ Keys: {} only in left, {} only in right",
                s.rows_only_in_left, s.rows_only_in_right
            );
            if verbose {
                Self::print_key_sample("│  ├─ Left sample", &d.rows_only_in_left);
                Self::print_key_sample("│  └─ Right sample", &d.rows_only_in_right);
            }
        } else {
            println!("├─ ✅ Keys: all matched");
        }

        if s.duplicate_keys_left + s.duplicate_keys_right > 0 {
            println!(
                "├─ ⚠️  Duplicate keys: {} left, {} right (first occurrence kept)",
                s.duplicate_keys_left, s.duplicate_keys_right
            );
        }

        if d.cell_diffs.is_empty() {
            println!("├─ ✅ Values: {} common rows identical", s.common_rows);
        } else {
            println!(
                "├─ ❌ Values: {} of {} common rows differ",
                s.different_rows, s.common_rows
            );
            for (i, (key, row)) in d.cell_diffs.iter().take(3).enumerate() {
                let is_last = i == d.cell_diffs.len().min(3) - 1;
                let row_prefix = if is_last { "└─" } else { "├─" };
                println!("│  {} {}: {} columns differ", row_prefix, key, row.len());

                let continuation = if is_last { "   " } else { "│  " };
                for (j, (column, diff)) in row.iter().take(2).enumerate() {
                    let is_last_cell = j == row.len().min(2) - 1;
                    let cell_prefix = if is_last_cell { "└─" } else { "├─" };
                    println!(
                        "│  {}{} {}: '{}' ↔ '{}' [{}]",
                        continuation,
                        cell_prefix,
                        column,
                        diff.left.render(),
                        diff.right.render(),
                        diff.kind.label()
                    );
                }
                if row.len() > 2 {
                    println!("│  {}   ... and {} more", continuation, row.len() - 2);
                }
            }
            if d.cell_diffs.len() > 3 {
                println!("│  └─ ... and {} more rows", d.cell_diffs.len() - 3);
            }
        }
    }

    fn print_tail_section(result: &CompareResult) {
        let s = &result.summary;
        if matches!(result.kind, crate::result::CompareKind::Full) {
            println!(
                "└─ Rows: {} left, {} right | match {:.1}% | coverage {:.1}%",
                s.rows_left, s.rows_right, s.match_percentage, s.coverage_percentage
            );
        } else {
            println!("└─ Rows: {} left, {} right", s.rows_left, s.rows_right);
        }

        if result.is_clean() {
            println!();
            println!("✅ Datasets reconcile");
        } else {
            println!();
            println!("🟡 Discrepancies found; export the detail with:");
            println!("  fundrec compare <left> <right> --export differences.csv");
        }
    }

    fn print_key_sample(label: &str, keys: &indexmap::IndexSet<String>) {
        let sample: Vec<&str> = keys.iter().take(5).map(|k| k.as_str()).collect();
        let suffix = if keys.len() > 5 { ", ..." } else { "" };
        println!("{}: {}{}", label, sample.join(", "), suffix);
    }

    /// Print the reduced counts-by-category view.
    pub fn print_key_differences(view: &KeyDifferences) {
        println!("📊 Key differences");
        println!("├─ Rows only in left: {}", view.rows_only_in_left);
        println!("├─ Rows only in right: {}", view.rows_only_in_right);
        println!("├─ Rows with cell differences: {}", view.rows_with_cell_diffs);
        println!("├─ Duplicate keys: {}", view.duplicate_keys);
        println!(
            "├─ Numeric differences: {} ({} significant)",
            view.numeric_differences, view.significant_numeric_differences
        );
        println!("├─ Text differences: {}", view.text_differences);
        println!("├─ Type differences: {}", view.type_differences);
        println!("└─ Missing values: {}", view.missing_values);
    }

    /// Print basic information about a loaded table.
    pub fn print_table_info(table: &Table) {
        println!("📄 {}", table.source);
        println!("├─ Rows: {}", table.row_count());
        println!("└─ Columns: {}", table.column_count());
        for (i, column) in table.columns().iter().enumerate() {
            let prefix = if i == table.column_count() - 1 {
                "   └─"
            } else {
                "   ├─"
            };
            println!("{} {} ({})", prefix, column.name, column.data_type);
        }
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format any serializable data as JSON
    pub fn format<T: serde::Serialize + ?Sized>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }

    /// Write a full report file: timestamped envelope around the result.
    pub fn write_report(result: &CompareResult, path: &Path) -> Result<()> {
        let report = serde_json::json!({
            "report_info": {
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "tool_version": env!("CARGO_PKG_VERSION"),
                "comparison_kind": result.kind.as_str(),
            },
            "summary": result.summary,
            "differences": result.differences,
            "statistics": result.statistics,
            "key_differences": result.key_differences(),
        });

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        Ok(())
    }
}

/// Writer for the flattened per-cell difference export.
pub struct CsvExporter;

impl CsvExporter {
    /// Write one record per differing cell: key, column, both values,
    /// classification.
    pub fn write_flat(result: &CompareResult, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["key", "column", "left_value", "right_value", "classification"])?;
        for diff in result.flatten() {
            let left_value = diff.left.render();
            let right_value = diff.right.render();
            writer.write_record([
                diff.key.as_str(),
                diff.column.as_str(),
                left_value.as_str(),
                right_value.as_str(),
                diff.classification,
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}
