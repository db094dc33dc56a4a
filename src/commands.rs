//! Command implementations for the fundrec CLI

use crate::cli::{parse_column_list, Commands, OutputFormat};
use crate::config::CompareConfig;
use crate::engine::Reconciler;
use crate::error::{FundrecError, Result};
use crate::loader::DatasetLoader;
use crate::output::{CsvExporter, JsonFormatter, PrettyPrinter};
use crate::progress::ProgressReporter;
use crate::result::CompareKind;
use crate::table::Table;
use std::path::{Path, PathBuf};

/// Execute a command
pub fn execute_command(command: Commands, verbose: bool) -> Result<()> {
    match command {
        Commands::Compare {
            left,
            right,
            mode,
            config,
            key_columns,
            ignore_columns,
            tolerance,
            ignore_case,
            keep_whitespace,
            query,
            rename,
            output,
            export,
            format,
            summary_only,
        } => {
            let options = CompareOptions {
                left,
                right,
                mode,
                config,
                key_columns,
                ignore_columns,
                tolerance,
                ignore_case,
                keep_whitespace,
                query,
                rename,
                output,
                export,
                format,
                summary_only,
            };
            compare_command(options, verbose)
        }
        Commands::Info { file, format } => info_command(&file, &format),
        Commands::InitConfig { path, force } => init_config_command(&path, force),
    }
}

struct CompareOptions {
    left: String,
    right: String,
    mode: String,
    config: Option<PathBuf>,
    key_columns: Option<String>,
    ignore_columns: Option<String>,
    tolerance: Option<f64>,
    ignore_case: bool,
    keep_whitespace: bool,
    query: bool,
    rename: Vec<(String, String)>,
    output: Option<PathBuf>,
    export: Option<PathBuf>,
    format: String,
    summary_only: bool,
}

/// Compare two datasets and render the result
fn compare_command(options: CompareOptions, verbose: bool) -> Result<()> {
    let kind = CompareKind::parse(&options.mode).map_err(FundrecError::config)?;
    let format = OutputFormat::parse(&options.format).map_err(FundrecError::invalid_input)?;

    let config = build_config(&options)?;
    log::debug!(
        "Comparing '{}' against '{}' (mode: {}, tolerance: {})",
        options.left,
        options.right,
        kind.as_str(),
        config.float_tolerance
    );

    // Machine-readable output keeps stdout clean
    let mut progress = match format {
        OutputFormat::Json => ProgressReporter::new_minimal(),
        OutputFormat::Pretty => ProgressReporter::new(),
    };

    let loader = DatasetLoader::new()?;

    progress.update_load(&format!("Loading {}...", options.left));
    let left_table = load_left(&loader, &options)?;

    progress.update_load(&format!("Loading {}...", options.right));
    let right_table = loader.load_path(Path::new(&options.right))?;

    progress.finish_load(&format!(
        "Loaded {} + {} rows",
        left_table.row_count(),
        right_table.row_count()
    ));

    let result = Reconciler::new(&config).compare(&left_table, &right_table, kind)?;
    progress.finish_compare("Reconciliation complete");
    drop(progress);

    match format {
        OutputFormat::Pretty => {
            if options.summary_only {
                PrettyPrinter::print_key_differences(&result.key_differences());
            } else {
                PrettyPrinter::print_result(&result, verbose);
            }
        }
        OutputFormat::Json => {
            if options.summary_only {
                println!("{}", JsonFormatter::format(&result.key_differences())?);
            } else {
                println!("{}", JsonFormatter::format(&result)?);
            }
        }
    }

    if let Some(path) = &options.output {
        JsonFormatter::write_report(&result, path)?;
        println!("✅ JSON report written to: {}", path.display());
    }
    if let Some(path) = &options.export {
        CsvExporter::write_flat(&result, path)?;
        println!("✅ Differences exported to: {}", path.display());
    }

    Ok(())
}

/// Merge config file and CLI overrides into the effective policy.
fn build_config(options: &CompareOptions) -> Result<CompareConfig> {
    let mut config = match &options.config {
        Some(path) => CompareConfig::from_file(path)?,
        None => CompareConfig::default(),
    };

    if let Some(tolerance) = options.tolerance {
        config.float_tolerance = tolerance;
    }
    if options.ignore_case {
        config.ignore_case = true;
    }
    if options.keep_whitespace {
        config.ignore_whitespace = false;
    }
    if let Some(keys) = &options.key_columns {
        config.key_columns = parse_column_list(keys);
    }
    if let Some(ignored) = &options.ignore_columns {
        config.ignore_columns = parse_column_list(ignored).into_iter().collect();
    }

    config.validate()?;
    Ok(config)
}

/// Load the left (internal) side: a data file, or a SQL file with --query.
/// Renames apply afterwards so the warehouse identifier column can land
/// under the report-side key-column name.
fn load_left(loader: &DatasetLoader, options: &CompareOptions) -> Result<Table> {
    let mut table = if options.query {
        let sql = std::fs::read_to_string(&options.left).map_err(|e| {
            FundrecError::invalid_input(format!(
                "Cannot read query file '{}': {}",
                options.left, e
            ))
        })?;
        loader.load_query(&sql, &options.left)?
    } else {
        loader.load_path(Path::new(&options.left))?
    };

    for (from, to) in &options.rename {
        table.rename_column(from, to)?;
        log::debug!("Renamed left column '{}' to '{}'", from, to);
    }
    Ok(table)
}

/// Show structure and row count of a dataset
fn info_command(file: &Path, format: &str) -> Result<()> {
    let format = OutputFormat::parse(format).map_err(FundrecError::invalid_input)?;
    let loader = DatasetLoader::new()?;
    let table = loader.load_path(file)?;

    match format {
        OutputFormat::Pretty => PrettyPrinter::print_table_info(&table),
        OutputFormat::Json => {
            let info = serde_json::json!({
                "source": table.source,
                "row_count": table.row_count(),
                "columns": table.columns(),
            });
            println!("{}", JsonFormatter::format(&info)?);
        }
    }
    Ok(())
}

/// Write a sample configuration file
fn init_config_command(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(FundrecError::invalid_input(format!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        )));
    }

    let template = serde_json::to_string_pretty(&CompareConfig::template())?;
    std::fs::write(path, template)?;
    println!("✅ Sample configuration written to: {}", path.display());
    Ok(())
}
