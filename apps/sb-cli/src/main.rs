use clap::{Parser, Subcommand, ValueEnum};
use sb_app::{AppResult, ValidationResponse, load_capabilities, validate_batch};
use sb_capabilities::CapabilityTable;
use sb_model::ArrayAssembly;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "sb-cli")]
#[command(about = "Scheduling block validation for SKA Mid and SKA Low", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate one or more SBD files (JSON or YAML)
    Validate {
        /// SBD files to validate
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Array assembly to validate against (AA0.5, AA1, AA2)
        #[arg(short, long, default_value = "AA0.5")]
        array_assembly: ArrayAssembly,
        /// Capability table file replacing the built-in values
        #[arg(short, long)]
        capabilities: Option<PathBuf>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
    /// Print the effective capability table
    Capabilities {
        /// Capability table file replacing the built-in values
        #[arg(short, long)]
        capabilities: Option<PathBuf>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = TableFormat::Yaml)]
        format: TableFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Json,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TableFormat {
    Yaml,
    Json,
}

#[derive(Serialize)]
struct FileReport<'a> {
    path: String,
    #[serde(flatten)]
    response: &'a ValidationResponse,
}

fn main() -> AppResult<ExitCode> {
    // Logs go to stderr; stdout carries the report.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            files,
            array_assembly,
            capabilities,
            format,
        } => cmd_validate(&files, array_assembly, capabilities.as_deref(), format),
        Commands::Capabilities {
            capabilities,
            format,
        } => cmd_capabilities(capabilities.as_deref(), format).map(|()| ExitCode::SUCCESS),
    }
}

fn cmd_validate(
    files: &[PathBuf],
    array_assembly: ArrayAssembly,
    capabilities_path: Option<&Path>,
    format: ReportFormat,
) -> AppResult<ExitCode> {
    let capabilities = load_capabilities(capabilities_path)?;
    info!(files = files.len(), %array_assembly, "validating");

    let responses = validate_batch(files, array_assembly, &capabilities)
        .into_iter()
        .map(|outcome| outcome.result.map(|response| (outcome.path, response)))
        .collect::<AppResult<Vec<_>>>()?;

    let mut out = io::stdout().lock();
    match format {
        ReportFormat::Json => {
            let reports: Vec<FileReport<'_>> = responses
                .iter()
                .map(|(path, response)| FileReport {
                    path: path.display().to_string(),
                    response,
                })
                .collect();
            serde_json::to_writer_pretty(&mut out, &reports).map_err(io::Error::from)?;
            writeln!(out)?;
        }
        ReportFormat::Text => {
            for (path, response) in &responses {
                write_text_report(&mut out, path, array_assembly, response)?;
            }
        }
    }

    let all_valid = responses.iter().all(|(_, response)| response.valid);
    Ok(if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn write_text_report(
    out: &mut impl Write,
    path: &Path,
    array_assembly: ArrayAssembly,
    response: &ValidationResponse,
) -> io::Result<()> {
    if response.valid {
        writeln!(out, "✓ {} is valid for {array_assembly}", path.display())?;
        return Ok(());
    }

    writeln!(
        out,
        "✗ {}: {} error(s), {} warning(s) for {array_assembly}",
        path.display(),
        response.error_count(),
        response.warning_count()
    )?;
    for issue in &response.issues {
        writeln!(out, "  {issue}")?;
    }
    Ok(())
}

fn cmd_capabilities(capabilities_path: Option<&Path>, format: TableFormat) -> AppResult<()> {
    let table: CapabilityTable = load_capabilities(capabilities_path)?;
    let rendered = match format {
        TableFormat::Yaml => table.to_yaml()?,
        TableFormat::Json => table.to_json()?,
    };

    let mut out = io::stdout().lock();
    write!(out, "{rendered}")?;
    if !rendered.ends_with('\n') {
        writeln!(out)?;
    }
    Ok(())
}
