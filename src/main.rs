use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use folder_relocator::config::{DEFAULT_LOG_FILE, RunConfig};
use folder_relocator::io::excel_write;
use folder_relocator::logging::DiagnosticLog;
use folder_relocator::report::Reporter;
use folder_relocator::{Result, ToolError, task};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run(args) => execute_run(args),
        Command::Check(args) => execute_check(&args.config),
    }
}

fn execute_run(args: RunArgs) -> Result<()> {
    let config = load_config(&args.config)?;

    let log_path = args
        .log_file
        .or_else(|| config.log_file.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
    let log = DiagnosticLog::open(&log_path);

    let mut reporter = Reporter::stdout();
    let summary = task::run_tasks(&config, &mut reporter);

    if let Some(report_path) = args.report.or_else(|| config.report_file.clone()) {
        match excel_write::write_outcome_workbook(&report_path, &summary) {
            Ok(()) => tracing::info!(path = %report_path.display(), "outcome workbook written"),
            Err(err) => {
                tracing::error!(path = %report_path.display(), error = %err, "outcome workbook not written");
                eprintln!("error: cannot write outcome workbook {}: {err}", report_path.display());
            }
        }
    }

    drop(log);
    Ok(())
}

fn execute_check(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let validated = config.validated_tasks();

    let mut invalid = 0;
    for (index, task) in validated.iter().enumerate() {
        match task {
            Ok(task) => {
                let filter = task
                    .filter
                    .as_ref()
                    .map(|filter| format!(", filter {} = '{}'", filter.column, filter.value.coerce()))
                    .unwrap_or_default();
                println!(
                    "task {}: ok ({}, {}, header row {}, match {}{filter})",
                    index + 1,
                    task.excel_path.display(),
                    task.sheet,
                    task.header,
                    task.match_column
                );
            }
            Err(err) => {
                invalid += 1;
                println!("task {}: invalid: {err}", index + 1);
            }
        }
    }

    if invalid > 0 {
        return Err(ToolError::Configuration(format!(
            "{invalid} of {} tasks failed validation",
            validated.len()
        )));
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<RunConfig> {
    if !path.is_file() {
        return Err(ToolError::Configuration(format!(
            "configuration file not found: {}",
            path.display()
        )));
    }
    RunConfig::load(path)
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Move ID-Name folders listed in a spreadsheet into a destination folder."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run every task of a configuration file.
    Run(RunArgs),
    /// Validate a configuration file without touching any folder.
    Check(CheckArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// JSON task configuration.
    #[arg(long)]
    config: PathBuf,

    /// Diagnostic log path, overriding the configuration.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Outcome workbook path, overriding the configuration.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(clap::Args)]
struct CheckArgs {
    /// JSON task configuration.
    #[arg(long)]
    config: PathBuf,
}
