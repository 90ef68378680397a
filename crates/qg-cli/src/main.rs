//! Quality Gate CLI

use clap::{Parser, Subcommand};
use qg_core::{evaluate, CoreError, QualityGate, Report, ReportRow, StoreConfig};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Exit status for a report that evaluates to FAIL
const EXIT_GATE_FAILED: i32 = 2;

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "qg-report")]
#[command(about = "Code quality gate report tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a report file without storing it
    Evaluate {
        /// Path to report JSON
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Create the data directory and reports table
    Init {
        /// Directory holding the database file
        #[arg(short, long, default_value = "./database")]
        data_dir: PathBuf,
    },

    /// Score and store a report file
    Submit {
        /// Path to report JSON
        #[arg(short, long)]
        file: PathBuf,

        /// Directory holding the database file
        #[arg(short, long, default_value = "./database")]
        data_dir: PathBuf,
    },

    /// Show stored reports for a user, oldest first
    List {
        /// User identifier
        #[arg(short, long)]
        user: String,

        /// Directory holding the database file
        #[arg(short, long, default_value = "./database")]
        data_dir: PathBuf,

        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        output: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set subscriber: {}", e);
    }

    let outcome = match cli.command {
        Commands::Evaluate { file } => cmd_evaluate(&file),
        Commands::Init { data_dir } => cmd_init(data_dir).await,
        Commands::Submit { file, data_dir } => cmd_submit(&file, data_dir).await,
        Commands::List { user, data_dir, output } => cmd_list(&user, data_dir, &output).await,
    };

    match outcome {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

fn cmd_evaluate(file: &Path) -> CliResult<i32> {
    let report = read_report(file)?;
    let evaluation = evaluate(&report);

    println!("\nQuality Gate Evaluation\n{}", "=".repeat(50));
    println!("User:    {}", report.user);
    println!("Project: {}", report.project);
    println!("OK:      {}/{}", evaluation.total_ok, qg_core::REQUIRED_OK);

    if !evaluation.failing.is_empty() {
        println!("\nNot OK:");
        for field in &evaluation.failing {
            println!("  - {}: {:?}", field, report.metric(*field));
        }
    }

    println!("\n{}", "=".repeat(50));
    println!("Result: {}", evaluation.verdict);

    Ok(exit_code(evaluation.verdict.is_pass()))
}

async fn cmd_init(data_dir: PathBuf) -> CliResult<i32> {
    let config = StoreConfig::new(data_dir);
    let gate = QualityGate::open(&config).await?;
    gate.store().close().await;

    info!("Report store initialized at {}", config.database_path().display());
    Ok(0)
}

async fn cmd_submit(file: &Path, data_dir: PathBuf) -> CliResult<i32> {
    let report = read_report(file)?;
    let gate = QualityGate::open(&StoreConfig::new(data_dir)).await?;

    let submission = gate.submit(&report).await?;
    gate.store().close().await;

    println!("Report {} saved: {}", submission.id, submission.verdict());
    Ok(exit_code(submission.verdict().is_pass()))
}

async fn cmd_list(user: &str, data_dir: PathBuf, output: &str) -> CliResult<i32> {
    let gate = QualityGate::open(&StoreConfig::new(data_dir)).await?;
    let rows = gate.history(user).await?;
    gate.store().close().await;

    if rows.is_empty() {
        println!("No reports found for user {}", user);
        return Ok(1);
    }

    match output.to_lowercase().as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        _ => print_table(user, &rows),
    }

    Ok(0)
}

fn read_report(file: &Path) -> CliResult<Report> {
    let data = std::fs::read(file)?;
    let report = serde_json::from_slice(&data)
        .map_err(|e| CoreError::InvalidReport(format!("{}: {}", file.display(), e)))?;
    Ok(report)
}

fn print_table(user: &str, rows: &[ReportRow]) {
    println!("\nReports for {}\n{}", user, "=".repeat(50));
    println!(
        "{:<4} {:<20} {:<6} {:<6} {:<6} {:<6} {:<6} {:<6} {:<10} {}",
        "#", "PROJECT", "REL", "SEC", "MAINT", "BUGS", "SMELL", "CRIT", "UNCOVERED", "RESULT"
    );
    for (i, row) in rows.iter().enumerate() {
        println!(
            "{:<4} {:<20} {:<6} {:<6} {:<6} {:<6} {:<6} {:<6} {:<10} {}",
            i + 1,
            row.project,
            row.new_reliability_rating,
            row.new_security_rating,
            row.new_maintainability_rating,
            row.bugs,
            row.code_smells,
            row.critical_violations,
            row.uncovered_lines,
            row.result
        );
    }
}

fn exit_code(passed: bool) -> i32 {
    if passed {
        0
    } else {
        EXIT_GATE_FAILED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_list_defaults() {
        let cli = Cli::try_parse_from(["qg-report", "list", "--user", "alice"]).unwrap();
        match cli.command {
            Commands::List { user, data_dir, output } => {
                assert_eq!(user, "alice");
                assert_eq!(data_dir, PathBuf::from("./database"));
                assert_eq!(output, "table");
            }
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn test_error_labels() {
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(CliError::from(json).to_string().starts_with("JSON error: "));

        let core = CliError::from(CoreError::InvalidReport("report.json: bad".into()));
        assert_eq!(core.to_string(), "Invalid report: report.json: bad");
    }

    #[test]
    fn test_read_report_accepts_nulls() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        std::fs::write(&path, r#"{"user":"n","bugs":null}"#).unwrap();

        let report = read_report(&path).unwrap();
        assert_eq!(report.user, "n");
        assert_eq!(report.bugs, "");

        std::fs::write(&path, "{").unwrap();
        assert!(matches!(
            read_report(&path),
            Err(CliError::Core(CoreError::InvalidReport(_)))
        ));
    }

    #[test]
    fn test_exit_code() {
        assert_eq!(exit_code(true), 0);
        assert_eq!(exit_code(false), EXIT_GATE_FAILED);
    }
}
