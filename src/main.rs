//! fsaudit - single-pass file system audit.
//!
//! Usage:
//!   fsaudit <PATH>                   Categorize, check permissions, find large files
//!   fsaudit <PATH> -s "500 MiB"      Change the large-file threshold
//!   fsaudit <PATH> -d                Offer to delete flagged files
//!   fsaudit <PATH> -l audit.log      Send logs and reports to a file
//!   fsaudit <PATH> -f json           Machine-readable output
//!   fsaudit --help                   Show help

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use fsaudit_analyze::{Audit, AuditReport, PurgeOutcome};
use fsaudit_core::{AuditConfig, Confirm, DeleteMode, Settings, format_size};

#[derive(Parser)]
#[command(
    name = "fsaudit",
    version,
    about = "Audit a directory tree in a single pass",
    long_about = "fsaudit walks a directory once and reports file categories, files \
                  with risky permissions, files above a size threshold and overall \
                  size statistics. Flagged files can optionally be deleted."
)]
struct Cli {
    /// Directory to audit
    path: PathBuf,

    /// Large-file threshold (e.g., "1 MiB", "250MB", "4096")
    #[arg(short, long)]
    size: Option<String>,

    /// Offer to delete files with bad permissions and large files
    #[arg(short, long)]
    delete: bool,

    /// With --delete, confirm each file instead of each group
    #[arg(long, requires = "delete")]
    one_by_one: bool,

    /// Append logs and reports to this file instead of the terminal
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// TOML config file with a [settings] table; its values win
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON file mapping categories to extensions
    #[arg(long)]
    categories: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Skip symbolic links to directories instead of walking them
    #[arg(long)]
    no_follow_symlinks: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Cli {
    fn into_config(self) -> Result<(AuditConfig, OutputFormat)> {
        let delete_mode = match (self.delete, self.one_by_one) {
            (false, _) => DeleteMode::Never,
            (true, false) => DeleteMode::Batch,
            (true, true) => DeleteMode::OneByOne,
        };

        let mut builder = AuditConfig::builder();
        builder
            .root(self.path)
            .follow_symlinks(!self.no_follow_symlinks)
            .delete_mode(delete_mode);
        if let Some(size) = self.size {
            builder.size_threshold(size);
        }
        if let Some(log) = self.log {
            builder.log_file(log);
        }
        if let Some(categories) = self.categories {
            builder.categories_file(categories);
        }
        let mut config = builder.build().context("Invalid arguments")?;

        if let Some(ref path) = self.config {
            let settings = Settings::load(path).context("Failed to load config file")?;
            config = config.apply_settings(&settings);
        }

        Ok((config, self.format))
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let (config, format) = Cli::parse().into_config()?;
    init_logging(config.log_file.as_deref())?;
    log_intro(&config);

    let mut audit = Audit::new(&config).context("Invalid configuration")?;
    audit.run();

    let report = audit.report();
    emit(&render(&report, format)?, config.log_file.as_deref())?;

    if config.delete_mode != DeleteMode::Never {
        if config.is_logging_to_file() {
            tracing::info!("Output is redirected to a log file; skipping deletion");
        } else {
            let outcome = audit.purge(config.delete_mode, &mut StdinConfirm);
            print_purge(&outcome, format)?;
        }
    }

    Ok(())
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = open_log(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

fn open_log(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))
}

fn log_intro(config: &AuditConfig) {
    let threshold = match config.threshold_bytes() {
        Ok(bytes) => format_size(bytes),
        Err(_) => config.size_threshold.clone().unwrap_or_default(),
    };
    let log = config
        .log_file
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "none".to_string());

    tracing::info!("Target directory: {}", config.root.display());
    tracing::info!("Size threshold: {threshold}");
    tracing::info!("Delete mode: {:?}", config.delete_mode);
    tracing::info!("Log file: {log}");
}

fn render(report: &AuditReport, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Text => report.to_string(),
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
    })
}

/// Print to stdout, or append to the log file when one is set.
fn emit(output: &str, log_file: Option<&Path>) -> Result<()> {
    match log_file {
        Some(path) => {
            let mut file = open_log(path)?;
            writeln!(file, "{output}").context("Failed to write report to log file")?;
        }
        None => println!("{output}"),
    }
    Ok(())
}

fn print_purge(outcome: &PurgeOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(outcome)?),
        OutputFormat::Text => {
            for (title, report) in [
                ("Bad permissions", &outcome.permissions),
                ("Large files", &outcome.large_files),
            ] {
                if let Some(report) = report {
                    println!();
                    println!("{title}:");
                    println!("{report}");
                }
            }
        }
    }
    Ok(())
}

/// Yes/no prompt on the terminal. Anything but "y"/"yes" is a no.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut input = String::new();
        match io::stdin().lock().read_line(&mut input) {
            Ok(_) => matches!(input.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(err) => {
                tracing::warn!("Failed to read answer: {err}");
                false
            }
        }
    }
}
