use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use trivy_report::{
    config::Config,
    diff::diff_reports,
    model::{require_path, ScanReport},
    output::{export_report, print_diff, print_export_summary, DiffFormat},
    scanner::{default_report_path, Scanner, TrivyScanner},
};

mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
}

#[derive(Parser)]
#[command(name = "trivy-report")]
#[command(
    author,
    version,
    about = "Convert Trivy reports to filtered spreadsheets and list resolved CVEs"
)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors and diff results
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a Trivy JSON report to a MEDIUM/HIGH/CRITICAL spreadsheet
    Convert {
        /// Trivy JSON report
        report: PathBuf,

        /// Spreadsheet path (default from config: report.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List CVEs present in BEFORE but no longer in AFTER
    Diff {
        /// Earlier Trivy JSON report
        before: PathBuf,

        /// Later Trivy JSON report
        after: PathBuf,

        /// Output format (text, json)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Run `trivy rootfs` on a folder, then convert the report
    Scan {
        /// Folder to scan
        path: PathBuf,

        /// Spreadsheet path (default from config: report.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Where trivy writes its JSON report (default: report_<folder>.json)
        #[arg(long)]
        report_json: Option<PathBuf>,

        /// Trivy executable (default from config: trivy)
        #[arg(long)]
        trivy: Option<String>,
    },

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_codes::ERROR)
        }
    }
}

fn run() -> Result<u8> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Commands::Config { init, path } = cli.command {
        handle_config(init, path)?;
        return Ok(exit_codes::SUCCESS);
    }

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring unreadable config file");
        Config::default()
    });

    match cli.command {
        Commands::Convert { report, output } => {
            let output = output.unwrap_or_else(|| PathBuf::from(&config.output));
            convert(&report, &output, &config, cli.quiet)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Diff {
            before,
            after,
            format,
        } => {
            let format = match format {
                Some(f) => DiffFormat::from_str(&f).map_err(|e| anyhow::anyhow!(e))?,
                None => config.diff_format,
            };
            run_diff(&before, &after, format)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Scan {
            path,
            output,
            report_json,
            trivy,
        } => {
            let output = output.unwrap_or_else(|| PathBuf::from(&config.output));
            let report_json = report_json.unwrap_or_else(|| default_report_path(&path));
            let scanner = TrivyScanner::new(trivy.unwrap_or_else(|| config.trivy_path.clone()));

            run_scan(&scanner, &path, &report_json, cli.quiet)?;
            convert(&report_json, &output, &config, cli.quiet)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { .. } => Ok(exit_codes::SUCCESS),
    }
}

fn convert(report_path: &Path, output: &Path, config: &Config, quiet: bool) -> Result<()> {
    let report = ScanReport::load(report_path)?;
    let filter = config.severity_filter();
    let table = export_report(&report, &filter, &config.sheet_name, output)?;

    info!(
        report = %report.label,
        kept = table.rows().len(),
        total = table.total(),
        "Converted report"
    );

    if !quiet {
        print_export_summary(
            &table,
            &filter,
            report.artifact_name.as_deref(),
            &output.display().to_string(),
        )?;
    }
    Ok(())
}

fn run_diff(before: &Path, after: &Path, format: DiffFormat) -> Result<()> {
    // Both paths are checked before either report is parsed.
    require_path(before)?;
    require_path(after)?;

    let before = ScanReport::load(before)?;
    let after = ScanReport::load(after)?;

    let result = diff_reports(&before, &after)?;
    print_diff(&result, format)
}

fn run_scan(scanner: &dyn Scanner, target: &Path, report_json: &Path, quiet: bool) -> Result<()> {
    let progress = if quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .context("invalid progress template")?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Scanning {} with {}...", target.display(), scanner.name()));
        Some(pb)
    };

    let result = scanner.scan(target, report_json);

    if let Some(pb) = progress {
        match &result {
            Ok(()) => pb.finish_with_message(format!("Report written to {}", report_json.display())),
            Err(_) => pb.finish_and_clear(),
        }
    }

    result.with_context(|| format!("{} scan of {} failed", scanner.name(), target.display()))
}

fn init_logging(verbosity: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbosity {
            0 => EnvFilter::new("trivy_report=warn"),
            1 => EnvFilter::new("trivy_report=info"),
            2 => EnvFilter::new("trivy_report=debug"),
            _ => EnvFilter::new("trace"),
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn handle_config(init: bool, show_path: bool) -> Result<()> {
    let config_path = Config::config_path();

    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        let config = Config::default();
        config.save()?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    if config_path.exists() {
        // Surface parse errors here rather than silently falling back.
        Config::load().with_context(|| format!("invalid config {}", config_path.display()))?;
        let content = std::fs::read_to_string(&config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'trivy-report config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}
