//! backbench CLI
//!
//! Runs the MySQL backup benchmarks and renders the comparison report.
//!
//! # Commands
//!
//! - `full` - Full dump after every batch, restore the last one
//! - `incremental` - Rotate and copy one binary log file per batch
//! - `log-based` - Extract one binary log position window per batch
//! - `all` - Run all three workflows, then the report
//! - `report` - Print the metrics and render the charts

mod commands;

use backbench_core::{BenchConfig, Strategy};
use backbench_report::ChartFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Benchmark full, incremental and log-based MySQL backups.
#[derive(Parser)]
#[command(name = "backbench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(global = true, short, long)]
    config: Option<PathBuf>,

    /// Directory for dumps, log excerpts, metrics and charts
    #[arg(global = true, short, long)]
    work_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Workload overrides shared by the workflow commands.
#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Rows inserted before the first backup
    #[arg(long)]
    initial_records: Option<u64>,

    /// Number of insert batches
    #[arg(long)]
    batches: Option<u32>,

    /// Rows per batch
    #[arg(long)]
    records_per_batch: Option<u64>,

    /// Seed for the synthetic data generator
    #[arg(long)]
    seed: Option<u64>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

impl RunArgs {
    fn apply(&self, mut config: BenchConfig) -> BenchConfig {
        if let Some(n) = self.initial_records {
            config = config.initial_records(n);
        }
        if let Some(n) = self.batches {
            config = config.batches(n);
        }
        if let Some(n) = self.records_per_batch {
            config = config.records_per_batch(n);
        }
        if let Some(seed) = self.seed {
            config = config.seed(seed);
        }
        config
    }
}

/// Report output options.
#[derive(Args, Debug, Default)]
struct ReportArgs {
    /// Chart format (svg, png)
    #[arg(short, long, default_value_t = ChartFormat::Svg)]
    format: ChartFormat,

    /// Directory for chart files (defaults to the work directory)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Full dump after seeding and after every batch
    Full(RunArgs),

    /// Rotate the binary log before each batch and copy the whole file
    Incremental(RunArgs),

    /// Extract one binary log position window per batch
    LogBased(RunArgs),

    /// Run every workflow, then render the report
    All {
        #[command(flatten)]
        run: RunArgs,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Print the metrics and render comparison charts
    Report(ReportArgs),

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = commands::load_config(cli.config.as_deref(), cli.work_dir)?;

    match cli.command {
        Commands::Full(args) => {
            commands::run::run(args.apply(config), Strategy::Full, args.json)?;
        }
        Commands::Incremental(args) => {
            commands::run::run(args.apply(config), Strategy::Incremental, args.json)?;
        }
        Commands::LogBased(args) => {
            commands::run::run(args.apply(config), Strategy::LogBased, args.json)?;
        }
        Commands::All { run, report } => {
            let config = run.apply(config);
            for strategy in Strategy::ALL {
                commands::run::run(config.clone(), strategy, run.json)?;
            }
            let output = report.output.unwrap_or_else(|| config.work_dir.clone());
            commands::report::run(&config.work_dir, &output, report.format)?;
        }
        Commands::Report(report) => {
            let output = report.output.unwrap_or_else(|| config.work_dir.clone());
            commands::report::run(&config.work_dir, &output, report.format)?;
        }
        Commands::Version => {
            println!("backbench CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("backbench core v{}", backbench_core::VERSION);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_workflow_overrides() {
        let cli = Cli::try_parse_from([
            "backbench",
            "--work-dir",
            "/tmp/bench",
            "log-based",
            "--batches",
            "3",
            "--seed",
            "7",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.work_dir, Some(PathBuf::from("/tmp/bench")));
        match cli.command {
            Commands::LogBased(args) => {
                assert_eq!(args.batches, Some(3));
                assert!(args.json);
                let config = args.apply(BenchConfig::new());
                assert_eq!(config.workload.batches, 3);
                assert_eq!(config.seed, Some(7));
                assert_eq!(config.workload.initial_records, 400_000);
            }
            _ => panic!("expected log-based"),
        }
    }

    #[test]
    fn parses_report_format() {
        let cli = Cli::try_parse_from(["backbench", "report", "--format", "png"]).unwrap();
        match cli.command {
            Commands::Report(args) => assert_eq!(args.format, ChartFormat::Png),
            _ => panic!("expected report"),
        }
        assert!(Cli::try_parse_from(["backbench", "report", "--format", "gif"]).is_err());
    }

    #[test]
    fn all_takes_run_and_report_flags() {
        let cli = Cli::try_parse_from([
            "backbench",
            "all",
            "--initial-records",
            "1000",
            "--output",
            "charts",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::All { run, report } => {
                assert_eq!(run.initial_records, Some(1000));
                assert_eq!(report.output, Some(PathBuf::from("charts")));
                assert_eq!(report.format, ChartFormat::Svg);
            }
            _ => panic!("expected all"),
        }
    }
}
