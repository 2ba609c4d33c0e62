use std::io;
use std::path::PathBuf;
use std::process;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use reptest::config::{self, RunConfig};
use reptest::errors::ReptestError;
use reptest::report;
use reptest::tester::RepetitionTester;
use reptest::workloads;

const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Parser)]
#[command(name = "reptest", version, about = "Repetition-test memory workloads and report timing statistics")]
struct Cli {
    /// Workloads to run, in order (fill, copy, sum, read-file)
    workloads: Vec<String>,

    /// Seconds to keep sampling each workload
    #[arg(short, long)]
    duration: Option<u64>,

    /// Minimum samples per workload, even past the time budget
    #[arg(short = 'n', long)]
    min_iterations: Option<u64>,

    #[arg(long)]
    no_progress: bool,

    /// Buffer size in bytes for the buffer workloads
    #[arg(short, long, default_value_t = 1 << 20)]
    size: usize,

    /// File read by the read-file workload
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// TOML config file (defaults to <config dir>/reptest/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    json: bool,
}

fn init_tracing() {
    let filter = std::env::var("REPTEST_LOG")
        .ok()
        .and_then(|expr| EnvFilter::try_new(expr).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .try_init();
}

/// Defaults, then the config file, then command-line flags.
fn resolve_config(cli: &Cli) -> Result<RunConfig> {
    let mut run_config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => match config::default_config_path() {
            Some(path) if path.is_file() => RunConfig::load(&path)?,
            _ => RunConfig::default(),
        },
    };

    if let Some(seconds) = cli.duration {
        run_config = run_config.with_duration_budget(seconds);
    }
    if let Some(iterations) = cli.min_iterations {
        run_config = run_config.with_min_iterations(iterations);
    }
    if cli.no_progress || cli.json {
        run_config = run_config.with_show_progress(false);
    }
    Ok(run_config)
}

fn workload_names(cli: &Cli) -> Vec<String> {
    if !cli.workloads.is_empty() {
        return cli.workloads.clone();
    }
    workloads::WORKLOAD_NAMES
        .iter()
        .filter(|name| **name != "read-file" || cli.file.is_some())
        .map(|name| name.to_string())
        .collect()
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let run_config = resolve_config(&cli)?;

    let mut tester = RepetitionTester::new();
    for name in workload_names(&cli) {
        let workload = workloads::build(&name, cli.size, cli.file.as_ref())?;
        tester.register_boxed(&name, workload);
    }

    if cli.json {
        tester.run_all_tests_to(&run_config, &mut io::sink())?;
        println!("{}", report::format_json(&tester.summaries(), Utc::now()));
    } else {
        tester.run_all_tests(&run_config)?;
    }

    Ok(())
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        if let Some(ReptestError::ClockUnavailable { .. }) = err.downcast_ref::<ReptestError>() {
            eprintln!("fatal: {}", err);
        } else {
            eprintln!("{}", err);
        }
        process::exit(1);
    }
}
