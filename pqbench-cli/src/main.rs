use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use pqbench_common::{AlgorithmDescriptor, BenchmarkReport};
use pqbench_engine::{BenchConfig, OperationFilter, Orchestrator};
use pqbench_provider::{CryptoProvider, PqcryptoProvider};
use pqbench_report::{render, render_summary, summarize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tracing::{info, Level};

/// How long exit waits for operations abandoned after a timeout
const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(name = "pqbench")]
#[command(about = "Post-quantum KEM and signature benchmark", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Benchmark algorithms (Default)
    Run(RunArgs),
    /// List the mechanisms the provider offers
    List,
    /// Render reports saved with `run --save`, merged in the order given
    Show(ShowArgs),
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Saved report files (.json, anything else is read as binary)
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Print the merged report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Algorithm names (default: ML-KEM-512/768/1024, ML-DSA-44/65/87)
    algorithms: Vec<String>,

    /// Operation filter: kem, sig or both
    #[arg(long = "ops", value_name = "FILTER")]
    operations: Option<OperationFilter>,

    /// TOML config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Per-operation timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Benchmark algorithms concurrently
    #[arg(long)]
    parallel: bool,

    /// Concurrent algorithms in parallel mode
    #[arg(long)]
    workers: Option<usize>,

    /// Message to sign
    #[arg(long)]
    message: Option<String>,

    /// Run the whole benchmark this many times and merge the results
    #[arg(long)]
    rounds: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Save the report (.json as JSON, anything else in compact binary form)
    #[arg(long, value_name = "PATH")]
    save: Option<PathBuf>,
}

impl RunArgs {
    fn to_config(&self) -> Result<BenchConfig> {
        let mut config = match &self.config {
            Some(path) => BenchConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => BenchConfig::default(),
        };

        if !self.algorithms.is_empty() {
            config.algorithms = self.algorithms.clone();
        }
        if let Some(ops) = self.operations {
            config.operations = ops;
        }
        if self.timeout_ms.is_some() {
            config.timeout_ms = self.timeout_ms;
        }
        if self.parallel {
            config.parallel = true;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(message) = &self.message {
            config.message = message.clone();
        }

        config.validate().context("Invalid benchmark configuration")?;
        Ok(config)
    }

    fn rounds(&self) -> usize {
        self.rounds.unwrap_or(1).max(1)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let runtime = build_runtime()?;
    let outcome = runtime.block_on(dispatch(cli.command));
    shutdown(runtime);
    outcome
}

fn build_runtime() -> Result<Runtime> {
    Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")
}

/// Operations abandoned after a timeout may still be running on the blocking pool; exit
/// waits for them at most `SHUTDOWN_GRACE`.
fn shutdown(runtime: Runtime) {
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
}

async fn dispatch(command: Option<Commands>) -> Result<()> {
    match command.unwrap_or(Commands::Run(RunArgs::default())) {
        // Saved reports need no provider
        Commands::Show(args) => show_reports(&args),
        Commands::List => {
            print_algorithms(&init_provider()?);
            Ok(())
        }
        Commands::Run(args) => run_benchmark(Arc::new(init_provider()?), &args).await,
    }
}

/// The only failure that ends the process with a nonzero code
fn init_provider() -> Result<PqcryptoProvider> {
    let provider =
        PqcryptoProvider::new().context("Failed to initialize the cryptographic provider")?;
    info!("Using provider: {}", provider.name());
    Ok(provider)
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };
    // Logs go to stderr so `--json` output stays clean
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_benchmark(provider: Arc<dyn CryptoProvider>, args: &RunArgs) -> Result<()> {
    // 1. Resolve configuration
    let config = args.to_config()?;
    let orchestrator = Orchestrator::new(provider);

    // 2. Benchmark, once per round
    let mut report = BenchmarkReport::new();
    for round in 1..=args.rounds() {
        if args.rounds() > 1 {
            info!("Round {}/{}", round, args.rounds());
        }
        report.merge(orchestrator.run(&config).await?);
    }

    // 3. Report
    if let Some(path) = &args.save {
        save_report(&report, path)?;
        info!("Report saved to {}", path.display());
    }
    print_report(&report, args.json)
}

fn show_reports(args: &ShowArgs) -> Result<()> {
    let mut report = BenchmarkReport::new();
    for path in &args.paths {
        report.merge(load_report(path)?);
    }
    print_report(&report, args.json)
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn save_report(report: &BenchmarkReport, path: &Path) -> Result<()> {
    let bytes = if is_json(path) {
        report.to_json()?.into_bytes()
    } else {
        report.to_bytes()?
    };
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

fn load_report(path: &Path) -> Result<BenchmarkReport> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let report = if is_json(path) {
        BenchmarkReport::from_json(&String::from_utf8_lossy(&bytes))
    } else {
        BenchmarkReport::from_bytes(&bytes)
    };
    report.with_context(|| format!("{} is not a valid report", path.display()))
}

fn print_report(report: &BenchmarkReport, json: bool) -> Result<()> {
    if json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    let summary = summarize(report);
    print!("{}", render(report));
    println!("\n{}", "SUMMARY".bold());
    print!("{}", render_summary(&summary));

    let failed = summary.total_attempts() - summary.total_successes();
    if failed == 0 {
        println!("{}", "All operations verified.".green());
    } else {
        println!("{}", format!("{} operation(s) failed.", failed).red().bold());
    }
    Ok(())
}

fn print_algorithms(provider: &dyn CryptoProvider) {
    print_family("KEM Mechanisms", &provider.kem_algorithms());
    print_family("Signature Mechanisms", &provider.signature_algorithms());
    if let Some(note) = provider.compatibility_note() {
        println!("\n{} {}", "Note:".yellow(), note);
    }
}

fn print_family(title: &str, algorithms: &[AlgorithmDescriptor]) {
    println!("\n{}:", title.bold());
    for alg in algorithms {
        let line = format!("  - {:<12} {}", alg.name(), alg.security_level());
        if alg.is_enabled() {
            println!("{}", line);
        } else {
            println!("{} {}", line.dimmed(), "(disabled)".yellow());
        }
    }
}
