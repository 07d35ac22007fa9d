//! EcoStatus - ecosystem status aggregator
//!
//! Discovers a component inventory from two filesystem roots, probes a
//! fixed set of services for liveness and serves the aggregate snapshot
//! over HTTP, with live events on a WebSocket push channel.
//!
//! Exit codes:
//!   0 - Success (clean shutdown, or --once with nothing to report)
//!   1 - Runtime error (bad config, port in use, etc.)
//!   2 - --once with --fail-on-offline and at least one service offline

mod cli;
mod config;
mod deploy;
mod discovery;
mod error;
mod models;
mod probe;
mod report;
mod server;
mod status;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::Config;
use deploy::SimulatedDeploy;
use indicatif::{ProgressBar, ProgressStyle};
use probe::HttpProbe;
use report::StatusReport;
use status::Aggregator;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("EcoStatus v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("EcoStatus failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .ecostatus.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  .ecostatus.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .ecostatus.toml")?;

    println!("✅ Created .ecostatus.toml with default settings.");
    println!("   Edit it to configure roots, services and the value table.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Build the aggregator and either serve or run once. Returns the exit code.
async fn run(args: Args) -> Result<i32> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let probe = HttpProbe::new(config.probe.timeout_seconds, config.probe.health_path.clone())
        .context("Failed to create HTTP client")?;
    let deployer = SimulatedDeploy::new(Duration::from_secs(config.deploy.delay_seconds));
    let interval = Duration::from_secs(config.probe.interval_seconds);

    let aggregator = Arc::new(Aggregator::new(
        config,
        Arc::new(probe),
        Arc::new(deployer),
    ));

    if args.once {
        return run_once(&args, &aggregator).await;
    }

    let warnings = aggregator.initialize();
    if !warnings.is_empty() {
        warn!(
            "Serving a partial inventory ({} discovery warning(s) in {} root(s))",
            warnings.len(),
            discovery::affected_roots(&warnings)
        );
    }

    aggregator.schedule_probing(interval);
    server::serve(aggregator).await?;

    Ok(0)
}

/// Handle --once: discover, probe a single cycle, print the report.
async fn run_once(args: &Args, aggregator: &Arc<Aggregator>) -> Result<i32> {
    let spinner = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));

    spinner.set_message("Discovering components...");
    let warnings = aggregator.initialize();

    spinner.set_message(format!(
        "Probing {} services...",
        aggregator.config().services.len()
    ));
    aggregator.probe_all().await;
    spinner.finish_and_clear();

    let report = StatusReport {
        snapshot: aggregator.snapshot(),
        components: aggregator.components(),
        warnings,
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("✅ Report saved to: {}", path.display());
        }
        None => println!("{}", output),
    }

    let offline = report.offline_services();
    if args.fail_on_offline && !offline.is_empty() {
        eprintln!(
            "\n⛔ {} service(s) offline: {}. Failing (exit code 2).",
            offline.len(),
            offline.join(", ")
        );
        return Ok(2);
    }

    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", config::DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
