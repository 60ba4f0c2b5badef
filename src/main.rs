//! compscope - competitive analysis client
//!
//! A CLI tool that drives a remote competitive-analysis backend through
//! its analysis steps and renders the competitors it returns.
//!
//! Exit codes:
//!   0 - Success (error slot empty at the end of the run)
//!   1 - Runtime error (config, HTTP client, report writing, etc.)
//!   2 - The error slot holds an error at the end of the run

mod cli;
mod config;
mod error;
mod models;
mod orchestrator;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, Endpoints};
use error::StepError;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use models::{AnalysisStep, Report, ReportMetadata};
use orchestrator::{HttpTransport, Orchestrator, StepObserver};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("compscope v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_analysis(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .compscope.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  .compscope.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .compscope.toml")?;

    println!("✅ Created .compscope.toml with default settings.");
    println!("   Add your analysis endpoints under [endpoints].");
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

/// Run the requested analysis steps. Returns exit code (0 or 2).
async fn run_analysis(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!("Failed to load .env: {}", e),
    }

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let endpoints = Endpoints::from_environment(&config);
    let steps = args.effective_steps();

    if args.dry_run {
        return handle_dry_run(&endpoints, &steps);
    }

    let transport = HttpTransport::new(config.http.timeout_seconds, config.http.accept_json)?;
    let orchestrator = Orchestrator::new(endpoints, transport);
    orchestrator.set_brand_name(args.brand_name());

    if orchestrator.endpoints().configured_steps().is_empty() {
        warn!("No analysis endpoints configured; every step will fail");
    }

    println!("🔬 Running competitive analysis for: {}", args.brand_name());
    println!(
        "   Steps: {}",
        steps
            .iter()
            .map(|s| s.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "   Mode: {}",
        if config.general.concurrent {
            "Concurrent"
        } else {
            "Sequential"
        }
    );
    println!("   Timeout: {}s\n", config.http.timeout_seconds);

    let spinners = SpinnerObserver::new();
    let observer: &dyn StepObserver = if args.quiet { &() } else { &spinners };

    let payloads = if config.general.concurrent {
        orchestrator.run_concurrently(&steps, observer).await
    } else {
        orchestrator.run_sequence(&steps, observer).await
    };

    let session = orchestrator.snapshot();
    let duration = start_time.elapsed().as_secs_f64();

    println!();
    print!("{}", report::render_dashboard(&session));

    if session.refresh_failures > 0 {
        warn!(
            "{} competitor refresh call(s) failed; showing the last known list",
            session.refresh_failures
        );
    }

    if let Some(ref output) = args.output {
        let report = build_report(&session, steps, payloads, duration);
        let content = match args.format {
            OutputFormat::Json => report::generate_json_report(&report)?,
            OutputFormat::Markdown => report::generate_markdown_report(&report),
        };

        std::fs::write(output, &content)
            .with_context(|| format!("Failed to write report to {}", output.display()))?;
        println!("\n📝 Report saved to: {}", output.display());
    }

    println!("\n   Duration: {:.1}s", duration);

    if session.error.is_some() {
        return Ok(2);
    }

    Ok(0)
}

fn build_report(
    session: &orchestrator::Session,
    steps: Vec<AnalysisStep>,
    payloads: std::collections::BTreeMap<AnalysisStep, Value>,
    duration: f64,
) -> Report {
    Report {
        metadata: ReportMetadata {
            brand_name: session.brand_name.clone(),
            generated_at: Utc::now(),
            steps_requested: orchestrator::runner::plan(&steps),
            steps_completed: session.completed_steps(),
            duration_seconds: duration,
        },
        competitors: session.competitors.clone(),
        error: session.error.clone(),
        refresh_failures: session.refresh_failures,
        payloads,
    }
}

/// Handle --dry-run: print the endpoint table, exit.
fn handle_dry_run(endpoints: &Endpoints, steps: &[AnalysisStep]) -> Result<i32> {
    println!("\n🔍 Dry run: resolved endpoints (no requests)...\n");

    for (step, route) in endpoints.iter() {
        let marker = if steps.contains(step) { "▶️ " } else { "  " };
        match route.base_url {
            Some(ref base) => println!(
                "   {} {:<14} POST {}{}  [{}]",
                marker, step.name(), base, route.path, route.source
            ),
            None => println!(
                "   {} {:<14} not configured (set {})",
                marker,
                step.name(),
                step.env_var()
            ),
        }
    }

    println!("\n✅ Dry run complete. No requests were made.");
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
            info!("Loaded default config from .compscope.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

/// Shows one spinner per running step.
struct SpinnerObserver {
    multi: MultiProgress,
    bars: Mutex<HashMap<AnalysisStep, ProgressBar>>,
}

impl SpinnerObserver {
    fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }
}

impl StepObserver for SpinnerObserver {
    fn started(&self, step: AnalysisStep) {
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(format!("{}...", step.label()));
        bar.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut bars) = self.bars.lock() {
            bars.insert(step, bar);
        }
    }

    fn finished(&self, step: AnalysisStep, result: &Result<Value, StepError>) {
        let bar = match self.bars.lock() {
            Ok(mut bars) => bars.remove(&step),
            Err(_) => None,
        };
        let Some(bar) = bar else { return };

        match result {
            Ok(_) => bar.finish_with_message(format!("✅ {}", step.label())),
            Err(e) => bar.finish_with_message(format!("❌ {}: {}", step.label(), e)),
        }
    }

    fn skipped(&self, step: AnalysisStep) {
        let _ = self
            .multi
            .println(format!("⏭️  {} skipped (no competitors yet)", step.label()));
    }
}
