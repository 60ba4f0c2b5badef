//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::AnalysisStep;
use clap::Parser;
use std::path::PathBuf;

/// compscope - competitive analysis for loyalty and rewards programs
///
/// Finds a brand's competitors through the analysis backend, then runs
/// summary, rewards, positioning, feedback, SWOT and opportunity analyses
/// and renders the competitor cards.
///
/// Examples:
///   compscope --brand "Loyalty Co"
///   compscope --brand "Loyalty Co" --steps finder,swot --base-url localhost:8000
///   compscope --brand "Loyalty Co" --concurrent --format json --output report.json
///   compscope --dry-run
///   compscope --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Brand name to analyze
    ///
    /// Required by the finder step; other steps send it as-is.
    #[arg(short, long, value_name = "NAME", env = "COMPSCOPE_BRAND")]
    pub brand: Option<String>,

    /// Analysis steps to run (comma-separated)
    ///
    /// Finder always runs first when requested. Default: all steps.
    #[arg(
        short,
        long,
        value_name = "STEPS",
        value_delimiter = ',',
        default_value = "all"
    )]
    pub steps: Vec<StepArg>,

    /// Run non-finder steps concurrently
    #[arg(long)]
    pub concurrent: bool,

    /// Base URL used for every step without a more specific setting
    ///
    /// Per-step env vars (e.g. COMPETITOR_FINDER_URL) and the config file
    /// take precedence.
    #[arg(long, value_name = "URL", env = "COMPSCOPE_BASE_URL")]
    pub base_url: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .compscope.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write a report to this file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Report format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the resolved endpoint table and exit without any request
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .compscope.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Step selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StepArg {
    All,
    Finder,
    Summarizer,
    Rewards,
    Positioning,
    Feedback,
    Swot,
    #[value(name = "comp-summary", alias = "compSummary")]
    CompSummary,
    Opportunities,
}

/// Convert a single step selection to an analysis step.
fn step_arg_to_step(arg: StepArg) -> Option<AnalysisStep> {
    match arg {
        StepArg::All => None,
        StepArg::Finder => Some(AnalysisStep::Finder),
        StepArg::Summarizer => Some(AnalysisStep::Summarizer),
        StepArg::Rewards => Some(AnalysisStep::Rewards),
        StepArg::Positioning => Some(AnalysisStep::Positioning),
        StepArg::Feedback => Some(AnalysisStep::Feedback),
        StepArg::Swot => Some(AnalysisStep::Swot),
        StepArg::CompSummary => Some(AnalysisStep::CompSummary),
        StepArg::Opportunities => Some(AnalysisStep::Opportunities),
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Brand name, empty when not given.
    pub fn brand_name(&self) -> &str {
        self.brand.as_deref().unwrap_or("")
    }

    /// Steps to run, in the order given. `all` expands to every step.
    pub fn effective_steps(&self) -> Vec<AnalysisStep> {
        if self.steps.is_empty() || self.steps.contains(&StepArg::All) {
            return AnalysisStep::ALL.to_vec();
        }

        self.steps.iter().filter_map(|arg| step_arg_to_step(*arg)).collect()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Validate base URL scheme if one is given
        if let Some(ref base_url) = self.base_url {
            if base_url.contains("://")
                && !base_url.starts_with("http://")
                && !base_url.starts_with("https://")
            {
                return Err("Base URL must use 'http://' or 'https://'".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
