//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.compscope.toml` files, and resolving the per-step endpoint table
//! once at start-up.

use crate::error::StepError;
use crate::models::AnalysisStep;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Default config file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = ".compscope.toml";

/// Prefix the browser dashboard used for its public env vars.
const LEGACY_ENV_PREFIX: &str = "NEXT_PUBLIC_";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Base URLs per analysis step.
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// Path suffix overrides, keyed by step name.
    #[serde(default)]
    pub paths: BTreeMap<String, String>,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Run non-finder steps concurrently.
    #[serde(default)]
    pub concurrent: bool,
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Send `Accept: application/json` with every request.
    #[serde(default = "default_true")]
    pub accept_json: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            accept_json: true,
        }
    }
}

fn default_timeout() -> u64 {
    300 // analysis endpoints call an LLM and are slow
}

fn default_true() -> bool {
    true
}

/// Base URLs per step as written in the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Fallback base URL for steps with nothing more specific.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub finder: Option<String>,
    #[serde(default)]
    pub summarizer: Option<String>,
    #[serde(default)]
    pub rewards: Option<String>,
    #[serde(default)]
    pub positioning: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub swot: Option<String>,
    #[serde(default, rename = "compSummary")]
    pub comp_summary: Option<String>,
    #[serde(default)]
    pub opportunities: Option<String>,
}

impl EndpointsConfig {
    /// The base URL configured for a specific step, if any.
    pub fn for_step(&self, step: AnalysisStep) -> Option<&str> {
        let value = match step {
            AnalysisStep::Finder => &self.finder,
            AnalysisStep::Summarizer => &self.summarizer,
            AnalysisStep::Rewards => &self.rewards,
            AnalysisStep::Positioning => &self.positioning,
            AnalysisStep::Feedback => &self.feedback,
            AnalysisStep::Swot => &self.swot,
            AnalysisStep::CompSummary => &self.comp_summary,
            AnalysisStep::Opportunities => &self.opportunities,
        };
        value.as_deref()
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.compscope.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were explicitly provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(timeout) = args.timeout {
            self.http.timeout_seconds = timeout;
        }

        if let Some(ref base_url) = args.base_url {
            self.endpoints.base_url = Some(base_url.clone());
        }

        if args.concurrent {
            self.general.concurrent = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

/// Where a step's base URL came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlSource {
    Env(String),
    ConfigFile,
    SharedBase,
    Unset,
}

impl fmt::Display for UrlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlSource::Env(name) => write!(f, "env {}", name),
            UrlSource::ConfigFile => write!(f, "config [endpoints]"),
            UrlSource::SharedBase => write!(f, "shared base URL"),
            UrlSource::Unset => write!(f, "unset"),
        }
    }
}

/// Resolved target of one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub base_url: Option<String>,
    pub path: String,
    pub source: UrlSource,
}

/// The endpoint table, resolved once and handed to the orchestrator.
#[derive(Debug, Clone)]
pub struct Endpoints {
    routes: BTreeMap<AnalysisStep, Route>,
}

impl Endpoints {
    /// Resolve every step against the process environment.
    pub fn from_environment(config: &Config) -> Self {
        Self::resolve(config, |name| std::env::var(name).ok())
    }

    /// Resolve every step using `lookup` for environment variables.
    ///
    /// Precedence: `<VAR>`, then `NEXT_PUBLIC_<VAR>`, then `[endpoints]`,
    /// then `[endpoints] base_url`.
    pub fn resolve<F>(config: &Config, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in config.paths.keys() {
            if key.parse::<AnalysisStep>().is_err() {
                warn!("Ignoring path override for unknown step '{}'", key);
            }
        }

        let shared = config
            .endpoints
            .base_url
            .as_deref()
            .and_then(normalize_base_url);

        let routes = AnalysisStep::ALL
            .into_iter()
            .map(|step| {
                let env_var = step.env_var();
                let legacy_var = format!("{}{}", LEGACY_ENV_PREFIX, env_var);

                let (base_url, source) = if let Some(url) =
                    lookup(env_var).as_deref().and_then(normalize_base_url)
                {
                    (Some(url), UrlSource::Env(env_var.to_string()))
                } else if let Some(url) =
                    lookup(&legacy_var).as_deref().and_then(normalize_base_url)
                {
                    (Some(url), UrlSource::Env(legacy_var))
                } else if let Some(url) = config
                    .endpoints
                    .for_step(step)
                    .and_then(normalize_base_url)
                {
                    (Some(url), UrlSource::ConfigFile)
                } else if let Some(ref url) = shared {
                    (Some(url.clone()), UrlSource::SharedBase)
                } else {
                    (None, UrlSource::Unset)
                };

                let path = config
                    .paths
                    .iter()
                    .find(|(key, _)| key.parse::<AnalysisStep>() == Ok(step))
                    .map(|(_, path)| normalize_path(path))
                    .unwrap_or_else(|| step.default_path().to_string());

                debug!("Resolved {} -> {:?}{} ({})", step, base_url, path, source);
                (step, Route { base_url, path, source })
            })
            .collect();

        Self { routes }
    }

    /// Routing entry for a step.
    pub fn route(&self, step: AnalysisStep) -> Option<&Route> {
        self.routes.get(&step)
    }

    /// Full request URL for a step.
    pub fn url_for(&self, step: AnalysisStep) -> std::result::Result<String, StepError> {
        match self.route(step) {
            Some(Route {
                base_url: Some(base),
                path,
                ..
            }) => Ok(format!("{}{}", base, path)),
            _ => Err(StepError::NotConfigured {
                env_var: step.env_var(),
            }),
        }
    }

    /// Steps that have a base URL.
    pub fn configured_steps(&self) -> Vec<AnalysisStep> {
        self.routes
            .iter()
            .filter(|(_, route)| route.base_url.is_some())
            .map(|(step, _)| *step)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AnalysisStep, &Route)> {
        self.routes.iter()
    }
}

/// Normalize a base URL: trim, drop trailing slashes, add a scheme if missing.
///
/// Returns `None` for blank input.
pub fn normalize_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.contains("://") {
        return Some(trimmed.to_string());
    }

    let host = trimmed
        .split(|c| c == ':' || c == '/')
        .next()
        .unwrap_or_default();
    let is_local = host.eq_ignore_ascii_case("localhost") || host == "127.0.0.1";
    let scheme = if is_local { "http" } else { "https" };
    Some(format!("{}://{}", scheme, trimmed))
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}
