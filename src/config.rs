use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::cli::{
    Cli, DEFAULT_MAX_PAGES, DEFAULT_OUTPUT_DIR, DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS,
};
use crate::http_client::DEFAULT_USER_AGENT;

/// Configuration file structure that mirrors CLI arguments
/// All fields are optional to allow partial configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Maximum number of pages to crawl
    pub max_pages: Option<usize>,

    /// Only enqueue links on the start URL's host
    pub same_domain: Option<bool>,

    /// Number of concurrent status checks
    pub workers: Option<usize>,

    /// Per-request timeout in seconds
    pub timeout: Option<u64>,

    /// Directory the report files are written to
    pub output_dir: Option<String>,

    /// User-Agent header override
    pub user_agent: Option<String>,

    /// Save the full audit as JSON
    pub save: Option<String>,

    /// Verbose output
    pub verbose: Option<bool>,
}

/// Configuration file format based on file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
    Yaml,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                "toml" => Some(ConfigFormat::Toml),
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                _ => None,
            })
    }

    /// Get file extensions for this format
    pub fn extensions(&self) -> &[&str] {
        match self {
            ConfigFormat::Json => &["json"],
            ConfigFormat::Toml => &["toml"],
            ConfigFormat::Yaml => &["yaml", "yml"],
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let format = ConfigFormat::from_path(path)
            .with_context(|| format!("Unsupported config file format: {}", path.display()))?;

        let config = match format {
            ConfigFormat::Json => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?,
            ConfigFormat::Toml => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?,
            ConfigFormat::Yaml => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?,
        };

        Ok(config)
    }

    /// Default configuration file paths in priority order:
    /// current directory first, then the user config directory
    pub fn default_paths() -> Vec<PathBuf> {
        let formats = [ConfigFormat::Json, ConfigFormat::Toml, ConfigFormat::Yaml];
        let mut paths = Vec::new();

        for format in &formats {
            for ext in format.extensions() {
                paths.push(PathBuf::from(format!("auditor.{}", ext)));
            }
        }

        // XDG_CONFIG_HOME if set and non-empty, otherwise ~/.config
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .ok()
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")));

        if let Some(config_home) = config_home {
            let auditor_dir = config_home.join("auditor");
            for format in &formats {
                for ext in format.extensions() {
                    paths.push(auditor_dir.join(format!("config.{}", ext)));
                }
            }
        }

        paths
    }

    /// Returns the first configuration file found, or None if no config exists
    pub fn from_default_paths() -> Result<Option<Self>> {
        for path in Self::default_paths() {
            if path.exists() {
                return Ok(Some(Self::from_file(&path)?));
            }
        }
        Ok(None)
    }

    /// Loads the explicit `--config` file if given, otherwise the first default path
    pub fn load(explicit: Option<&str>) -> Result<Option<Self>> {
        match explicit {
            Some(path) => Self::from_file(Path::new(path)).map(Some),
            None => Self::from_default_paths(),
        }
    }

    /// Merge this configuration with CLI arguments
    /// CLI arguments take precedence over config file values
    pub fn merge_with_cli(&self, cli: &Cli) -> Cli {
        Cli {
            start: cli.start.clone(),
            max_pages: if cli.max_pages != DEFAULT_MAX_PAGES {
                cli.max_pages
            } else {
                self.max_pages.unwrap_or(cli.max_pages)
            },
            same_domain: cli.same_domain || self.same_domain.unwrap_or(false),
            workers: if cli.workers != DEFAULT_WORKERS {
                cli.workers
            } else {
                self.workers.unwrap_or(cli.workers)
            },
            timeout: if cli.timeout != DEFAULT_TIMEOUT_SECS {
                cli.timeout
            } else {
                self.timeout.unwrap_or(cli.timeout)
            },
            output_dir: if cli.output_dir != DEFAULT_OUTPUT_DIR {
                cli.output_dir.clone()
            } else {
                self.output_dir
                    .clone()
                    .unwrap_or_else(|| cli.output_dir.clone())
            },
            user_agent: cli.user_agent.clone().or_else(|| self.user_agent.clone()),
            save: cli.save.clone().or_else(|| self.save.clone()),
            verbose: cli.verbose || self.verbose.unwrap_or(false),
            config: cli.config.clone(),
        }
    }
}

/// Resolved settings handed to every component constructor.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub start_url: Url,
    pub max_pages: usize,
    pub same_domain_only: bool,
    pub timeout: Duration,
    pub worker_count: usize,
    pub user_agent: String,
    pub output_dir: PathBuf,
}

impl AuditConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let start = cli.start.trim();
        if !start.starts_with("http://") && !start.starts_with("https://") {
            bail!("Start URL must include scheme (http:// or https://), e.g. https://example.com");
        }

        let mut start_url = Url::parse(start).context("Invalid start URL")?;
        if start_url.host_str().is_none() {
            bail!("Start URL has no host: {}", start);
        }
        start_url.set_fragment(None);

        Ok(Self {
            start_url,
            max_pages: cli.max_pages,
            same_domain_only: cli.same_domain,
            timeout: Duration::from_secs(cli.timeout.max(1)),
            worker_count: cli.workers.max(1),
            user_agent: cli
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            output_dir: PathBuf::from(&cli.output_dir),
        })
    }

    /// Defaults for a start URL, mostly useful in tests.
    pub fn for_start(start: &str) -> Result<Self> {
        Self::from_cli(&Cli {
            start: start.to_string(),
            max_pages: DEFAULT_MAX_PAGES,
            same_domain: false,
            workers: DEFAULT_WORKERS,
            timeout: DEFAULT_TIMEOUT_SECS,
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            user_agent: None,
            save: None,
            verbose: false,
            config: None,
        })
    }
}
