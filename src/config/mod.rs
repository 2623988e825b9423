//! Configuration management.
//!
//! Settings are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. a TOML file: `--config <path>`, otherwise
//!    `<config dir>/arxiv-paper/config.toml` if it exists
//! 3. environment variables `ARXIV_PAPER_<SECTION>__<KEY>`, e.g.
//!    `ARXIV_PAPER_DOWNLOADS__OUTPUT_DIR=./papers`
//! 4. command-line flags (applied by the binary)
//!
//! ```toml
//! [api]
//! url = "http://export.arxiv.org/api/query"
//! user_agent = "arxiv-paper/0.1.0"
//! timeout_secs = 60
//!
//! [search]
//! max_results = 50
//! sort_by = "lastUpdatedDate"
//! sort_order = "descending"
//!
//! [downloads]
//! output_dir = "."
//! filename_template = "{pub}-{auth}-{title}-{id}"
//! non_pdf = "prompt"          # or "auto-remove", "auto-keep"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::download::NonPdfPolicy;
use crate::models::{SortBy, SortOrder};
use crate::sources::ARXIV_API_URL;
use crate::utils::{DEFAULT_TEMPLATE, DEFAULT_USER_AGENT};

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "ARXIV_PAPER";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub downloads: DownloadConfig,
}

/// API endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout; requests wait indefinitely when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            user_agent: default_user_agent(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_api_url() -> String {
    ARXIV_API_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Default query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    #[serde(default)]
    pub sort_by: SortBy,

    #[serde(default)]
    pub sort_order: SortOrder,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
        }
    }
}

fn default_max_results() -> usize {
    50
}

/// Download settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_template")]
    pub filename_template: String,

    #[serde(default)]
    pub non_pdf: NonPdfPolicy,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            filename_template: default_template(),
            non_pdf: NonPdfPolicy::default(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

/// Default location of the configuration file, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("arxiv-paper").join("config.toml"))
}

/// Find a configuration file in the default location
pub fn find_config_file() -> Option<PathBuf> {
    default_config_path().filter(|path| path.is_file())
}

/// Load configuration from an explicit file (required) or the default location (optional),
/// then apply environment overrides.
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();

    match path {
        Some(path) => {
            builder = builder.add_source(config::File::from(path));
        }
        None => {
            if let Some(path) = find_config_file() {
                tracing::debug!("using config file {}", path.display());
                builder = builder.add_source(config::File::from(path).required(false));
            }
        }
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
