use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::paths;

/// Endpoint used when neither the CLI, the environment nor the config file set one.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding the endpoint.
pub const ENDPOINT_ENV: &str = "COACH_ENDPOINT";

/// Environment variable overriding the employee identifier.
pub const EMPLOYEE_ID_ENV: &str = "COACH_EMPLOYEE_ID";

/// Settings in the `[coach]` section of config.toml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoachConfig {
    /// Base URL of the assistant backend.
    pub endpoint: Option<String>,
    /// Employee the conversation is held for.
    pub employee_id: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// API key stored directly in config (not recommended).
    #[serde(default)]
    pub api_key: Option<String>,
    /// Environment variable name containing the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

impl CoachConfig {
    /// Gets the API key, preferring the environment variable over the config file.
    pub fn get_api_key(&self) -> Option<String> {
        if let Some(env_var) = &self.api_key_env
            && let Ok(key) = std::env::var(env_var)
            && !key.is_empty()
        {
            return Some(key);
        }
        self.api_key.clone()
    }
}

/// The complete configuration file structure.
///
/// Corresponds to `~/.config/coach/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub coach: CoachConfig,
}

/// Configuration after merging CLI arguments, environment and config file.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Base URL of the assistant backend.
    pub endpoint: Url,
    /// Employee identifier; empty when none was configured anywhere.
    pub employee_id: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Bearer token sent with each request, if any.
    pub api_key: Option<String>,
}

/// CLI overrides that take precedence over every other source.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    pub endpoint: Option<String>,
    pub employee_id: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Resolves configuration from CLI options, environment and config file.
///
/// Priority: CLI > environment > config file > built-in default. A missing
/// employee identifier is not an error here; the conversation reports it.
///
/// # Errors
///
/// Returns an error if the endpoint is not an http(s) URL or the timeout is zero.
pub fn resolve_config(options: &ResolveOptions, config_file: &ConfigFile) -> Result<ResolvedConfig> {
    let endpoint = options
        .endpoint
        .clone()
        .or_else(|| env_value(ENDPOINT_ENV))
        .or_else(|| config_file.coach.endpoint.clone())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    let endpoint = parse_endpoint(&endpoint)?;

    let employee_id = options
        .employee_id
        .clone()
        .or_else(|| env_value(EMPLOYEE_ID_ENV))
        .or_else(|| config_file.coach.employee_id.clone())
        .map(|id| id.trim().to_string())
        .unwrap_or_default();

    let timeout_secs = options
        .timeout_secs
        .or(config_file.coach.timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        bail!(
            "Invalid configuration: 'timeout_secs' must be greater than zero\n\n\
             Fix it via:\n  \
             - CLI option: coach --timeout <seconds>\n  \
             - Config file: ~/.config/coach/config.toml"
        );
    }

    Ok(ResolvedConfig {
        endpoint,
        employee_id,
        timeout: Duration::from_secs(timeout_secs),
        api_key: config_file.coach.get_api_key(),
    })
}

/// Parses an endpoint string, accepting only http and https URLs.
pub fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| {
        format!(
            "Invalid endpoint URL: '{raw}'\n\n\
             Expected something like {DEFAULT_ENDPOINT}"
        )
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        bail!(
            "Invalid endpoint URL: '{raw}'\n\n\
             Only http and https endpoints are supported"
        );
    }

    Ok(url)
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Manages loading and saving configuration files.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Creates a new config manager.
    ///
    /// Configuration is stored at `$XDG_CONFIG_HOME/coach/config.toml`
    /// or `~/.config/coach/config.toml` if `XDG_CONFIG_HOME` is not set.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: paths::config_dir()?.join("config.toml"),
        })
    }

    pub const fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    pub fn load(&self) -> Result<ConfigFile> {
        let contents = fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        let config_file: ConfigFile =
            toml::from_str(&contents).with_context(|| "Failed to parse config file")?;

        Ok(config_file)
    }

    pub fn save(&self, config: &ConfigFile) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, contents).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;

        Ok(())
    }

    /// Loads the config file, treating a missing file as empty.
    ///
    /// A file that exists but cannot be parsed is still an error.
    pub fn load_or_default(&self) -> Result<ConfigFile> {
        if self.config_path.exists() {
            self.load()
        } else {
            Ok(ConfigFile::default())
        }
    }
}
