//! Configuration for veritas.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (VERITAS_HOME, VERITAS_API_KEY / OPENAI_API_KEY,
//!    VERITAS_ORACLE_URL)
//! 2. Config file (.veritas/config.yaml)
//! 3. Defaults (~/.veritas)
//!
//! Config file discovery:
//! - Searches current directory and parents for .veritas/config.yaml
//! - Paths in config file are relative to the .veritas/ directory

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::Identity;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
const DEFAULT_MAX_INPUT_CHARS: usize = 5000;

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub oracle: Option<OracleConfig>,
    #[serde(default)]
    pub identity: Option<Identity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Archive directory (relative to the .veritas/ directory)
    pub home: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OracleConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub max_input_chars: Option<usize>,
}

/// Resolved oracle settings
#[derive(Clone)]
pub struct OracleSettings {
    pub endpoint: String,
    pub model: String,
    pub timeout_seconds: u64,
    /// Only this many leading characters are sent for analysis
    pub max_input_chars: usize,
    pub api_key: Option<String>,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            api_key: None,
        }
    }
}

impl std::fmt::Debug for OracleSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleSettings")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("max_input_chars", &self.max_input_chars)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl OracleSettings {
    fn from_file(config: Option<&OracleConfig>) -> Self {
        let defaults = Self::default();
        let Some(config) = config else {
            return defaults;
        };

        Self {
            endpoint: config.endpoint.clone().unwrap_or(defaults.endpoint),
            model: config.model.clone().unwrap_or(defaults.model),
            timeout_seconds: config.timeout_seconds.unwrap_or(defaults.timeout_seconds),
            max_input_chars: config.max_input_chars.unwrap_or(defaults.max_input_chars),
            api_key: None,
        }
    }

    /// Apply environment overrides
    fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var("VERITAS_ORACLE_URL") {
            self.endpoint = url;
        }
        self.api_key = std::env::var("VERITAS_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|k| !k.trim().is_empty());
        self
    }
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Archive directory
    pub home: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Oracle settings
    pub oracle: OracleSettings,
    /// Acting identity
    pub identity: Identity,
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".veritas").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".veritas");

    let config_file = find_config_file();
    let parsed = config_file.as_deref().map(load_config_file).transpose()?;

    let home = if let Ok(env_home) = std::env::var("VERITAS_HOME") {
        PathBuf::from(env_home)
    } else if let (Some(config), Some(config_path)) = (&parsed, &config_file) {
        match &config.paths.home {
            Some(home_path) => {
                let veritas_dir = config_path.parent().unwrap_or(Path::new("."));
                resolve_path(veritas_dir, home_path)
            }
            None => default_home,
        }
    } else {
        default_home
    };

    let oracle = OracleSettings::from_file(parsed.as_ref().and_then(|c| c.oracle.as_ref())).with_env();
    let identity = parsed
        .as_ref()
        .and_then(|c| c.identity.clone())
        .unwrap_or_default();

    Ok(ResolvedConfig {
        home,
        config_file,
        oracle,
        identity,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Get the archive directory
pub fn veritas_home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}
