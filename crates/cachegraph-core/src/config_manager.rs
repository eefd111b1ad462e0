use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::cache_config::CacheDefaults;

/// Providers the generator can dispatch to.
pub const SUPPORTED_LLM_PROVIDERS: &[&str] = &["anthropic", "openai", "google", "xai"];

/// Alternative names accepted for a provider.
pub const LLM_PROVIDER_ALIASES: &[(&str, &str)] =
    &[("claude", "anthropic"), ("gemini", "google"), ("grok", "xai")];

/// Canonical provider name for `name` or one of its aliases, case-insensitive.
pub fn canonical_llm_provider(name: &str) -> Option<&'static str> {
    let lowered = name.trim().to_lowercase();
    SUPPORTED_LLM_PROVIDERS
        .iter()
        .copied()
        .find(|p| *p == lowered)
        .or_else(|| {
            LLM_PROVIDER_ALIASES
                .iter()
                .find(|(alias, _)| *alias == lowered)
                .map(|(_, canonical)| *canonical)
        })
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration for CacheGraph
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheGraphConfig {
    /// LLM configuration for AI-assisted rule generation
    #[serde(default)]
    pub llm: LLMConfig,

    /// Schema introspection settings
    #[serde(default)]
    pub introspection: IntrospectionConfig,

    /// Output document settings
    #[serde(default)]
    pub generation: GenerationSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    /// LLM provider: "anthropic", "openai", "google", "xai"
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// Model identifier, provider default when unset
    #[serde(default)]
    pub model: Option<String>,

    /// Anthropic API key
    #[serde(default)]
    pub anthropic_api_key: Option<String>,

    /// OpenAI API key
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Google Gemini API key
    #[serde(default)]
    pub google_api_key: Option<String>,

    /// xAI API key
    #[serde(default)]
    pub xai_api_key: Option<String>,

    /// Temperature for generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Request timeout in seconds
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl LLMConfig {
    /// The API key configured for `provider`, if any.
    pub fn api_key_for(&self, provider: &str) -> Option<&str> {
        match provider {
            "anthropic" => self.anthropic_api_key.as_deref(),
            "openai" => self.openai_api_key.as_deref(),
            "google" => self.google_api_key.as_deref(),
            "xai" => self.xai_api_key.as_deref(),
            _ => None,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: None,
            anthropic_api_key: None,
            openai_api_key: None,
            google_api_key: None,
            xai_api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

/// Introspection endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionConfig {
    /// GraphQL endpoint URL
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_introspection_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra request headers (e.g. Authorization)
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for IntrospectionConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_introspection_timeout_secs(),
            headers: BTreeMap::new(),
        }
    }
}

/// Settings for the produced cache-config document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Name written into the document
    #[serde(default = "default_config_name")]
    pub name: String,

    /// Fallback policy for types no rule covers
    #[serde(default)]
    pub defaults: CacheDefaults,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            name: default_config_name(),
            defaults: CacheDefaults::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "pretty", "json", "compact"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Default value functions
fn default_llm_provider() -> String {
    "anthropic".to_string()
}
fn default_temperature() -> f32 {
    0.1
}
fn default_max_tokens() -> usize {
    4096
}
fn default_llm_timeout_secs() -> u64 {
    120
}
fn default_introspection_timeout_secs() -> u64 {
    30
}
fn default_config_name() -> String {
    "graphql-cache".to_string()
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

/// Configuration manager with layered sources
pub struct ConfigManager {
    config: CacheGraphConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (.env file)
    /// 2. Config file (.cachegraph.toml)
    /// 3. Sensible defaults
    pub fn load() -> Result<Self, ConfigError> {
        info!("Loading CacheGraph configuration");

        Self::load_dotenv();

        let (config, config_path) = Self::load_config_file()?;
        let config = Self::apply_env_overrides(config);
        Self::validate_config(&config)?;

        match &config_path {
            Some(path) => info!("Config file: {}", path.display()),
            None => info!("Config file: NONE (using defaults)"),
        }
        info!(
            provider = %config.llm.provider,
            endpoint = ?config.introspection.endpoint,
            "Configuration loaded"
        );

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Load an explicit TOML file, still applying env overrides and validation.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let config = Self::apply_env_overrides(Self::read_toml_file(path)?);
        Self::validate_config(&config)?;
        Ok(Self {
            config,
            config_path: Some(path.to_path_buf()),
        })
    }

    /// Load .env file if it exists
    fn load_dotenv() {
        if Path::new(".env").exists() {
            if let Err(e) = dotenv::from_filename(".env") {
                warn!("Failed to load .env file: {}", e);
            } else {
                info!("Loaded .env file from current directory");
            }
            return;
        }

        if let Some(home) = dirs::home_dir() {
            let home_env = home.join(".cachegraph.env");
            if home_env.exists() {
                if let Err(e) = dotenv::from_path(&home_env) {
                    warn!("Failed to load .cachegraph.env: {}", e);
                } else {
                    info!("Loaded .cachegraph.env from home directory");
                }
            }
        }
    }

    /// Search order:
    /// 1. ./.cachegraph.toml (current directory)
    /// 2. ~/.cachegraph/config.toml (user config)
    /// 3. Use defaults
    fn load_config_file() -> Result<(CacheGraphConfig, Option<PathBuf>), ConfigError> {
        let local_config = Path::new(".cachegraph.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".cachegraph").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        info!("No config file found, using defaults");
        Ok((CacheGraphConfig::default(), None))
    }

    fn read_toml_file(path: &Path) -> Result<CacheGraphConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: CacheGraphConfig) -> CacheGraphConfig {
        if let Ok(provider) = std::env::var("CACHEGRAPH_LLM_PROVIDER") {
            config.llm.provider = provider.to_lowercase();
        }
        if let Ok(model) = std::env::var("CACHEGRAPH_MODEL") {
            config.llm.model = Some(model);
        }
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            config.llm.anthropic_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            config.llm.openai_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("GOOGLE_API_KEY") {
            config.llm.google_api_key = Some(key);
        }
        if let Ok(key) = std::env::var("XAI_API_KEY") {
            config.llm.xai_api_key = Some(key);
        }
        if let Ok(temp) = std::env::var("CACHEGRAPH_TEMPERATURE") {
            if let Ok(t) = temp.parse() {
                config.llm.temperature = t;
            }
        }

        if let Ok(endpoint) = std::env::var("CACHEGRAPH_ENDPOINT") {
            config.introspection.endpoint = Some(endpoint);
        }
        if let Ok(timeout) = std::env::var("CACHEGRAPH_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                config.introspection.timeout_secs = secs;
            }
        }

        // Only a bare level is taken; directive lists stay with the subscriber.
        if let Ok(level) = std::env::var("RUST_LOG") {
            let level = level.trim().to_lowercase();
            if matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
                config.logging.level = level;
            }
        }

        if let Some(canonical) = canonical_llm_provider(&config.llm.provider) {
            config.llm.provider = canonical.to_string();
        }

        config
    }

    /// Validate configuration
    fn validate_config(config: &CacheGraphConfig) -> Result<(), ConfigError> {
        if canonical_llm_provider(&config.llm.provider).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "Invalid LLM provider: {}. Must be one of: {}",
                config.llm.provider,
                SUPPORTED_LLM_PROVIDERS.join(", ")
            )));
        }

        if !(0.0..=2.0).contains(&config.llm.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "Invalid temperature: {}. Must be between 0.0 and 2.0",
                config.llm.temperature
            )));
        }

        match config.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    other
                )))
            }
        }

        Ok(())
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &CacheGraphConfig {
        &self.config
    }

    /// Get the path to the config file that was loaded, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Create a default config file
    pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let config = CacheGraphConfig::default();
        let toml_str =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::ReadError(e.to_string()))?;
        }

        std::fs::write(path, toml_str).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Ok(())
    }
}
