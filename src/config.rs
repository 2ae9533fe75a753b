//! Configuration system for CardForge
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (CARDFORGE_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::backend::GenerationParams;
use crate::error::{Error, Result};
use crate::storage::DEFAULT_MAX_CARDS;

/// Upper bound on `[model].max_retries`
pub const MAX_RETRIES: u32 = 10;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    /// Model endpoint connection settings
    pub model: ModelSettings,

    /// Feature extraction (vision) call settings
    pub vision: VisionSettings,

    /// Per-persona generation call settings
    pub generation: GenerationSettings,

    /// Persona panel source
    pub personas: PersonaSettings,

    /// Card collection storage
    pub storage: StorageSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// OpenAI-compatible endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// API base URL (e.g., "https://api.openai.com/v1", "http://localhost:11434/v1")
    pub base_url: String,

    /// API key (empty string for local servers like Ollama)
    pub api_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Maximum retries on transient failures
    pub max_retries: u32,
}

/// Vision call settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionSettings {
    /// Vision-capable model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Output length cap
    pub max_tokens: u32,
}

/// Generation call settings, shared by all four personas
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Text model identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Output length cap
    pub max_tokens: u32,
}

/// Persona panel settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaSettings {
    /// Persona file replacing the bundled panel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Collection storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Base data directory
    pub data_dir: String,

    /// Collection file name inside `data_dir`
    pub collection_file: String,

    /// Maximum cards kept; the oldest are evicted beyond this
    pub max_cards: usize,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB before rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

// Default implementations

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            timeout_secs: 60,
            max_retries: 2,
        }
    }
}

impl Default for VisionSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_tokens: 500,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.9,
            max_tokens: 300,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.cardforge".to_string(),
            collection_file: "collection.json".to_string(),
            max_cards: DEFAULT_MAX_CARDS,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl VisionSettings {
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

impl GenerationSettings {
    pub fn params(&self) -> GenerationParams {
        GenerationParams {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

impl ForgeConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                path: path.clone(),
                source: e,
            })?;
            config = toml::from_str(&content).map_err(|e| Error::ConfigParse {
                message: format!("{}: {}", path.display(), e.message()),
                source: Some(e),
            })?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides();

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            return if path.exists() {
                Ok(Some(path))
            } else {
                Err(Error::ConfigNotFound { path })
            };
        }

        let search_paths = [
            PathBuf::from("cardforge.toml"),
            dirs::config_dir()
                .map(|p| p.join("cardforge").join("config.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".cardforge").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &search_paths {
            if !path.as_os_str().is_empty() && path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Model endpoint
        if let Ok(val) = std::env::var("CARDFORGE_BASE_URL") {
            self.model.base_url = val;
        }
        if let Ok(val) = std::env::var("CARDFORGE_API_KEY") {
            self.model.api_key = val;
        } else if self.model.api_key.is_empty() {
            if let Ok(val) = std::env::var("OPENAI_API_KEY") {
                self.model.api_key = val;
            }
        }
        if let Ok(val) = std::env::var("CARDFORGE_TIMEOUT_SECS") {
            if let Ok(n) = val.parse() {
                self.model.timeout_secs = n;
            }
        }
        if let Ok(val) = std::env::var("CARDFORGE_MAX_RETRIES") {
            if let Ok(n) = val.parse() {
                self.model.max_retries = n;
            }
        }

        // Models
        if let Ok(val) = std::env::var("CARDFORGE_VISION_MODEL") {
            self.vision.model = val;
        }
        if let Ok(val) = std::env::var("CARDFORGE_GENERATION_MODEL") {
            self.generation.model = val;
        }
        if let Ok(val) = std::env::var("CARDFORGE_TEMPERATURE") {
            if let Ok(n) = val.parse() {
                self.generation.temperature = n;
            }
        }

        // Personas
        if let Ok(val) = std::env::var("CARDFORGE_PERSONA_FILE") {
            self.personas.file = Some(val);
        }

        // Storage
        if let Ok(val) = std::env::var("CARDFORGE_DATA_DIR") {
            self.storage.data_dir = val;
        }
        if let Ok(val) = std::env::var("CARDFORGE_MAX_CARDS") {
            if let Ok(n) = val.parse() {
                self.storage.max_cards = n;
            }
        }

        // Logging
        if let Ok(val) = std::env::var("CARDFORGE_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("CARDFORGE_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("CARDFORGE_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        self.storage.data_dir = expand_path(&self.storage.data_dir);

        if let Some(ref file) = self.personas.file {
            self.personas.file = Some(expand_path(file));
        }
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.model.base_url).map_err(|e| {
            Error::config_field_invalid("model.base_url", format!("not a valid URL: {}", e))
        })?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(Error::config_field_invalid(
                "model.base_url",
                "must start with http:// or https://",
            ));
        }

        for (field, model, temperature, max_tokens) in [
            ("vision", &self.vision.model, self.vision.temperature, self.vision.max_tokens),
            (
                "generation",
                &self.generation.model,
                self.generation.temperature,
                self.generation.max_tokens,
            ),
        ] {
            if model.trim().is_empty() {
                return Err(Error::config_field_invalid(
                    format!("{}.model", field),
                    "model identifier cannot be empty",
                ));
            }
            if !(0.0..=2.0).contains(&temperature) {
                return Err(Error::config_field_invalid(
                    format!("{}.temperature", field),
                    "temperature must be between 0.0 and 2.0",
                ));
            }
            if max_tokens == 0 {
                return Err(Error::config_field_invalid(
                    format!("{}.max_tokens", field),
                    "max_tokens must be greater than 0",
                ));
            }
        }

        if self.model.max_retries > MAX_RETRIES {
            return Err(Error::config_field_invalid(
                "model.max_retries",
                format!("max_retries must be at most {}", MAX_RETRIES),
            ));
        }

        if self.storage.max_cards == 0 {
            return Err(Error::config_field_invalid(
                "storage.max_cards",
                "max_cards must be greater than 0",
            ));
        }
        if self.storage.collection_file.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "storage.collection_file",
                "collection file name cannot be empty",
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Full path of the collection file
    pub fn collection_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join(&self.storage.collection_file)
    }
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or(std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file, returning where it was written
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".cardforge")
                .join("config.toml")
        });

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(&config_path, generate_default_config()).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    Ok(config_path)
}

/// Generate default configuration content with comments
fn generate_default_config() -> String {
    r#"# CardForge Configuration

[model]
# OpenAI-compatible API base URL (OpenAI, Ollama, vLLM, LM Studio, etc.)
base_url = "https://api.openai.com/v1"

# API key (leave empty for local servers; OPENAI_API_KEY is also honoured)
api_key = ""

# Request timeout in seconds
timeout_secs = 60

# Retries on transient failures (429, 5xx, connection errors)
max_retries = 2

[vision]
# Vision-capable model used once per card to extract features
model = "gpt-4o-mini"
temperature = 0.2
max_tokens = 500

[generation]
# Text model used by each of the four personas
model = "gpt-4o-mini"
temperature = 0.9
max_tokens = 300

[personas]
# Replace the bundled panel with your own (exactly four personas)
# file = "~/.cardforge/personas.toml"

[storage]
# Base data directory
data_dir = "~/.cardforge"

# Collection file inside data_dir
collection_file = "collection.json"

# Cards kept in the collection; the oldest are dropped beyond this
max_cards = 100

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.cardforge/logs/cardforge.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}
