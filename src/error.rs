//! Error types for CardForge
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Retryable / fatal classification
//! - Exit codes for CLI

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::Responsibility;

/// Result type alias for CardForge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoNotFound = 203,
    ImageLoad = 210,
    Serialization = 220,

    // Model transport errors (3xx)
    ModelRequest = 300,
    ModelUnavailable = 301,

    // Vision errors (4xx)
    VisionFailure = 400,

    // Persona configuration errors (5xx)
    PersonaConfig = 500,

    // Generation errors (6xx)
    GenerationFailure = 600,

    // Integration errors (7xx)
    Integration = 700,

    // Storage errors (8xx)
    Storage = 800,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10,
            200..=299 => 20,
            300..=399 => 30,
            400..=499 => 40,
            500..=599 => 50,
            600..=699 => 60,
            700..=799 => 70,
            800..=899 => 80,
            900..=999 => 90,
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image could not be read or is not a supported format
    #[error("Cannot use image {path}: {message}")]
    ImageLoad { path: PathBuf, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // Model Transport Errors
    // ─────────────────────────────────────────────────────────────

    /// A call to the model endpoint failed
    #[error("Model request failed: {message}")]
    ModelRequest { message: String, retryable: bool },

    // ─────────────────────────────────────────────────────────────
    // Pipeline Errors
    // ─────────────────────────────────────────────────────────────

    /// Feature extraction failed; the whole attempt is aborted
    #[error("Feature extraction failed: {message}")]
    VisionFailure { message: String, retryable: bool },

    /// The persona set violates its invariant
    #[error("Invalid persona configuration: {message}")]
    PersonaConfig {
        message: String,
        persona: Option<String>,
    },

    /// One persona's generation or parse failed
    #[error("Generation failed for {persona_id} ({responsibility}): {message}")]
    GenerationFailure {
        responsibility: Responsibility,
        persona_id: String,
        message: String,
    },

    /// Structurally invalid input to the merge step
    #[error("Card integration failed: {message}")]
    Integration { message: String },

    // ─────────────────────────────────────────────────────────────
    // Storage Errors
    // ─────────────────────────────────────────────────────────────

    #[error("Collection storage error at {path}: {message}")]
    Storage { path: PathBuf, message: String },

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::Config(_) => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                _ => ErrorCode::IoRead,
            },
            Error::ImageLoad { .. } => ErrorCode::ImageLoad,
            Error::Json(_) | Error::Toml(_) => ErrorCode::Serialization,

            Error::ModelRequest { retryable: true, .. } => ErrorCode::ModelUnavailable,
            Error::ModelRequest { .. } => ErrorCode::ModelRequest,

            Error::VisionFailure { .. } => ErrorCode::VisionFailure,
            Error::PersonaConfig { .. } => ErrorCode::PersonaConfig,
            Error::GenerationFailure { .. } => ErrorCode::GenerationFailure,
            Error::Integration { .. } => ErrorCode::Integration,

            Error::Storage { .. } => ErrorCode::Storage,
            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Check if the error is retryable by the caller
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::ModelRequest { retryable, .. } | Error::VisionFailure { retryable, .. } => {
                *retryable
            }
            Error::Io(_) | Error::IoRead { .. } | Error::IoWrite { .. } => true,
            _ => false,
        }
    }

    /// Check if the error prevents any card generation from starting
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ConfigNotFound { .. }
                | Error::ConfigParse { .. }
                | Error::ConfigValidation { .. }
                | Error::Config(_)
                | Error::PersonaConfig { .. }
                | Error::Internal(_)
        )
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'cardforge config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'cardforge config validate' to see details."
            ),
            Error::ConfigValidation { .. } | Error::Config(_) => Some(
                "Review the configuration file and fix the invalid values."
            ),
            Error::ImageLoad { .. } => Some(
                "Use a PNG, JPEG, WebP or GIF photo of a single object."
            ),
            Error::ModelRequest { retryable: true, .. } => Some(
                "The model endpoint is busy or unreachable. Try again in a moment."
            ),
            Error::ModelRequest { .. } => Some(
                "Check [model].base_url and [model].api_key in your configuration."
            ),
            Error::VisionFailure { .. } => Some(
                "The object could not be recognised. Upload a clearer photo and try again."
            ),
            Error::PersonaConfig { .. } => Some(
                "A persona file must define exactly four personas covering name, flavor, attribute and color-rarity. Run 'cardforge personas validate'."
            ),
            Error::Storage { .. } => Some(
                "The collection file may be corrupted. Move it aside to start a fresh collection."
            ),
            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let mut output = format!("\x1b[31mError [{}]\x1b[0m: {}\n", self.code().as_str(), self);

        if let Some(hint) = self.suggestion() {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code().as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn persona_config(message: impl Into<String>) -> Self {
        Error::PersonaConfig {
            message: message.into(),
            persona: None,
        }
    }

    pub fn persona_invalid(persona: impl Into<String>, message: impl Into<String>) -> Self {
        Error::PersonaConfig {
            message: message.into(),
            persona: Some(persona.into()),
        }
    }

    pub fn vision(message: impl Into<String>) -> Self {
        Error::VisionFailure {
            message: message.into(),
            retryable: false,
        }
    }

    pub fn integration(message: impl Into<String>) -> Self {
        Error::Integration {
            message: message.into(),
        }
    }

    pub fn model_request(message: impl Into<String>, retryable: bool) -> Self {
        Error::ModelRequest {
            message: message.into(),
            retryable,
        }
    }
}
