//! Backend trait definitions
//!
//! The two external model boundaries the pipeline depends on: a vision call
//! that turns a photo plus an instruction into text, and a text-generation
//! call that turns a prompt into text.

use async_trait::async_trait;

use crate::error::Result;

// ─────────────────────────────────────────────────────────────────
// Request Types
// ─────────────────────────────────────────────────────────────────

/// Tuning knobs passed to the model. Not contractual.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Model identifier at the endpoint
    pub model: String,

    /// Sampling temperature (0.0 - 2.0)
    pub temperature: f32,

    /// Output length cap
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.8,
            max_tokens: 400,
        }
    }
}

/// A photo plus the instruction for what to extract from it.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    /// Image as a `data:` URL
    pub image_data_url: String,
    pub instruction: String,
    pub params: GenerationParams,
}

/// A text-generation prompt.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: Option<String>,
    pub prompt: String,
    pub params: GenerationParams,
}

// ─────────────────────────────────────────────────────────────────
// Model Boundaries
// ─────────────────────────────────────────────────────────────────

/// Vision-capable model.
///
/// Errors must distinguish transient from permanent failures
/// (`Error::ModelRequest { retryable, .. }`).
#[async_trait]
pub trait VisionModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Return the model's raw text answer about the image.
    async fn describe_image(&self, request: VisionRequest) -> Result<String>;
}

/// Text-generation model.
#[async_trait]
pub trait TextModel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Return the model's raw completion for the prompt.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}
