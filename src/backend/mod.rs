//! Model backends
//!
//! Provides the vision and text-generation boundaries used by the pipeline:
//! - OpenAI-compatible HTTP backend (OpenAI, Ollama, vLLM, LM Studio)
//! - Mock backend for testing

mod mock;
mod openai;
mod traits;

pub use mock::{MockBackend, MockReply};
pub use openai::{OpenAiBackend, OpenAiConfig};
pub use traits::*;
