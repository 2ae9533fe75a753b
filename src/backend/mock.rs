//! Mock backend for testing
//!
//! Scripted implementation of both model boundaries. Replies are chosen by
//! matching a substring of the prompt, can be delayed to impose a completion
//! order, and every call is counted.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{Error, Result};

use super::{CompletionRequest, TextModel, VisionModel, VisionRequest};

// ─────────────────────────────────────────────────────────────────
// Scripted Replies
// ─────────────────────────────────────────────────────────────────

/// What the mock answers with
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Fail { message: String, retryable: bool },
}

impl MockReply {
    fn into_result(self) -> Result<String> {
        match self {
            MockReply::Text(text) => Ok(text),
            MockReply::Fail { message, retryable } => Err(Error::model_request(message, retryable)),
        }
    }
}

#[derive(Debug, Clone)]
struct MockRule {
    /// Substring of the prompt that selects this rule
    matcher: String,
    reply: MockReply,
    delay: Duration,
}

/// Track method call counts for verification
#[derive(Debug, Default)]
struct CallCounts {
    describe_image: u32,
    complete: u32,
}

// ─────────────────────────────────────────────────────────────────
// Mock Backend
// ─────────────────────────────────────────────────────────────────

/// Mock implementation of `VisionModel` and `TextModel`
pub struct MockBackend {
    vision_reply: MockReply,
    vision_delay: Duration,
    rules: Vec<MockRule>,
    fallback: Option<MockReply>,
    call_counts: RwLock<CallCounts>,
    prompts: RwLock<Vec<String>>,
}

impl MockBackend {
    /// A mock with no scripted text replies and a failing vision call
    pub fn new() -> Self {
        Self {
            vision_reply: MockReply::Fail {
                message: "no vision reply scripted".to_string(),
                retryable: false,
            },
            vision_delay: Duration::ZERO,
            rules: Vec::new(),
            fallback: None,
            call_counts: RwLock::new(CallCounts::default()),
            prompts: RwLock::new(Vec::new()),
        }
    }

    /// Answer every vision call with `text`
    pub fn with_vision_response(mut self, text: impl Into<String>) -> Self {
        self.vision_reply = MockReply::Text(text.into());
        self
    }

    /// Fail every vision call
    pub fn with_vision_failure(mut self, message: impl Into<String>, retryable: bool) -> Self {
        self.vision_reply = MockReply::Fail {
            message: message.into(),
            retryable,
        };
        self
    }

    /// Delay every vision call
    pub fn with_vision_delay(mut self, delay: Duration) -> Self {
        self.vision_delay = delay;
        self
    }

    /// Reply with `text` to prompts containing `matcher`
    pub fn respond_when(self, matcher: impl Into<String>, text: impl Into<String>) -> Self {
        self.rule(matcher, MockReply::Text(text.into()), Duration::ZERO)
    }

    /// Reply with `text` after `delay` to prompts containing `matcher`
    pub fn respond_after(
        self,
        matcher: impl Into<String>,
        delay: Duration,
        text: impl Into<String>,
    ) -> Self {
        self.rule(matcher, MockReply::Text(text.into()), delay)
    }

    /// Fail prompts containing `matcher`
    pub fn fail_when(self, matcher: impl Into<String>, message: impl Into<String>) -> Self {
        self.fail_after(matcher, Duration::ZERO, message)
    }

    /// Fail prompts containing `matcher` after `delay`
    pub fn fail_after(
        self,
        matcher: impl Into<String>,
        delay: Duration,
        message: impl Into<String>,
    ) -> Self {
        self.rule(
            matcher,
            MockReply::Fail {
                message: message.into(),
                retryable: false,
            },
            delay,
        )
    }

    /// Reply used when no rule matches
    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(MockReply::Text(text.into()));
        self
    }

    fn rule(mut self, matcher: impl Into<String>, reply: MockReply, delay: Duration) -> Self {
        self.rules.push(MockRule {
            matcher: matcher.into(),
            reply,
            delay,
        });
        self
    }

    /// Get the number of times a method was called
    pub fn call_count(&self, method: &str) -> u32 {
        let counts = self.call_counts.read();
        match method {
            "describe_image" => counts.describe_image,
            "complete" => counts.complete,
            _ => 0,
        }
    }

    /// Every text prompt received, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().clone()
    }

    /// Reset all call counts and recorded prompts
    pub fn reset_counts(&self) {
        *self.call_counts.write() = CallCounts::default();
        self.prompts.write().clear();
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionModel for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn describe_image(&self, _request: VisionRequest) -> Result<String> {
        self.call_counts.write().describe_image += 1;
        if !self.vision_delay.is_zero() {
            tokio::time::sleep(self.vision_delay).await;
        }
        self.vision_reply.clone().into_result()
    }
}

#[async_trait]
impl TextModel for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.call_counts.write().complete += 1;

        let full_prompt = match request.system_prompt {
            Some(system) => format!("{}\n{}", system, request.prompt),
            None => request.prompt,
        };
        self.prompts.write().push(full_prompt.clone());

        let rule = self
            .rules
            .iter()
            .find(|r| full_prompt.contains(&r.matcher))
            .cloned();

        let (reply, delay) = match (rule, &self.fallback) {
            (Some(rule), _) => (rule.reply, rule.delay),
            (None, Some(fallback)) => (fallback.clone(), Duration::ZERO),
            (None, None) => (
                MockReply::Fail {
                    message: "no scripted reply matches prompt".to_string(),
                    retryable: false,
                },
                Duration::ZERO,
            ),
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        reply.into_result()
    }
}
