//! Per-persona generation
//!
//! Builds a responsibility-specific prompt from the shared feature record and
//! one persona, calls the text model, and parses the reply into a typed
//! `PartialContribution`. A missing or malformed field is a failure here;
//! fallbacks are decided only by the integrator.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::backend::{CompletionRequest, GenerationParams, TextModel};
use crate::error::{Error, Result};
use crate::persona::Persona;
use crate::types::{
    Attribute, Contribution, FeatureRecord, PartialContribution, Rarity, Responsibility,
};

use super::json_object;

// ─────────────────────────────────────────────────────────────────
// Contribution Source
// ─────────────────────────────────────────────────────────────────

/// Anything that can produce one persona's contribution.
///
/// The orchestrator depends on this seam rather than on a concrete model so
/// tests can substitute scripted sources.
#[async_trait]
pub trait ContributionSource: Send + Sync {
    async fn generate(
        &self,
        feature: &FeatureRecord,
        persona: &Persona,
    ) -> Result<PartialContribution>;
}

// ─────────────────────────────────────────────────────────────────
// Prompt Construction
// ─────────────────────────────────────────────────────────────────

/// System and user halves of a generation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPrompt {
    pub system: String,
    pub user: String,
}

/// Build the prompt for one persona. Pure in `(feature, persona)`.
pub fn build_prompt(feature: &FeatureRecord, persona: &Persona) -> GenerationPrompt {
    let mut system = format!(
        "You are {}, one of four evaluators forging a trading card from a photographed object.\n\
         Character: {}\n\
         Role: {}\n",
        persona.display_name, persona.persona_text, persona.role_text
    );
    if let Some(style) = &persona.speech_style {
        system.push_str(&format!("Speech style: {}\n", style));
    }
    system.push_str(&format!("Responsibility: {}\n", persona.responsibility.slug()));
    system.push_str(
        "Stay in character. Decide only your own part of the card; the other evaluators decide the rest.",
    );

    let user = format!(
        "The object in the photo:\n{}\n\n{}\n\n\
         Reply with a single JSON object and nothing else:\n\
         {{\"result\": {}, \"message\": \"one or two in-character sentences explaining your choice\"}}",
        feature.summary(),
        task_for(persona.responsibility),
        result_shape(persona.responsibility),
    );

    GenerationPrompt { system, user }
}

fn task_for(responsibility: Responsibility) -> String {
    match responsibility {
        Responsibility::Name => {
            "Your task: give the card a short, evocative name (two to four words).".to_string()
        }
        Responsibility::Flavor => {
            "Your task: write the card's flavor text, a single atmospheric sentence of lore."
                .to_string()
        }
        Responsibility::Attribute => format!(
            "Your task: choose the card's elemental attribute. It must be exactly one of: {}.",
            join_names(Attribute::all().iter().map(Attribute::as_str))
        ),
        Responsibility::ColorRarity => format!(
            "Your task: pick the card's signature color and judge its rarity. Rarity must be exactly one of: {}.",
            join_names(Rarity::all().iter().map(Rarity::as_str))
        ),
    }
}

fn result_shape(responsibility: Responsibility) -> &'static str {
    match responsibility {
        Responsibility::Name => r#"{"name": "..."}"#,
        Responsibility::Flavor => r#"{"flavorText": "..."}"#,
        Responsibility::Attribute => r#"{"attribute": "..."}"#,
        Responsibility::ColorRarity => r#"{"color": "...", "rarity": "..."}"#,
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

// ─────────────────────────────────────────────────────────────────
// Output Parsing
// ─────────────────────────────────────────────────────────────────

/// Parse a model reply into the contribution for `responsibility`.
///
/// Expects `{"result": {...}, "message": "..."}`; `utterance` is accepted in
/// place of `message`. Returns a description of the first problem found.
pub fn parse_output(
    responsibility: Responsibility,
    reply: &str,
) -> std::result::Result<PartialContribution, String> {
    let body = json_object(reply).ok_or_else(|| "reply contains no JSON object".to_string())?;
    let value: Value =
        serde_json::from_str(body).map_err(|e| format!("reply is not valid JSON: {}", e))?;
    let root = value
        .as_object()
        .ok_or_else(|| "reply is not a JSON object".to_string())?;

    let result = match root.get("result") {
        Some(Value::Object(result)) => result,
        Some(_) => return Err("'result' must be an object".to_string()),
        None => return Err("missing 'result'".to_string()),
    };

    let utterance = root
        .get("message")
        .or_else(|| root.get("utterance"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "missing 'message'".to_string())?;

    let contribution = match responsibility {
        Responsibility::Name => Contribution::Name {
            name: text_field(result, "name")?,
        },
        Responsibility::Flavor => Contribution::Flavor {
            flavor_text: text_field(result, "flavorText")?,
        },
        Responsibility::Attribute => Contribution::Attribute {
            attribute: text_field(result, "attribute")?.parse()?,
        },
        Responsibility::ColorRarity => Contribution::ColorRarity {
            color: text_field(result, "color")?,
            rarity: text_field(result, "rarity")?.parse()?,
        },
    };

    Ok(PartialContribution::new(contribution, utterance))
}

fn text_field(result: &Map<String, Value>, key: &str) -> std::result::Result<String, String> {
    match result.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::String(_)) => Err(format!("'{}' is blank", key)),
        Some(_) => Err(format!("'{}' must be a string", key)),
        None => Err(format!("missing '{}'", key)),
    }
}

// ─────────────────────────────────────────────────────────────────
// Persona Generator
// ─────────────────────────────────────────────────────────────────

/// Generates contributions by calling a text model.
pub struct PersonaGenerator {
    model: Arc<dyn TextModel>,
    params: GenerationParams,
}

impl PersonaGenerator {
    pub fn new(model: Arc<dyn TextModel>, params: GenerationParams) -> Self {
        Self { model, params }
    }
}

#[async_trait]
impl ContributionSource for PersonaGenerator {
    async fn generate(
        &self,
        feature: &FeatureRecord,
        persona: &Persona,
    ) -> Result<PartialContribution> {
        let failure = |message: String| Error::GenerationFailure {
            responsibility: persona.responsibility,
            persona_id: persona.id.clone(),
            message,
        };

        let prompt = build_prompt(feature, persona);
        let request = CompletionRequest {
            system_prompt: Some(prompt.system),
            prompt: prompt.user,
            params: self.params.clone(),
        };

        let reply = self
            .model
            .complete(request)
            .await
            .map_err(|e| failure(e.to_string()))?;

        debug!(persona = %persona.id, chars = reply.len(), "Generation reply received");

        parse_output(persona.responsibility, &reply).map_err(failure)
    }
}
