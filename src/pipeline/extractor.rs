//! Feature extraction
//!
//! Turns a photo into a `FeatureRecord` with a single vision call. The reply
//! is parsed strictly: every field is required and list fields must be JSON
//! arrays of strings, even when empty.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::backend::{GenerationParams, VisionModel, VisionRequest};
use crate::error::{Error, Result};
use crate::types::{FeatureRecord, ImageAsset};

use super::json_object;

const EXTRACTION_INSTRUCTION: &str = r#"You are cataloguing a photographed object for a trading card game.
Look at the photo and answer with a single JSON object, no other text, with exactly these fields:
{
  "objectType": "short noun phrase naming the object",
  "colors": ["dominant colors, most prominent first"],
  "shapes": ["notable shapes or silhouettes"],
  "materials": ["apparent materials"],
  "detailedDescription": "one or two sentences describing the object"
}
Use empty arrays when nothing applies. Do not invent objects that are not in the photo."#;

/// Calls the vision model once and validates its answer.
pub struct FeatureExtractor {
    model: Arc<dyn VisionModel>,
    params: GenerationParams,
}

impl FeatureExtractor {
    pub fn new(model: Arc<dyn VisionModel>, params: GenerationParams) -> Self {
        Self { model, params }
    }

    /// Extract the feature record for a photo.
    ///
    /// Never retries; a transport failure keeps its retryability flag.
    pub async fn extract_features(&self, image: &ImageAsset) -> Result<FeatureRecord> {
        debug!(
            model = self.model.name(),
            image = %image.image_ref,
            bytes = image.bytes.len(),
            "Requesting feature extraction"
        );

        let request = VisionRequest {
            image_data_url: image.data_url(),
            instruction: EXTRACTION_INSTRUCTION.to_string(),
            params: self.params.clone(),
        };

        let reply = self.model.describe_image(request).await.map_err(|e| {
            let retryable = e.is_retryable();
            Error::VisionFailure {
                message: e.to_string(),
                retryable,
            }
        })?;

        let feature = parse_features(&reply)?;
        info!(object_type = %feature.object_type, colors = feature.colors.len(), "Features extracted");
        Ok(feature)
    }
}

/// Parse a vision reply into a `FeatureRecord`.
pub fn parse_features(reply: &str) -> Result<FeatureRecord> {
    if reply.trim().is_empty() {
        return Err(Error::vision("vision model returned an empty response"));
    }

    let body = json_object(reply)
        .ok_or_else(|| Error::vision("vision response contains no JSON object"))?;
    let value: Value = serde_json::from_str(body)
        .map_err(|e| Error::vision(format!("vision response is not valid JSON: {}", e)))?;
    let fields = value
        .as_object()
        .ok_or_else(|| Error::vision("vision response is not a JSON object"))?;

    let object_type = required_text(fields, "objectType")?;
    if object_type.is_empty() {
        return Err(Error::vision("field 'objectType' is blank"));
    }

    Ok(FeatureRecord {
        object_type,
        colors: required_list(fields, "colors")?,
        shapes: required_list(fields, "shapes")?,
        materials: required_list(fields, "materials")?,
        detailed_description: required_text(fields, "detailedDescription")?,
    })
}

fn required_text(fields: &Map<String, Value>, key: &str) -> Result<String> {
    match fields.get(key) {
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(_) => Err(Error::vision(format!("field '{}' must be a string", key))),
        None => Err(Error::vision(format!("missing required field '{}'", key))),
    }
}

fn required_list(fields: &Map<String, Value>, key: &str) -> Result<Vec<String>> {
    let items = match fields.get(key) {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(Error::vision(format!("field '{}' must be an array", key))),
        None => return Err(Error::vision(format!("missing required field '{}'", key))),
    };

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(|s| s.trim().to_string())
                .ok_or_else(|| Error::vision(format!("field '{}' must contain only strings", key)))
        })
        .collect()
}
