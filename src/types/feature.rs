//! Structured visual features extracted from a photo.

use serde::{Deserialize, Serialize};

/// What the vision model saw in the photo.
///
/// Produced exactly once per attempt by the feature extractor and then only
/// ever handed out by shared reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRecord {
    /// Short noun phrase for the object (e.g. "toy robot")
    pub object_type: String,

    /// Dominant colors, most prominent first
    pub colors: Vec<String>,

    /// Notable shapes or silhouettes
    pub shapes: Vec<String>,

    /// Apparent materials
    pub materials: Vec<String>,

    /// One or two sentences describing the object
    pub detailed_description: String,
}

impl FeatureRecord {
    /// Compact multi-line summary used inside generation prompts.
    pub fn summary(&self) -> String {
        format!(
            "Object: {}\nColors: {}\nShapes: {}\nMaterials: {}\nDescription: {}",
            self.object_type,
            join_or_none(&self.colors),
            join_or_none(&self.shapes),
            join_or_none(&self.materials),
            self.detailed_description,
        )
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none noted".to_string()
    } else {
        items.join(", ")
    }
}
