//! Card generation pipeline
//!
//! One attempt flows strictly one way:
//! - `FeatureExtractor`: photo to `FeatureRecord` (one vision call)
//! - `DiscussionOrchestrator`: four `PersonaGenerator` calls in parallel
//! - `CardIntegrator`: contributions plus fallbacks to `CardRecord`
//!
//! `CardForge` wires the three together for a single attempt.

mod extractor;
mod forge;
mod generator;
mod integrator;
mod orchestrator;

pub use extractor::*;
pub use forge::*;
pub use generator::*;
pub use integrator::*;
pub use orchestrator::*;

/// Slice out the JSON object in a model reply.
///
/// Models wrap JSON in code fences or chatter; everything from the first `{`
/// to the last `}` is taken.
pub(crate) fn json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}
