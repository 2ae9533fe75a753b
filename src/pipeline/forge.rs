//! End-to-end card generation attempt.

use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::backend::{GenerationParams, TextModel, VisionModel};
use crate::error::{Error, Result};
use crate::persona::PersonaSet;
use crate::storage::CardStore;
use crate::types::{CardRecord, ImageAsset, Responsibility};

use super::{CardIntegrator, ContributionSource, DiscussionOrchestrator, FeatureExtractor, PersonaGenerator};

/// A finished attempt.
#[derive(Debug, Clone)]
pub struct ForgeOutcome {
    pub card: CardRecord,

    /// Responsibilities whose value came from the fallback table
    pub fallbacks: Vec<Responsibility>,

    /// Whether the card reached the attached store
    pub saved: bool,
}

/// Runs whole attempts: extract once, discuss, integrate, save.
pub struct CardForge {
    extractor: FeatureExtractor,
    orchestrator: DiscussionOrchestrator,
    integrator: CardIntegrator,
    personas: PersonaSet,
    store: Option<Arc<dyn CardStore>>,
}

impl CardForge {
    /// Forge backed by model boundaries with default tuning.
    pub fn new(vision: Arc<dyn VisionModel>, text: Arc<dyn TextModel>, personas: PersonaSet) -> Self {
        Self::with_params(
            vision,
            GenerationParams::default(),
            text,
            GenerationParams::default(),
            personas,
        )
    }

    pub fn with_params(
        vision: Arc<dyn VisionModel>,
        vision_params: GenerationParams,
        text: Arc<dyn TextModel>,
        generation_params: GenerationParams,
        personas: PersonaSet,
    ) -> Self {
        let generator: Arc<dyn ContributionSource> =
            Arc::new(PersonaGenerator::new(text, generation_params));
        Self::from_parts(
            FeatureExtractor::new(vision, vision_params),
            DiscussionOrchestrator::new(generator),
            personas,
        )
    }

    /// Forge from an already built extractor and orchestrator.
    pub fn from_parts(
        extractor: FeatureExtractor,
        orchestrator: DiscussionOrchestrator,
        personas: PersonaSet,
    ) -> Self {
        Self {
            extractor,
            orchestrator,
            integrator: CardIntegrator::new(),
            personas,
            store: None,
        }
    }

    /// Save finished cards to `store`.
    pub fn with_store(mut self, store: Arc<dyn CardStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn personas(&self) -> &PersonaSet {
        &self.personas
    }

    /// Run one attempt for a photo.
    ///
    /// Fails only on vision or integration errors; persona failures fall back
    /// and a failed save is logged.
    pub async fn forge(&self, image: &ImageAsset) -> Result<ForgeOutcome> {
        let attempt = Uuid::new_v4();
        let span = info_span!("attempt", id = %attempt, image = %image.image_ref);
        self.run_attempt(image).instrument(span).await
    }

    async fn run_attempt(&self, image: &ImageAsset) -> Result<ForgeOutcome> {
        if image.is_empty() {
            return Err(Error::integration("image has no data"));
        }

        let feature = self.extractor.extract_features(image).await?;
        let discussion = self.orchestrator.run(&feature, &self.personas).await;

        let card = self.integrator.integrate(
            &discussion.contributions,
            &feature,
            &image.image_ref,
            &image.data_url(),
            discussion.log,
        )?;
        let fallbacks = discussion.contributions.failed();

        info!(
            card = %card.id,
            name = %card.name,
            rarity = %card.rarity,
            fallbacks = fallbacks.len(),
            "Card forged"
        );

        let saved = match &self.store {
            Some(store) => match store.save(&card) {
                Ok(()) => true,
                Err(e) => {
                    warn!(card = %card.id, error = %e.format_for_log(), "Card could not be saved");
                    false
                }
            },
            None => false,
        };

        Ok(ForgeOutcome {
            card,
            fallbacks,
            saved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::persona::PersonaRegistry;

    const ROBOT: &str = r#"{"objectType":"toy robot","colors":["red"],"shapes":[],"materials":["plastic"],"detailedDescription":"a small articulated robot figure"}"#;

    #[tokio::test]
    async fn test_vision_failure_aborts_attempt() {
        let mock = Arc::new(
            MockBackend::new()
                .with_vision_failure("unreadable", false)
                .with_fallback("unused"),
        );
        let personas = PersonaRegistry::bundled().load_personas().unwrap();
        let forge = CardForge::new(mock.clone(), mock.clone(), personas);

        let image = ImageAsset::new("robot.png", "image/png", vec![1, 2, 3]);
        let err = forge.forge(&image).await.unwrap_err();
        assert!(matches!(err, Error::VisionFailure { .. }));
        assert_eq!(mock.call_count("describe_image"), 1);
        assert_eq!(mock.call_count("complete"), 0);
    }

    #[tokio::test]
    async fn test_empty_image_is_rejected_before_any_call() {
        let mock = Arc::new(MockBackend::new().with_vision_response(ROBOT));
        let personas = PersonaRegistry::bundled().load_personas().unwrap();
        let forge = CardForge::new(mock.clone(), mock.clone(), personas);

        let err = forge
            .forge(&ImageAsset::new("blank.png", "image/png", vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Integration { .. }));
        assert_eq!(mock.call_count("describe_image"), 0);
    }

    #[tokio::test]
    async fn test_all_personas_fail_still_forges() {
        let mock = Arc::new(MockBackend::new().with_vision_response(ROBOT));
        let personas = PersonaRegistry::bundled().load_personas().unwrap();
        let forge = CardForge::new(mock.clone(), mock.clone(), personas);

        let outcome = forge
            .forge(&ImageAsset::new("robot.png", "image/png", vec![1]))
            .await
            .unwrap();
        assert_eq!(outcome.fallbacks.len(), 4);
        assert!(outcome.card.discussion_log.is_empty());
        assert!(!outcome.saved);
        assert_eq!(mock.call_count("complete"), 4);
    }
}
