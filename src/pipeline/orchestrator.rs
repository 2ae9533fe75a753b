//! Discussion orchestration
//!
//! Fans the four persona generations out concurrently, records each outcome
//! as it settles, and returns once all four have settled. A failed persona
//! only loses its own contribution and log entry.

use std::sync::Arc;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::persona::{PersonaDescriptor, PersonaSet};
use crate::types::{ContributionMap, DiscussionEntry, EntryKind, FeatureRecord};

use super::ContributionSource;

/// Settled result of one discussion.
#[derive(Debug, Clone)]
pub struct DiscussionOutcome {
    /// Every responsibility, `None` where the persona failed
    pub contributions: ContributionMap,

    /// One entry per successful persona, in completion order
    pub log: Vec<DiscussionEntry>,
}

/// Runs the four-persona discussion.
pub struct DiscussionOrchestrator {
    source: Arc<dyn ContributionSource>,
}

impl DiscussionOrchestrator {
    pub fn new(source: Arc<dyn ContributionSource>) -> Self {
        Self { source }
    }

    /// Run all four generations and wait for every one to settle.
    pub async fn run(&self, feature: &FeatureRecord, personas: &PersonaSet) -> DiscussionOutcome {
        let mut pending: FuturesUnordered<_> = personas
            .iter()
            .map(|persona| {
                let source = &self.source;
                async move {
                    let started = Instant::now();
                    let outcome = source.generate(feature, persona).await;
                    (persona, outcome, started.elapsed())
                }
            })
            .collect();

        let mut contributions = ContributionMap::unsettled();
        let mut log = Vec::with_capacity(personas.len());

        while let Some((persona, outcome, elapsed)) = pending.next().await {
            let responsibility = persona.responsibility;
            match outcome {
                Ok(contribution) if contribution.responsibility() == responsibility => {
                    info!(
                        persona = %persona.id,
                        %responsibility,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Persona contributed"
                    );
                    log.push(DiscussionEntry::new(
                        persona.id.clone(),
                        persona.display_name.clone(),
                        contribution.utterance.clone(),
                        EntryKind::Discussion,
                    ));
                    contributions.settle(responsibility, Some(contribution));
                }
                Ok(contribution) => {
                    warn!(
                        persona = %persona.id,
                        %responsibility,
                        returned = %contribution.responsibility(),
                        "Persona answered for the wrong responsibility"
                    );
                    contributions.settle(responsibility, None);
                }
                Err(e) => {
                    warn!(
                        persona = %persona.id,
                        %responsibility,
                        elapsed_ms = elapsed.as_millis() as u64,
                        error = %e.format_for_log(),
                        "Persona failed"
                    );
                    contributions.settle(responsibility, None);
                }
            }
        }

        debug!(
            succeeded = contributions.success_count(),
            entries = log.len(),
            "Discussion settled"
        );

        DiscussionOutcome { contributions, log }
    }

    /// Validate raw descriptors, then run.
    ///
    /// An invalid panel fails before any generation call is issued.
    pub async fn run_descriptors(
        &self,
        feature: &FeatureRecord,
        descriptors: &[PersonaDescriptor],
    ) -> Result<DiscussionOutcome> {
        let personas = PersonaSet::from_descriptors(descriptors)?;
        Ok(self.run(feature, &personas).await)
    }
}
