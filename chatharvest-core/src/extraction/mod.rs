//! Message extraction for one conversation page.
//!
//! Markup on the target sites is unversioned, so extraction degrades through
//! successively weaker signals: semantic turn elements, paired query/response
//! regions, explicit role attributes, then a positional/lexical guess with a
//! raw text dump as last resort. The first strategy that yields anything wins
//! and the weaker ones are never consulted.

pub mod classify;
pub mod materialize;
pub mod strategies;

use tokio::time::sleep;
use tracing::{debug, info};

pub use materialize::materialize;
pub use strategies::{
    default_cascade, ExtractionStrategy, PairedRegions, RoleAttributes, StructuralFallback,
    TurnElements,
};

use crate::evaluator::PageEvaluator;
use crate::model::{retain_non_empty, ExtractionResult, HarvestOptions};
use crate::profile::SiteProfile;
use crate::timing::Timings;

/// Evaluate `strategies` in order and return the first non-empty result.
pub async fn run_cascade(
    evaluator: &dyn PageEvaluator,
    profile: &SiteProfile,
    strategies: &[Box<dyn ExtractionStrategy>],
    opts: HarvestOptions,
) -> ExtractionResult {
    for strategy in strategies {
        let raw = evaluator.evaluate(&strategy.script(profile)).await;
        let messages = retain_non_empty(strategy.interpret(&raw, profile, opts));
        if !messages.is_empty() {
            info!(
                strategy = strategy.name(),
                messages = messages.len(),
                "extracted conversation"
            );
            return messages;
        }
        debug!(strategy = strategy.name(), "strategy matched nothing");
    }

    debug!(provider = profile.identity, "no extraction strategy matched");
    Vec::new()
}

/// Extract the conversation currently displayed. Never fails; an empty
/// result means nothing usable was found.
pub async fn extract(
    evaluator: &dyn PageEvaluator,
    profile: &SiteProfile,
    timings: &Timings,
    opts: HarvestOptions,
) -> ExtractionResult {
    sleep(timings.render_settle).await;
    let checks = materialize(evaluator, profile, timings).await;
    debug!(checks, "materialize loop finished");
    sleep(timings.cascade_settle).await;

    run_cascade(evaluator, profile, &default_cascade(), opts).await
}
