//! The contract orchestration consumes, one implementation per target site.

use async_trait::async_trait;

use crate::discovery::discover;
use crate::evaluator::PageEvaluator;
use crate::extraction::extract;
use crate::model::{ConversationReference, ExtractionResult, HarvestOptions};
use crate::profile::SiteProfile;
use crate::signin::is_signed_in;
use crate::timing::Timings;

/// The live page plus the pacing to drive it with.
#[derive(Clone, Copy)]
pub struct PageContext<'a> {
    pub evaluator: &'a dyn PageEvaluator,
    pub timings: &'a Timings,
}

impl<'a> PageContext<'a> {
    pub fn new(evaluator: &'a dyn PageEvaluator, timings: &'a Timings) -> Self {
        Self { evaluator, timings }
    }
}

/// Capabilities of one target site.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identifier used on the command line and in configuration.
    fn identity(&self) -> &str;

    fn display_name(&self) -> &str;

    /// Address to open before probing and discovery.
    fn entry_url(&self) -> &str;

    async fn is_signed_in(&self, page: &PageContext<'_>) -> bool;

    async fn discover_chats(
        &self,
        page: &PageContext<'_>,
        opts: HarvestOptions,
    ) -> Vec<ConversationReference>;

    /// Extract the conversation currently displayed.
    async fn extract_messages(&self, page: &PageContext<'_>, opts: HarvestOptions) -> ExtractionResult;
}

/// A provider fully described by a [`SiteProfile`].
pub struct SiteProvider {
    profile: SiteProfile,
}

impl SiteProvider {
    pub fn new(profile: SiteProfile) -> Self {
        Self { profile }
    }
}

#[async_trait]
impl Provider for SiteProvider {
    fn identity(&self) -> &str {
        self.profile.identity
    }

    fn display_name(&self) -> &str {
        self.profile.display_name
    }

    fn entry_url(&self) -> &str {
        self.profile.entry_url
    }

    async fn is_signed_in(&self, page: &PageContext<'_>) -> bool {
        is_signed_in(page.evaluator, &self.profile).await
    }

    async fn discover_chats(
        &self,
        page: &PageContext<'_>,
        opts: HarvestOptions,
    ) -> Vec<ConversationReference> {
        discover(page.evaluator, &self.profile, page.timings, opts).await
    }

    async fn extract_messages(&self, page: &PageContext<'_>, opts: HarvestOptions) -> ExtractionResult {
        extract(page.evaluator, &self.profile, page.timings, opts).await
    }
}
