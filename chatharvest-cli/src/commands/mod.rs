//! Command implementations for the chatharvest CLI

pub mod discover;
pub mod export;
pub mod extract;
pub mod providers;

pub use discover::run_discover;
pub use export::run_export;
pub use extract::run_extract;
pub use providers::run_providers;

use anyhow::{Context, Result};
use chatharvest_core::navigator::navigate;
use chatharvest_core::{AppleScriptEvaluator, BrowserApp, HarvestError, PageContext, Provider};
use tracing::{debug, info};

use crate::config::Config;
use crate::ui;

/// Live commands drive the browser through `osascript`; fail early when it
/// is missing rather than reading every evaluation as an empty page.
pub fn preflight() -> Result<()> {
    which::which("osascript")
        .map(|_| ())
        .context("osascript not found; chatharvest needs macOS to drive the browser")
}

pub fn evaluator_for(browser_flag: Option<&str>, config: &Config) -> Result<AppleScriptEvaluator> {
    let browser = match browser_flag {
        Some(name) => name.parse::<BrowserApp>()?,
        None => config.browser,
    };
    let evaluator = AppleScriptEvaluator::new(browser)
        .with_timeout(config.evaluate_timeout)
        .with_max_output_bytes(config.max_output_bytes);
    debug!(
        browser = evaluator.browser().application_name(),
        timeout_secs = config.evaluate_timeout.as_secs(),
        "page bridge ready"
    );
    Ok(evaluator)
}

/// Open the provider's entry page and stop unless the user is signed in.
pub async fn open_signed_in(provider: &dyn Provider, page: &PageContext<'_>) -> Result<()> {
    let pb = ui::spinner(format!("Opening {}", provider.display_name()));
    navigate(page.evaluator, provider.entry_url(), page.timings).await;

    if !provider.is_signed_in(page).await {
        ui::finish_error(pb, format!("Not signed in to {}", provider.display_name()));
        return Err(HarvestError::not_signed_in(provider.display_name()).into());
    }

    ui::finish_success(pb, format!("Signed in to {}", provider.display_name()));
    info!(provider = provider.identity(), "sign-in confirmed");
    Ok(())
}
