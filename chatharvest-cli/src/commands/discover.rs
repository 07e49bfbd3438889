use anyhow::Result;
use chatharvest_core::{HarvestOptions, PageContext, Registry};
use clap::Args;
use tracing::info;

use crate::config::Config;
use crate::ui;

#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// Provider to list (default from config, else gemini)
    #[arg(long, short = 'p')]
    pub provider: Option<String>,

    /// Print references as a JSON array
    #[arg(long)]
    pub json: bool,

    /// Browser to drive (chrome, chromium, brave, edge, arc, safari)
    #[arg(long)]
    pub browser: Option<String>,
}

pub async fn run_discover(args: DiscoverArgs, config: &Config, opts: HarvestOptions) -> Result<()> {
    let registry = Registry::builtin();
    let provider = registry.resolve(args.provider.as_deref().unwrap_or(&config.provider))?;

    super::preflight()?;
    let evaluator = super::evaluator_for(args.browser.as_deref(), config)?;
    let page = PageContext::new(&evaluator, &config.timings);
    super::open_signed_in(provider, &page).await?;

    let pb = ui::spinner("Scrolling the conversation list");
    let references = provider.discover_chats(&page, opts).await;
    ui::finish_success(pb, format!("Found {} conversations", references.len()));
    info!(provider = provider.identity(), count = references.len(), "discovery complete");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&references)?);
    } else {
        for reference in &references {
            println!("{}\t{}", reference.display_title(), reference.href);
        }
    }
    Ok(())
}
