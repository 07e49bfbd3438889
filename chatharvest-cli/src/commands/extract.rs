use anyhow::{bail, Result};
use chatharvest_core::navigator::current_page;
use chatharvest_core::render_json::{render_json, ConversationExport};
use chatharvest_core::render_md::render_markdown;
use chatharvest_core::{HarvestOptions, OutputFormat, PageContext, Registry};
use chrono::Utc;
use clap::Args;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Provider whose page is open in the front tab
    #[arg(long, short = 'p')]
    pub provider: Option<String>,

    /// Output format written to stdout (md or json)
    #[arg(long, default_value = "md")]
    pub format: String,

    /// Browser to drive (chrome, chromium, brave, edge, arc, safari)
    #[arg(long)]
    pub browser: Option<String>,
}

/// Extract the conversation already displayed in the browser, without
/// navigating, and print it.
pub async fn run_extract(args: ExtractArgs, config: &Config, opts: HarvestOptions) -> Result<()> {
    let registry = Registry::builtin();
    let provider = registry.resolve(args.provider.as_deref().unwrap_or(&config.provider))?;
    let format: OutputFormat = args.format.parse()?;

    super::preflight()?;
    let evaluator = super::evaluator_for(args.browser.as_deref(), config)?;
    let page = PageContext::new(&evaluator, &config.timings);

    let messages = provider.extract_messages(&page, opts).await;
    if messages.is_empty() {
        bail!("no messages found on the current {} page", provider.display_name());
    }

    let (url, title) = current_page(page.evaluator).await;
    let title = if title.is_empty() {
        provider.display_name().to_string()
    } else {
        title
    };

    let rendered = match format {
        OutputFormat::Markdown => render_markdown(&title, &messages),
        OutputFormat::Json => {
            let export = ConversationExport::new(&title, &url, &messages, Utc::now());
            render_json(&export, config.pretty_json_indent)?
        }
    };
    print!("{rendered}");
    Ok(())
}
