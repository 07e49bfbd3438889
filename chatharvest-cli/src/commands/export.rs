//! Export every conversation of one provider to files.

use std::path::PathBuf;

use anyhow::Result;
use chatharvest_core::navigator::navigate;
use chatharvest_core::{
    parse_formats, ConversationReference, ExportWriter, HarvestOptions, PageContext, Provider,
    Registry,
};
use clap::Args;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

use crate::config::Config;
use crate::ui;

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Provider to export (default from config, else gemini)
    #[arg(long, short = 'p')]
    pub provider: Option<String>,

    /// Output directory
    #[arg(long = "out", value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Output formats (comma-separated: md,json)
    #[arg(long)]
    pub format: Option<String>,

    /// Export at most N conversations, in sidebar order
    #[arg(long)]
    pub limit: Option<usize>,

    /// Pause between conversations in milliseconds
    #[arg(long, value_name = "MS")]
    pub delay: Option<u64>,

    /// Extract but do not write files; print the paths that would be written
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Browser to drive (chrome, chromium, brave, edge, arc, safari)
    #[arg(long)]
    pub browser: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    pub exported: usize,
    pub skipped: usize,
    pub total: usize,
}

impl std::fmt::Display for ExportSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "exported {}, skipped {}, total {}",
            self.exported, self.skipped, self.total
        )
    }
}

pub async fn run_export(args: ExportArgs, config: &Config, opts: HarvestOptions) -> Result<()> {
    let registry = Registry::builtin();
    let provider = registry.resolve(args.provider.as_deref().unwrap_or(&config.provider))?;
    let formats = match args.format.as_deref() {
        Some(list) => parse_formats(list)?,
        None => config.formats.clone(),
    };
    let out_dir = args.out.clone().unwrap_or_else(|| config.out_dir.clone());
    let delay = args
        .delay
        .map(Duration::from_millis)
        .unwrap_or(config.delay);

    super::preflight()?;
    let evaluator = super::evaluator_for(args.browser.as_deref(), config)?;
    let page = PageContext::new(&evaluator, &config.timings);
    super::open_signed_in(provider, &page).await?;

    let pb = ui::spinner("Scrolling the conversation list");
    let mut references = provider.discover_chats(&page, opts).await;
    ui::finish_success(pb, format!("Found {} conversations", references.len()));
    if let Some(limit) = args.limit {
        references.truncate(limit);
    }

    if references.is_empty() {
        println!("No conversations found for {}", provider.display_name());
        return Ok(());
    }

    let mut writer = ExportWriter::new(out_dir, formats, config.pretty_json_indent);
    let summary = tokio::select! {
        summary = export_all(provider, &page, &references, &mut writer, delay, args.dry_run, opts) => summary?,
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted, files already written are kept");
            anyhow::bail!("export interrupted");
        }
    };

    info!(
        provider = provider.identity(),
        exported = summary.exported,
        skipped = summary.skipped,
        "export finished"
    );
    let verb = if args.dry_run { "Dry run" } else { "Done" };
    println!("{verb}: {summary} ({})", writer.out_dir().display());
    Ok(())
}

/// Visit each reference in order. A conversation with no extractable
/// messages is skipped and counted; a write failure aborts the run.
async fn export_all(
    provider: &dyn Provider,
    page: &PageContext<'_>,
    references: &[ConversationReference],
    writer: &mut ExportWriter,
    delay: Duration,
    dry_run: bool,
    opts: HarvestOptions,
) -> Result<ExportSummary> {
    let mut summary = ExportSummary {
        total: references.len(),
        ..ExportSummary::default()
    };
    let pb = ui::progress_bar(references.len() as u64, "Exporting");

    for (index, reference) in references.iter().enumerate() {
        if index > 0 {
            sleep(delay).await;
        }
        let title = reference.display_title();
        if let Some(pb) = &pb {
            pb.set_message(title.clone());
        }

        navigate(page.evaluator, &reference.href, page.timings).await;
        let messages = provider.extract_messages(page, opts).await;

        if messages.is_empty() {
            warn!(href = %reference.href, "no messages extracted, skipping");
            summary.skipped += 1;
        } else if dry_run {
            let stem = writer.next_stem(reference);
            for path in writer.planned_paths(&stem) {
                println!("would write {} ({} messages)", path.display(), messages.len());
            }
            summary.exported += 1;
        } else {
            let written = writer.write(reference, &messages).await?;
            info!(title = %title, messages = messages.len(), files = written.len(), "exported");
            summary.exported += 1;
        }

        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }

    ui::finish_success(pb, format!("{summary}"));
    Ok(summary)
}
