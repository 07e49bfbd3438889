//! Writing exported conversations to disk.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::Utc;
use tracing::debug;

use crate::error::{HarvestError, Result};
use crate::model::{ConversationReference, Message};
use crate::render_json::{render_json, ConversationExport};
use crate::render_md::render_markdown;
use crate::slug::{reference_base_name, SlugState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Markdown,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = HarvestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            other => Err(HarvestError::config(format!(
                "unknown output format '{other}' (expected md or json)"
            ))),
        }
    }
}

/// Parse a comma separated list such as `md,json`, dropping repeats.
pub fn parse_formats(list: &str) -> Result<Vec<OutputFormat>> {
    let mut formats = Vec::new();
    for part in list.split(',').filter(|p| !p.trim().is_empty()) {
        let format: OutputFormat = part.parse()?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    if formats.is_empty() {
        return Err(HarvestError::config("no output format selected"));
    }
    Ok(formats)
}

/// Write `contents` next to `path` first, then rename over it, so a crash
/// never leaves a half-written export behind.
pub async fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| HarvestError::io(parent, e))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".partial");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|e| HarvestError::io(&tmp, e))?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(HarvestError::io(path, e));
    }
    Ok(())
}

/// Turns extraction results into files under one output directory.
pub struct ExportWriter {
    out_dir: PathBuf,
    formats: Vec<OutputFormat>,
    json_indent: usize,
    slugs: SlugState,
}

impl ExportWriter {
    pub fn new(out_dir: impl Into<PathBuf>, formats: Vec<OutputFormat>, json_indent: usize) -> Self {
        Self {
            out_dir: out_dir.into(),
            formats,
            json_indent,
            slugs: SlugState::new(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Reserve the filename stem for a conversation.
    pub fn next_stem(&mut self, reference: &ConversationReference) -> String {
        self.slugs.next_slug(&reference_base_name(reference))
    }

    /// Paths the conversation would be written to, one per format.
    pub fn planned_paths(&self, stem: &str) -> Vec<PathBuf> {
        self.formats
            .iter()
            .map(|format| self.out_dir.join(format!("{stem}.{}", format.extension())))
            .collect()
    }

    /// Render and write one conversation in every configured format.
    pub async fn write(
        &mut self,
        reference: &ConversationReference,
        messages: &[Message],
    ) -> Result<Vec<PathBuf>> {
        let stem = self.next_stem(reference);
        let title = reference.display_title();
        let mut written = Vec::with_capacity(self.formats.len());

        for format in self.formats.iter().copied() {
            let contents = match format {
                OutputFormat::Markdown => render_markdown(&title, messages),
                OutputFormat::Json => {
                    let export = ConversationExport::new(&title, &reference.href, messages, Utc::now());
                    render_json(&export, self.json_indent)?
                }
            };
            let path = self.out_dir.join(format!("{stem}.{}", format.extension()));
            write_atomically(&path, &contents).await?;
            debug!(path = %path.display(), "wrote export");
            written.push(path);
        }

        Ok(written)
    }
}
