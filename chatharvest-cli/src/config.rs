use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chatharvest_core::applescript::{DEFAULT_EVALUATE_TIMEOUT, DEFAULT_MAX_OUTPUT_BYTES};
use chatharvest_core::{BrowserApp, OutputFormat, Timings};
use serde::Deserialize;

/// Fully resolved settings: defaults, then the config file. Command-line
/// flags are applied on top by each command.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: String,
    pub out_dir: PathBuf,
    pub formats: Vec<OutputFormat>,
    pub delay: Duration,
    pub browser: BrowserApp,
    pub pretty_json_indent: usize,
    pub timings: Timings,
    pub evaluate_timeout: Duration,
    /// Evaluation results larger than this are discarded.
    pub max_output_bytes: usize,
}

impl Config {
    pub fn load(provided: Option<&Path>) -> Result<Self> {
        let loaded = match provided {
            Some(explicit) => {
                let expanded = expand_path(explicit)?;
                if !expanded.exists() {
                    anyhow::bail!("config file {} does not exist", expanded.display());
                }
                Some(load_raw_config(&expanded)?)
            }
            None => match default_config_path() {
                Some(path) if path.exists() => Some(load_raw_config(&path)?),
                _ => None,
            },
        };

        RawConfig::default()
            .merge(loaded.unwrap_or_default())
            .resolve()
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".chatharvest").join("config.toml"))
}

pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let path_str = path.to_string_lossy();
    if let Some(stripped) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir().context("unable to resolve home directory")?;
        Ok(home.join(stripped))
    } else {
        Ok(path.to_path_buf())
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    out_dir: Option<String>,
    #[serde(default)]
    formats: Vec<String>,
    #[serde(default)]
    delay_ms: Option<u64>,
    #[serde(default)]
    browser: Option<String>,
    #[serde(default)]
    pretty_json_indent: Option<usize>,
    #[serde(default)]
    max_output_mb: Option<usize>,
    #[serde(default)]
    timings: RawTimings,
}

impl RawConfig {
    fn merge(mut self, other: RawConfig) -> RawConfig {
        if other.provider.is_some() {
            self.provider = other.provider;
        }
        if other.out_dir.is_some() {
            self.out_dir = other.out_dir;
        }
        if !other.formats.is_empty() {
            self.formats = other.formats;
        }
        if other.delay_ms.is_some() {
            self.delay_ms = other.delay_ms;
        }
        if other.browser.is_some() {
            self.browser = other.browser;
        }
        if other.pretty_json_indent.is_some() {
            self.pretty_json_indent = other.pretty_json_indent;
        }
        if other.max_output_mb.is_some() {
            self.max_output_mb = other.max_output_mb;
        }
        self.timings = self.timings.merge(other.timings);
        self
    }

    fn resolve(self) -> Result<Config> {
        let mut formats = Vec::new();
        for name in &self.formats {
            let format: OutputFormat = name.parse()?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        if formats.is_empty() {
            formats = vec![OutputFormat::Markdown, OutputFormat::Json];
        }

        let out_dir = match self.out_dir.as_deref() {
            Some(dir) => expand_path(Path::new(dir))?,
            None => PathBuf::from("chat-exports"),
        };

        let browser = match self.browser.as_deref() {
            Some(name) => name.parse::<BrowserApp>()?,
            None => BrowserApp::Chrome,
        };

        Ok(Config {
            provider: self.provider.unwrap_or_else(|| "gemini".to_string()),
            out_dir,
            formats,
            delay: Duration::from_millis(self.delay_ms.unwrap_or(2000)),
            browser,
            pretty_json_indent: self.pretty_json_indent.unwrap_or(2),
            evaluate_timeout: self
                .timings
                .evaluate_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_EVALUATE_TIMEOUT),
            max_output_bytes: self
                .max_output_mb
                .map(|mb| mb.saturating_mul(1024 * 1024))
                .unwrap_or(DEFAULT_MAX_OUTPUT_BYTES),
            timings: self.timings.apply(Timings::default()),
        })
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct RawTimings {
    sidebar_settle_ms: Option<u64>,
    discovery_poll_ms: Option<u64>,
    discovery_max_rounds: Option<usize>,
    discovery_stable_rounds: Option<usize>,
    render_settle_ms: Option<u64>,
    materialize_poll_ms: Option<u64>,
    materialize_max_checks: Option<usize>,
    cascade_settle_ms: Option<u64>,
    ready_poll_ms: Option<u64>,
    ready_max_polls: Option<usize>,
    navigate_settle_ms: Option<u64>,
    evaluate_timeout_secs: Option<u64>,
}

impl RawTimings {
    fn merge(self, other: RawTimings) -> RawTimings {
        RawTimings {
            sidebar_settle_ms: other.sidebar_settle_ms.or(self.sidebar_settle_ms),
            discovery_poll_ms: other.discovery_poll_ms.or(self.discovery_poll_ms),
            discovery_max_rounds: other.discovery_max_rounds.or(self.discovery_max_rounds),
            discovery_stable_rounds: other.discovery_stable_rounds.or(self.discovery_stable_rounds),
            render_settle_ms: other.render_settle_ms.or(self.render_settle_ms),
            materialize_poll_ms: other.materialize_poll_ms.or(self.materialize_poll_ms),
            materialize_max_checks: other.materialize_max_checks.or(self.materialize_max_checks),
            cascade_settle_ms: other.cascade_settle_ms.or(self.cascade_settle_ms),
            ready_poll_ms: other.ready_poll_ms.or(self.ready_poll_ms),
            ready_max_polls: other.ready_max_polls.or(self.ready_max_polls),
            navigate_settle_ms: other.navigate_settle_ms.or(self.navigate_settle_ms),
            evaluate_timeout_secs: other.evaluate_timeout_secs.or(self.evaluate_timeout_secs),
        }
    }

    fn apply(&self, mut timings: Timings) -> Timings {
        let ms = Duration::from_millis;
        if let Some(v) = self.sidebar_settle_ms {
            timings.sidebar_settle = ms(v);
        }
        if let Some(v) = self.discovery_poll_ms {
            timings.discovery_poll = ms(v);
        }
        if let Some(v) = self.discovery_max_rounds {
            timings.discovery_max_rounds = v;
        }
        if let Some(v) = self.discovery_stable_rounds {
            timings.discovery_stable_rounds = v;
        }
        if let Some(v) = self.render_settle_ms {
            timings.render_settle = ms(v);
        }
        if let Some(v) = self.materialize_poll_ms {
            timings.materialize_poll = ms(v);
        }
        if let Some(v) = self.materialize_max_checks {
            timings.materialize_max_checks = v;
        }
        if let Some(v) = self.cascade_settle_ms {
            timings.cascade_settle = ms(v);
        }
        if let Some(v) = self.ready_poll_ms {
            timings.ready_poll = ms(v);
        }
        if let Some(v) = self.ready_max_polls {
            timings.ready_max_polls = v;
        }
        if let Some(v) = self.navigate_settle_ms {
            timings.navigate_settle = ms(v);
        }
        timings
    }
}

fn load_raw_config(path: &Path) -> Result<RawConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config = toml::from_str::<RawConfig>(&data)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_without_file() {
        let config = RawConfig::default().resolve().unwrap();
        assert_eq!(config.provider, "gemini");
        assert_eq!(config.formats, vec![OutputFormat::Markdown, OutputFormat::Json]);
        assert_eq!(config.delay, Duration::from_millis(2000));
        assert_eq!(config.browser, BrowserApp::Chrome);
        assert_eq!(config.timings, Timings::default());
        assert_eq!(config.evaluate_timeout, Duration::from_secs(30));
        assert_eq!(config.max_output_bytes, DEFAULT_MAX_OUTPUT_BYTES);
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
provider = "chatgpt"
formats = ["json"]
delay_ms = 500
browser = "brave"
max_output_mb = 8

[timings]
discovery_stable_rounds = 3
navigate_settle_ms = 100
evaluate_timeout_secs = 10
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.provider, "chatgpt");
        assert_eq!(config.formats, vec![OutputFormat::Json]);
        assert_eq!(config.delay, Duration::from_millis(500));
        assert_eq!(config.browser, BrowserApp::Brave);
        assert_eq!(config.timings.discovery_stable_rounds, 3);
        assert_eq!(config.timings.navigate_settle, Duration::from_millis(100));
        assert_eq!(config.timings.discovery_poll, Duration::from_millis(800));
        assert_eq!(config.evaluate_timeout, Duration::from_secs(10));
        assert_eq!(config.max_output_bytes, 8 * 1024 * 1024);
    }

    #[test]
    fn unknown_format_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"formats = ["pdf"]"#).unwrap();
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("pdf"));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/chatharvest.toml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
