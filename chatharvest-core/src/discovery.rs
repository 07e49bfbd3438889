//! Chat discovery over a virtualized sidebar list.
//!
//! The sidebar only mounts the rows currently in view, so a single read
//! misses most conversations. Discovery keeps scrolling whichever container
//! is scrollable and polls the number of matched links until it stops
//! changing for a run of consecutive observations.

use std::collections::HashSet;

use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::evaluator::{fill_template, js_string, js_string_array, parse_number, parse_result, PageEvaluator};
use crate::model::{ConversationReference, HarvestOptions};
use crate::profile::SiteProfile;
use crate::timing::Timings;

/// Page scripts used by discovery. Public so scripted pages can answer them.
pub mod scripts {
    use super::*;

    const OPEN_SIDEBAR_JS: &str = r#"(function(){
  if (document.querySelectorAll(@@LINKS@@).length > 0) return "open";
  var toggles = @@TOGGLES@@;
  for (var i = 0; i < toggles.length; i++) {
    var el = document.querySelector(toggles[i]);
    if (el) { el.click(); return "clicked"; }
  }
  return "none";
})()"#;

    const LINK_COUNT_JS: &str = r#"(function(){
  return String(document.querySelectorAll(@@LINKS@@).length);
})()"#;

    const SCROLL_STEP_JS: &str = r#"(function(){
  var known = @@CONTAINERS@@;
  for (var i = 0; i < known.length; i++) {
    var candidates = document.querySelectorAll(known[i]);
    for (var j = 0; j < candidates.length; j++) {
      var el = candidates[j];
      if (el.scrollHeight > el.clientHeight) {
        el.scrollTop = el.scrollHeight;
        return "known:" + known[i];
      }
    }
  }
  var root = document.querySelector(@@SCAN_ROOT@@) || document.body;
  if (!root) return "none";
  var all = root.querySelectorAll("*");
  for (var k = 0; k < all.length; k++) {
    var node = all[k];
    if (node.scrollHeight > node.clientHeight + @@MARGIN@@) {
      node.scrollTop = node.scrollHeight;
      return "scan:" + node.tagName.toLowerCase();
    }
  }
  return "none";
})()"#;

    const READ_LINKS_JS: &str = r#"(function(){
  var links = document.querySelectorAll(@@LINKS@@);
  var out = [];
  for (var i = 0; i < links.length; i++) {
    var a = links[i];
    var text = (a.innerText || a.textContent || "").trim();
    out.push({ href: a.href || "", label: text.split("\n")[0].trim() });
  }
  return JSON.stringify(out);
})()"#;

    pub fn open_sidebar(profile: &SiteProfile) -> String {
        fill_template(
            OPEN_SIDEBAR_JS,
            &[
                ("@@LINKS@@", js_string(profile.chat_link_selector)),
                ("@@TOGGLES@@", js_string_array(profile.sidebar_toggle_selectors)),
            ],
        )
    }

    pub fn link_count(profile: &SiteProfile) -> String {
        fill_template(LINK_COUNT_JS, &[("@@LINKS@@", js_string(profile.chat_link_selector))])
    }

    pub fn scroll_step(profile: &SiteProfile) -> String {
        fill_template(
            SCROLL_STEP_JS,
            &[
                ("@@CONTAINERS@@", js_string_array(profile.scroll_container_selectors)),
                ("@@SCAN_ROOT@@", js_string(profile.scroll_scan_root)),
                ("@@MARGIN@@", profile.scroll_margin_px.to_string()),
            ],
        )
    }

    pub fn read_links(profile: &SiteProfile) -> String {
        fill_template(READ_LINKS_JS, &[("@@LINKS@@", js_string(profile.chat_link_selector))])
    }
}

/// Tracks consecutive unchanged observations of a growing count.
#[derive(Debug, Clone)]
pub struct Stabilizer {
    threshold: usize,
    previous: Option<u64>,
    stable: usize,
}

impl Stabilizer {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold: threshold.max(1),
            previous: None,
            stable: 0,
        }
    }

    /// Record a count. Returns true once the count has been unchanged for
    /// `threshold` consecutive observations.
    pub fn observe(&mut self, count: u64) -> bool {
        match self.previous {
            Some(previous) if previous == count => self.stable += 1,
            _ => self.stable = 0,
        }
        self.previous = Some(count);
        self.is_stable()
    }

    pub fn is_stable(&self) -> bool {
        self.stable >= self.threshold
    }

    pub fn stable_rounds(&self) -> usize {
        self.stable
    }
}

#[derive(Debug, Deserialize)]
struct RawLink {
    #[serde(default)]
    href: String,
    #[serde(default)]
    label: String,
}

/// Drop the app root, excluded pages and empty hrefs, then deduplicate by
/// href keeping the first occurrence.
pub fn filter_references<I>(links: I, profile: &SiteProfile) -> Vec<ConversationReference>
where
    I: IntoIterator<Item = ConversationReference>,
{
    let mut seen = HashSet::new();
    links
        .into_iter()
        .map(|link| ConversationReference::new(link.href.trim(), link.label.trim()))
        .filter(|link| !link.href.is_empty())
        .filter(|link| !profile.is_app_root(&link.href))
        .filter(|link| !profile.is_excluded(&link.href))
        .filter(|link| seen.insert(link.href.clone()))
        .collect()
}

async fn read_count(evaluator: &dyn PageEvaluator, script: &str) -> u64 {
    parse_number(&evaluator.evaluate(script).await).unwrap_or(0)
}

/// Enumerate every conversation in the sidebar. Never fails: an unreadable
/// page yields an empty list.
pub async fn discover(
    evaluator: &dyn PageEvaluator,
    profile: &SiteProfile,
    timings: &Timings,
    opts: HarvestOptions,
) -> Vec<ConversationReference> {
    let sidebar = evaluator.evaluate(&scripts::open_sidebar(profile)).await;
    debug!(provider = profile.identity, sidebar = sidebar.trim(), "sidebar toggle");
    sleep(timings.sidebar_settle).await;

    let count_script = scripts::link_count(profile);
    let scroll_script = scripts::scroll_step(profile);

    let mut stabilizer = Stabilizer::new(timings.discovery_stable_rounds);
    stabilizer.observe(read_count(evaluator, &count_script).await);

    let mut rounds = 0usize;
    while rounds < timings.discovery_max_rounds {
        rounds += 1;
        let target = evaluator.evaluate(&scroll_script).await;
        sleep(timings.discovery_poll).await;

        let count = read_count(evaluator, &count_script).await;
        let settled = stabilizer.observe(count);
        debug!(
            round = rounds,
            count,
            stable = stabilizer.stable_rounds(),
            target = target.trim(),
            "discovery round"
        );
        if settled {
            break;
        }
    }

    if !stabilizer.is_stable() {
        warn!(
            rounds,
            "conversation list still growing at the round limit, using what is loaded"
        );
    }

    let raw = evaluator.evaluate(&scripts::read_links(profile)).await;
    let Some(links) = parse_result::<Vec<RawLink>>(&raw, "conversation links", opts) else {
        return Vec::new();
    };

    let references = filter_references(
        links
            .into_iter()
            .map(|link| ConversationReference::new(link.href, link.label)),
        profile,
    );
    info!(
        provider = profile.identity,
        rounds,
        conversations = references.len(),
        "discovery finished"
    );
    references
}
