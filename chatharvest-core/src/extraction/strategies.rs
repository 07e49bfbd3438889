//! The four extraction strategies, in decreasing order of confidence.
//!
//! Each strategy is split in two: a page script that only collects raw
//! records (tag, class, text, position, role attribute) and a pure
//! `interpret` step that classifies and orders them in Rust.

use std::cmp::Ordering;

use serde::Deserialize;

use super::classify::{classify_region, classify_structural, classify_turn};
use crate::evaluator::{fill_template, js_string, js_string_array, parse_result};
use crate::model::{HarvestOptions, Message, Role};
use crate::profile::SiteProfile;

/// One self-contained heuristic for locating and classifying turns.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Page script collecting this strategy's raw records as JSON.
    fn script(&self, profile: &SiteProfile) -> String;

    /// Turn the script's result into ordered messages. Never fails; an
    /// unusable result is an empty list.
    fn interpret(&self, raw: &str, profile: &SiteProfile, opts: HarvestOptions) -> Vec<Message>;
}

/// The cascade in priority order.
pub fn default_cascade() -> Vec<Box<dyn ExtractionStrategy>> {
    vec![
        Box::new(TurnElements),
        Box::new(PairedRegions),
        Box::new(RoleAttributes),
        Box::new(StructuralFallback),
    ]
}

// Strategy 1

const TURN_ELEMENTS_JS: &str = r#"(function(){
  var sel = @@TURNS@@;
  var human = @@HUMAN@@;
  var nodes = document.querySelectorAll(sel);
  var out = [];
  for (var i = 0; i < nodes.length; i++) {
    var el = nodes[i];
    if (el.parentElement && el.parentElement.closest(sel)) continue;
    out.push({
      tag: el.tagName.toLowerCase(),
      className: typeof el.className === "string" ? el.className : "",
      humanMarker: human ? !!el.querySelector(human) : false,
      text: el.innerText || ""
    });
  }
  return JSON.stringify(out);
})()"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTurn {
    #[serde(default)]
    tag: String,
    #[serde(default)]
    class_name: String,
    #[serde(default)]
    human_marker: bool,
    #[serde(default)]
    text: String,
}

/// One element per turn, recognized by element type or class pattern.
pub struct TurnElements;

impl ExtractionStrategy for TurnElements {
    fn name(&self) -> &'static str {
        "turn-elements"
    }

    fn script(&self, profile: &SiteProfile) -> String {
        fill_template(
            TURN_ELEMENTS_JS,
            &[
                ("@@TURNS@@", js_string(profile.turn_selector)),
                ("@@HUMAN@@", js_string(profile.human_marker_selector)),
            ],
        )
    }

    fn interpret(&self, raw: &str, profile: &SiteProfile, opts: HarvestOptions) -> Vec<Message> {
        let Some(turns) = parse_result::<Vec<RawTurn>>(raw, self.name(), opts) else {
            return Vec::new();
        };

        turns
            .into_iter()
            // One stray character is an icon or a bullet, not a turn.
            .filter(|turn| turn.text.trim().chars().count() > 1)
            .map(|turn| {
                let role = classify_turn(
                    &turn.tag,
                    &turn.class_name,
                    turn.human_marker,
                    profile.human_turn_markers,
                );
                Message::new(role, &turn.text)
            })
            .collect()
    }
}

// Strategy 2

const PAIRED_REGIONS_JS: &str = r#"(function(){
  function collect(sel, kind) {
    var out = [];
    if (!sel) return out;
    var nodes = document.querySelectorAll(sel);
    for (var i = 0; i < nodes.length; i++) {
      var rect = nodes[i].getBoundingClientRect();
      out.push({ kind: kind, top: rect.top + window.scrollY, text: nodes[i].innerText || "" });
    }
    return out;
  }
  return JSON.stringify(collect(@@QUERIES@@, "query").concat(collect(@@RESPONSES@@, "response")));
})()"#;

#[derive(Debug, Deserialize)]
struct RawRegion {
    #[serde(default)]
    kind: String,
    #[serde(default)]
    top: f64,
    #[serde(default)]
    text: String,
}

/// Query and response regions living in separate subtrees, put back in
/// turn order by their vertical position.
pub struct PairedRegions;

impl ExtractionStrategy for PairedRegions {
    fn name(&self) -> &'static str {
        "paired-regions"
    }

    fn script(&self, profile: &SiteProfile) -> String {
        fill_template(
            PAIRED_REGIONS_JS,
            &[
                ("@@QUERIES@@", js_string(profile.query_selector)),
                ("@@RESPONSES@@", js_string(profile.response_selector)),
            ],
        )
    }

    fn interpret(&self, raw: &str, _profile: &SiteProfile, opts: HarvestOptions) -> Vec<Message> {
        let Some(mut regions) = parse_result::<Vec<RawRegion>>(raw, self.name(), opts) else {
            return Vec::new();
        };

        // Stable sort: regions at the same height keep document order.
        regions.sort_by(|a, b| a.top.partial_cmp(&b.top).unwrap_or(Ordering::Equal));

        regions
            .into_iter()
            .map(|region| Message::new(classify_region(&region.kind), &region.text))
            .filter(|message| !message.is_empty())
            .collect()
    }
}

// Strategy 3

const ROLE_ATTRIBUTES_JS: &str = r#"(function(){
  var attr = @@ATTR@@;
  var nodes = document.querySelectorAll("[" + attr + "]");
  var out = [];
  for (var i = 0; i < nodes.length; i++) {
    out.push({ role: nodes[i].getAttribute(attr) || "", text: nodes[i].innerText || "" });
  }
  return JSON.stringify(out);
})()"#;

#[derive(Debug, Deserialize)]
struct RawRoleElement {
    #[serde(default)]
    role: String,
    #[serde(default)]
    text: String,
}

/// Elements carrying an explicit author-role data attribute.
pub struct RoleAttributes;

impl ExtractionStrategy for RoleAttributes {
    fn name(&self) -> &'static str {
        "role-attributes"
    }

    fn script(&self, profile: &SiteProfile) -> String {
        fill_template(ROLE_ATTRIBUTES_JS, &[("@@ATTR@@", js_string(profile.role_attribute))])
    }

    fn interpret(&self, raw: &str, _profile: &SiteProfile, opts: HarvestOptions) -> Vec<Message> {
        let Some(elements) = parse_result::<Vec<RawRoleElement>>(raw, self.name(), opts) else {
            return Vec::new();
        };

        elements
            .into_iter()
            .map(|el| Message::new(Role::from_author_attribute(&el.role), &el.text))
            .filter(|message| !message.is_empty())
            .collect()
    }
}

// Strategy 4

const STRUCTURAL_JS: &str = r#"(function(){
  var candidates = @@CONTAINERS@@;
  var container = null;
  for (var i = 0; i < candidates.length; i++) {
    var el = document.querySelector(candidates[i]);
    if (el && (el.innerText || "").trim()) { container = el; break; }
  }
  if (!container) container = document.querySelector("main") || document.body;
  if (!container) return JSON.stringify({ children: [], text: "" });
  var kids = [];
  for (var j = 0; j < container.children.length; j++) {
    var c = container.children[j];
    kids.push({
      tag: c.tagName.toLowerCase(),
      className: typeof c.className === "string" ? c.className : "",
      text: c.innerText || ""
    });
  }
  return JSON.stringify({ children: kids, text: container.innerText || "" });
})()"#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChild {
    #[serde(default)]
    tag: String,
    #[serde(default)]
    class_name: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct RawContainer {
    #[serde(default)]
    children: Vec<RawChild>,
    #[serde(default)]
    text: String,
}

/// Direct children of the best-guess container, classified lexically. With
/// no usable child, the container's whole text becomes one `Unknown` message.
pub struct StructuralFallback;

impl ExtractionStrategy for StructuralFallback {
    fn name(&self) -> &'static str {
        "structural-fallback"
    }

    fn script(&self, profile: &SiteProfile) -> String {
        fill_template(
            STRUCTURAL_JS,
            &[(
                "@@CONTAINERS@@",
                js_string_array(profile.structural_container_selectors),
            )],
        )
    }

    fn interpret(&self, raw: &str, _profile: &SiteProfile, opts: HarvestOptions) -> Vec<Message> {
        let Some(container) = parse_result::<RawContainer>(raw, self.name(), opts) else {
            return Vec::new();
        };

        let messages: Vec<Message> = container
            .children
            .iter()
            .map(|child| Message::new(classify_structural(&child.tag, &child.class_name), &child.text))
            .filter(|message| !message.is_empty())
            .collect();

        if !messages.is_empty() {
            return messages;
        }

        let dump = Message::new(Role::Unknown, &container.text);
        if dump.is_empty() {
            Vec::new()
        } else {
            vec![dump]
        }
    }
}
