//! Role classification from the raw signals page scripts report.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::Role;

/// Words in a class or tag name that suggest a human-authored block.
static HUMAN_HINT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)user|query|human|prompt|request").expect("valid regex"));

/// Turn element: human when its tag or class carries a human-turn marker or
/// it contains a human marker descendant, assistant otherwise.
pub fn classify_turn(tag: &str, class_name: &str, has_human_descendant: bool, markers: &[&str]) -> Role {
    let tag = tag.to_ascii_lowercase();
    let class_name = class_name.to_ascii_lowercase();
    let marked = markers.iter().any(|marker| {
        let marker = marker.to_ascii_lowercase();
        tag == marker || class_name.contains(&marker)
    });

    if marked || has_human_descendant {
        Role::Human
    } else {
        Role::Assistant
    }
}

/// Structural fallback: a lexical guess over the element's class and tag.
pub fn classify_structural(tag: &str, class_name: &str) -> Role {
    let combined = format!("{class_name} {tag}");
    if HUMAN_HINT.is_match(&combined) {
        Role::Human
    } else {
        Role::Assistant
    }
}

/// Paired regions report which selector matched them.
pub fn classify_region(kind: &str) -> Role {
    match kind {
        "query" => Role::Human,
        "response" => Role::Assistant,
        _ => Role::Unknown,
    }
}
