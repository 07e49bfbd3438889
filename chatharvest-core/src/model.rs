use std::fmt;

use serde::{Deserialize, Serialize};

/// Who authored a turn. `Unknown` is a legitimate answer when nothing on the
/// page discriminates human from assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Assistant,
    Unknown,
}

impl Role {
    /// Map an author-role attribute value (`data-message-author-role`).
    pub fn from_author_attribute(value: &str) -> Role {
        if value.trim().eq_ignore_ascii_case("user") {
            Role::Human
        } else {
            Role::Assistant
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Human => "Human",
            Role::Assistant => "Assistant",
            Role::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// One conversational turn: flattened, trimmed visible text plus its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl AsRef<str>) -> Self {
        Self {
            role,
            content: content.as_ref().trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Ordered messages of one conversation, earliest first. Empty means no
/// extraction strategy matched.
pub type ExtractionResult = Vec<Message>;

/// Drop messages whose trimmed content is empty.
pub fn retain_non_empty(messages: Vec<Message>) -> Vec<Message> {
    messages.into_iter().filter(|m| !m.is_empty()).collect()
}

/// A conversation found in the sidebar. `href` identifies it; `label` is the
/// display title and may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationReference {
    pub href: String,
    pub label: String,
}

impl ConversationReference {
    pub fn new(href: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            label: label.into(),
        }
    }

    /// Label if present, otherwise the last path segment of the href.
    pub fn display_title(&self) -> String {
        let label = self.label.trim();
        if !label.is_empty() {
            return label.to_string();
        }
        self.href
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

/// Per-call switches. Passed explicitly into discovery and extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct HarvestOptions {
    /// Log recoverable page-level failures at warn level instead of debug.
    pub verbose: bool,
}
