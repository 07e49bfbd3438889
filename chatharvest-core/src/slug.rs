use std::collections::{HashMap, HashSet};

use crate::model::ConversationReference;

const MAX_SLUG_LEN: usize = 80;

/// Hands out unique slugs: repeats of a base get `-001`, `-002`, ...,
/// skipping any candidate already issued, including ones that were
/// themselves a base.
#[derive(Default)]
pub struct SlugState {
    counts: HashMap<String, usize>,
    issued: HashSet<String>,
}

impl SlugState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_slug(&mut self, base: &str) -> String {
        let counter = self.counts.entry(base.to_string()).or_insert(0);
        let mut slug = if *counter == 0 {
            base.to_string()
        } else {
            format!("{base}-{counter:03}")
        };
        while self.issued.contains(&slug) {
            *counter += 1;
            slug = format!("{base}-{counter:03}");
        }
        *counter += 1;
        self.issued.insert(slug.clone());
        slug
    }
}

pub fn slugify(input: &str) -> String {
    let mut slug = String::new();
    let mut last_was_dash = false;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_dash = false;
        } else if ch.is_ascii() && !slug.is_empty() && !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
        // Non-ASCII characters are skipped entirely.
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    slug
}

/// Filename stem for a conversation: its label, else the href's last
/// segment, else `untitled`.
pub fn reference_base_name(reference: &ConversationReference) -> String {
    let from_label = slugify(&reference.label);
    if !from_label.is_empty() {
        return from_label;
    }

    let from_href = slugify(&reference.display_title());
    if from_href.is_empty() {
        "untitled".to_string()
    } else {
        from_href
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic_cases() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Trip to Kyoto — ideas"), "trip-to-kyoto-ideas");
        assert_eq!(slugify("foo/bar\\baz"), "foo-bar-baz");
    }

    #[test]
    fn slugify_truncates_and_cleans() {
        let long = "a".repeat(100);
        let slug = slugify(&long);
        assert_eq!(slug.len(), MAX_SLUG_LEN);
        assert!(slug.chars().all(|c| c == 'a'));
    }

    #[test]
    fn slug_state_suffixes_repeats() {
        let mut state = SlugState::new();
        assert_eq!(state.next_slug("chat"), "chat");
        assert_eq!(state.next_slug("chat"), "chat-001");
        assert_eq!(state.next_slug("other"), "other");
        assert_eq!(state.next_slug("chat"), "chat-002");
    }

    #[test]
    fn suffix_never_reuses_an_issued_name() {
        let mut state = SlugState::new();
        assert_eq!(state.next_slug("chat"), "chat");
        assert_eq!(state.next_slug("chat"), "chat-001");
        assert_eq!(state.next_slug("chat-001"), "chat-001-001");
        assert_eq!(state.next_slug("chat-002"), "chat-002");
        assert_eq!(state.next_slug("chat"), "chat-003");
    }

    #[test]
    fn base_name_fallbacks() {
        let labelled = ConversationReference::new("https://gemini.google.com/app/abc", "Rust lifetimes");
        assert_eq!(reference_base_name(&labelled), "rust-lifetimes");

        let unlabelled = ConversationReference::new("https://gemini.google.com/app/7f3a9c", "");
        assert_eq!(reference_base_name(&unlabelled), "7f3a9c");

        let emoji_only = ConversationReference::new("", "🎉");
        assert_eq!(reference_base_name(&emoji_only), "untitled");
    }
}
