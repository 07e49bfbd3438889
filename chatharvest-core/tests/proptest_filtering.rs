use std::collections::HashSet;

use chatharvest_core::discovery::{filter_references, Stabilizer};
use chatharvest_core::model::retain_non_empty;
use chatharvest_core::slug::slugify;
use chatharvest_core::{ConversationReference, Message, Role, SiteProfile};
use proptest::prelude::*;

fn arb_href() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("https://gemini.google.com/app".to_string()),
        Just("https://gemini.google.com/app/".to_string()),
        Just("https://gemini.google.com/app/download".to_string()),
        Just(String::new()),
        "[a-f0-9]{1,4}".prop_map(|id| format!("https://gemini.google.com/app/{id}")),
    ]
}

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Human), Just(Role::Assistant), Just(Role::Unknown)]
}

proptest! {
    /// Property: filtered references are unique, non-empty and never the app root
    #[test]
    fn prop_filter_yields_unique_conversations(
        links in prop::collection::vec((arb_href(), ".{0,12}"), 0..60)
    ) {
        let profile = SiteProfile::gemini();
        let input: Vec<ConversationReference> = links
            .iter()
            .map(|(href, label)| ConversationReference::new(href.clone(), label.clone()))
            .collect();

        let filtered = filter_references(input.clone(), &profile);

        let mut seen = HashSet::new();
        for reference in &filtered {
            prop_assert!(!reference.href.is_empty());
            prop_assert!(!profile.is_app_root(&reference.href));
            prop_assert!(!profile.is_excluded(&reference.href));
            prop_assert!(seen.insert(reference.href.clone()));
        }

        // First-seen order is kept.
        let expected: Vec<String> = {
            let mut firsts = Vec::new();
            for link in &input {
                let href = link.href.trim().to_string();
                if seen.contains(&href) && !firsts.contains(&href) {
                    firsts.push(href);
                }
            }
            firsts
        };
        let actual: Vec<String> = filtered.iter().map(|r| r.href.clone()).collect();
        prop_assert_eq!(actual, expected);
    }

    /// Property: no empty message survives
    #[test]
    fn prop_retained_messages_have_content(
        raw in prop::collection::vec((arb_role(), "[ \t\na-z]{0,8}"), 0..40)
    ) {
        let messages: Vec<Message> = raw
            .into_iter()
            .map(|(role, content)| Message { role, content })
            .collect();
        let kept = retain_non_empty(messages.clone());

        prop_assert!(kept.iter().all(|m| !m.content.trim().is_empty()));
        prop_assert_eq!(kept.len(), messages.iter().filter(|m| !m.content.trim().is_empty()).count());
    }

    /// Property: the stabilizer needs `threshold` repeats after the last change
    #[test]
    fn prop_stabilizer_settles_after_threshold(
        prefix in prop::collection::vec(0u64..5, 0..20),
        threshold in 1usize..8,
    ) {
        let mut stabilizer = Stabilizer::new(threshold);
        for count in &prefix {
            stabilizer.observe(*count);
        }
        // A value outside the prefix range always resets the run.
        let final_count = 100;
        prop_assert!(!stabilizer.observe(final_count));
        for _ in 1..threshold {
            prop_assert!(!stabilizer.observe(final_count));
        }
        prop_assert!(stabilizer.observe(final_count));
    }

    /// Property: slugs are short, lowercase and safe as file names
    #[test]
    fn prop_slugify_is_filename_safe(input in ".{0,200}") {
        let slug = slugify(&input);
        prop_assert!(slug.len() <= 80);
        prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        prop_assert!(!slug.starts_with('-'));
        prop_assert!(!slug.ends_with('-'));
    }
}
