//! End-to-end discovery and extraction against a scripted page.

use chatharvest_core::discovery::{discover, scripts};
use chatharvest_core::extraction::materialize::scroll_bottom_script;
use chatharvest_core::extraction::{
    extract, ExtractionStrategy, PairedRegions, RoleAttributes, StructuralFallback, TurnElements,
};
use chatharvest_core::{
    HarvestOptions, PageContext, Provider, Registry, Role, ScriptedEvaluator, SiteProfile,
    SiteProvider, Timings,
};
use serde_json::json;

fn links_json(ids: impl IntoIterator<Item = usize>) -> String {
    let mut links = vec![json!({"href": "https://gemini.google.com/app", "label": "New chat"})];
    for id in ids {
        links.push(json!({
            "href": format!("https://gemini.google.com/app/c{id}"),
            "label": format!("Chat {id}"),
        }));
    }
    serde_json::to_string(&links).unwrap()
}

#[tokio::test(start_paused = true)]
async fn discovery_waits_for_five_unchanged_counts() {
    let profile = SiteProfile::gemini();
    let page = ScriptedEvaluator::new();
    let count = scripts::link_count(&profile);
    page.respond_sequence(&count, ["3", "5", "5", "7", "7", "7", "7", "7", "7", "9"]);
    page.respond(scripts::read_links(&profile), links_json(1..=7));

    let found = discover(&page, &profile, &Timings::default(), HarvestOptions::default()).await;

    assert_eq!(page.call_count(&count), 9);
    assert_eq!(found.len(), 7);
}

#[tokio::test(start_paused = true)]
async fn discovery_returns_every_loaded_conversation() {
    let profile = SiteProfile::gemini();
    let page = ScriptedEvaluator::new();
    page.respond_sequence(scripts::link_count(&profile), ["3", "10"]);
    // Duplicate rows show up while the list re-renders.
    let mut ids: Vec<usize> = (1..=10).collect();
    ids.extend([4, 9]);
    page.respond(scripts::read_links(&profile), links_json(ids));

    let found = discover(&page, &profile, &Timings::default(), HarvestOptions::default()).await;

    assert_eq!(found.len(), 10);
    assert_eq!(found[0].href, "https://gemini.google.com/app/c1");
    assert_eq!(found[9].label, "Chat 10");
    assert_eq!(page.call_count(&scripts::scroll_step(&profile)), 6);
}

#[tokio::test(start_paused = true)]
async fn discovery_on_dead_page_is_empty() {
    let profile = SiteProfile::chatgpt();
    let page = ScriptedEvaluator::new();
    let timings = Timings {
        discovery_max_rounds: 10,
        ..Timings::default()
    };

    let found = discover(&page, &profile, &timings, HarvestOptions { verbose: true }).await;

    assert!(found.is_empty());
}

#[tokio::test(start_paused = true)]
async fn extraction_stops_at_first_matching_strategy() {
    let profile = SiteProfile::gemini();
    let page = ScriptedEvaluator::new();
    page.respond_sequence(scroll_bottom_script(&profile), ["1200", "2400", "2400"]);
    let turns = json!([
        {"tag": "user-query", "className": "", "humanMarker": false, "text": "Hi"},
        {"tag": "model-response", "className": "", "humanMarker": false, "text": "  Hello!  "},
        {"tag": "model-response", "className": "", "humanMarker": false, "text": "•"},
        {"tag": "user-query", "className": "", "humanMarker": false, "text": "Bye"},
    ]);
    page.respond(TurnElements.script(&profile), turns.to_string());

    let messages = extract(&page, &profile, &Timings::default(), HarvestOptions::default()).await;

    let pairs: Vec<(Role, &str)> = messages
        .iter()
        .map(|m| (m.role, m.content.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            (Role::Human, "Hi"),
            (Role::Assistant, "Hello!"),
            (Role::Human, "Bye"),
        ]
    );
    assert_eq!(page.call_count(&PairedRegions.script(&profile)), 0);
    assert_eq!(page.call_count(&RoleAttributes.script(&profile)), 0);
    assert_eq!(page.call_count(&StructuralFallback.script(&profile)), 0);
}

#[tokio::test(start_paused = true)]
async fn extraction_falls_through_to_role_attributes() {
    let profile = SiteProfile::chatgpt();
    let page = ScriptedEvaluator::new();
    let roles = json!([
        {"role": "user", "text": "What is 2+2?"},
        {"role": "assistant", "text": "4"},
    ]);
    page.respond(RoleAttributes.script(&profile), roles.to_string());

    let messages = extract(&page, &profile, &Timings::default(), HarvestOptions::default()).await;

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::Human);
    assert_eq!(messages[1].content, "4");
    assert_eq!(page.call_count(&TurnElements.script(&profile)), 1);
    assert_eq!(page.call_count(&StructuralFallback.script(&profile)), 0);
}

#[tokio::test(start_paused = true)]
async fn provider_from_registry_drives_the_page() {
    let registry = Registry::builtin();
    let provider = registry.resolve("Gemini").unwrap();
    assert_eq!(provider.identity(), "gemini");

    let profile = SiteProfile::gemini();
    let page = ScriptedEvaluator::new();
    page.respond(chatharvest_core::signin::signed_in_script(&profile), "1");
    let timings = Timings::default();
    let ctx = PageContext::new(&page, &timings);

    assert!(provider.is_signed_in(&ctx).await);

    let standalone = SiteProvider::new(SiteProfile::chatgpt());
    assert!(!standalone.is_signed_in(&ctx).await);
}
