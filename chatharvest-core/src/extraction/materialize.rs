//! Scroll-to-bottom until lazily rendered history stops growing.

use tokio::time::sleep;
use tracing::debug;

use crate::evaluator::{fill_template, js_string_array, parse_number, PageEvaluator};
use crate::profile::SiteProfile;
use crate::timing::Timings;

const LOCATE_CONTAINER_JS: &str = r#"var candidates = @@CONTAINERS@@;
  var el = null;
  for (var i = 0; i < candidates.length; i++) {
    var c = document.querySelector(candidates[i]);
    if (c && c.scrollHeight > c.clientHeight) { el = c; break; }
  }
  if (!el) el = document.scrollingElement || document.documentElement;"#;

const SCROLL_BOTTOM_JS: &str = r#"(function(){
  @@LOCATE@@
  el.scrollTop = el.scrollHeight;
  return String(el.scrollHeight);
})()"#;

const SCROLL_TOP_JS: &str = r#"(function(){
  @@LOCATE@@
  el.scrollTop = 0;
  return "ok";
})()"#;

fn with_container(template: &str, profile: &SiteProfile) -> String {
    let locate = fill_template(
        LOCATE_CONTAINER_JS,
        &[(
            "@@CONTAINERS@@",
            js_string_array(profile.message_container_selectors),
        )],
    );
    fill_template(template, &[("@@LOCATE@@", locate)])
}

pub fn scroll_bottom_script(profile: &SiteProfile) -> String {
    with_container(SCROLL_BOTTOM_JS, profile)
}

pub fn scroll_top_script(profile: &SiteProfile) -> String {
    with_container(SCROLL_TOP_JS, profile)
}

/// Scroll the message container to its maximum until two consecutive checks
/// report the same maximum, then scroll back to the top. Bounded by
/// `materialize_max_checks`; an unreadable height ends the loop. Returns the
/// number of checks made.
pub async fn materialize(evaluator: &dyn PageEvaluator, profile: &SiteProfile, timings: &Timings) -> usize {
    let bottom = scroll_bottom_script(profile);
    let mut previous: Option<u64> = None;
    let mut checks = 0usize;

    while checks < timings.materialize_max_checks {
        checks += 1;
        let Some(height) = parse_number(&evaluator.evaluate(&bottom).await) else {
            debug!(checks, "scroll height unreadable, stopping");
            break;
        };
        if previous == Some(height) {
            debug!(checks, height, "content fully materialized");
            break;
        }
        previous = Some(height);
        sleep(timings.materialize_poll).await;
    }

    evaluator.evaluate(&scroll_top_script(profile)).await;
    checks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::ScriptedEvaluator;

    #[tokio::test(start_paused = true)]
    async fn stops_after_two_equal_heights() {
        let profile = SiteProfile::gemini();
        let page = ScriptedEvaluator::new();
        page.respond_sequence(scroll_bottom_script(&profile), ["900", "1800", "2400", "2400", "3000"]);

        let checks = materialize(&page, &profile, &Timings::default()).await;

        assert_eq!(checks, 4);
        assert_eq!(page.call_count(&scroll_top_script(&profile)), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_when_height_keeps_growing() {
        let profile = SiteProfile::gemini();
        let page = ScriptedEvaluator::new();
        let heights: Vec<String> = (1..=100).map(|n| (n * 100).to_string()).collect();
        page.respond_sequence(scroll_bottom_script(&profile), heights);
        let timings = Timings {
            materialize_max_checks: 7,
            ..Timings::default()
        };

        assert_eq!(materialize(&page, &profile, &timings).await, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn dead_bridge_ends_immediately() {
        let profile = SiteProfile::chatgpt();
        let page = ScriptedEvaluator::new();
        assert_eq!(materialize(&page, &profile, &Timings::default()).await, 1);
    }
}
