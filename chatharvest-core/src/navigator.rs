use tokio::time::sleep;
use tracing::{debug, warn};

use crate::evaluator::{fill_template, js_string, PageEvaluator};
use crate::timing::Timings;

pub const READY_STATE_JS: &str = "document.readyState";
pub const CURRENT_URL_JS: &str = "window.location.href";
pub const DOCUMENT_TITLE_JS: &str = "document.title";

const SET_LOCATION_JS: &str = r#"(function(){
  window.location.href = @@URL@@;
  return "ok";
})()"#;

pub fn set_location_script(url: &str) -> String {
    fill_template(SET_LOCATION_JS, &[("@@URL@@", js_string(url))])
}

/// Point the page at `url` and wait until the new document reports ready,
/// then for the settle interval. Gives up polling after `ready_max_polls`.
pub async fn navigate(evaluator: &dyn PageEvaluator, url: &str, timings: &Timings) {
    debug!(url, "navigating");
    evaluator.evaluate(&set_location_script(url)).await;

    let mut ready = false;
    for poll in 1..=timings.ready_max_polls {
        // The old document may still answer "complete" right after the
        // location change, so always wait before the first read.
        sleep(timings.ready_poll).await;
        let state = evaluator.evaluate(READY_STATE_JS).await;
        if state.trim() == "complete" {
            debug!(poll, "document ready");
            ready = true;
            break;
        }
    }

    if !ready {
        warn!(url, polls = timings.ready_max_polls, "page never reported ready, continuing");
    }

    sleep(timings.navigate_settle).await;
}

/// Address and title of the page currently displayed. Empty strings when
/// the bridge cannot answer.
pub async fn current_page(evaluator: &dyn PageEvaluator) -> (String, String) {
    let url = evaluator.evaluate(CURRENT_URL_JS).await.trim().to_string();
    let title = evaluator.evaluate(DOCUMENT_TITLE_JS).await.trim().to_string();
    (url, title)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::ScriptedEvaluator;

    #[test]
    fn location_script_quotes_url() {
        let script = set_location_script(r#"https://example.com/a"b"#);
        assert!(script.contains(r#"window.location.href = "https://example.com/a\"b";"#));
    }

    #[tokio::test(start_paused = true)]
    async fn navigate_stops_polling_once_ready() {
        let page = ScriptedEvaluator::new();
        page.respond_sequence(READY_STATE_JS, ["loading", "interactive", "complete"]);

        navigate(&page, "https://example.com/chat", &Timings::default()).await;

        assert_eq!(page.call_count(READY_STATE_JS), 3);
        assert_eq!(page.call_count(&set_location_script("https://example.com/chat")), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn navigate_is_bounded_when_page_never_loads() {
        let page = ScriptedEvaluator::new();
        let timings = Timings {
            ready_max_polls: 4,
            ..Timings::default()
        };

        navigate(&page, "https://example.com/", &timings).await;

        assert_eq!(page.call_count(READY_STATE_JS), 4);
    }

    #[tokio::test]
    async fn current_page_reads_url_and_title() {
        let page = ScriptedEvaluator::new();
        page.respond(CURRENT_URL_JS, "https://chatgpt.com/c/42\n");
        page.respond(DOCUMENT_TITLE_JS, " Budget review ");

        let (url, title) = current_page(&page).await;

        assert_eq!(url, "https://chatgpt.com/c/42");
        assert_eq!(title, "Budget review");
    }
}
