use tracing::debug;

use crate::evaluator::{fill_template, js_string, PageEvaluator};
use crate::profile::SiteProfile;

const SIGNED_IN_JS: &str = r#"(function(){
  return document.querySelector(@@SELECTOR@@) ? "0" : "1";
})()"#;

pub fn signed_in_script(profile: &SiteProfile) -> String {
    fill_template(SIGNED_IN_JS, &[("@@SELECTOR@@", js_string(profile.sign_in_selector))])
}

/// True when the page shows no sign-in affordance. A failed evaluation reads
/// as signed out, so a dead bridge stops the run before any export work.
pub async fn is_signed_in(evaluator: &dyn PageEvaluator, profile: &SiteProfile) -> bool {
    let answer = evaluator.evaluate(&signed_in_script(profile)).await;
    debug!(provider = profile.identity, answer = answer.trim(), "sign-in probe");
    answer.trim() == "1"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::ScriptedEvaluator;

    #[tokio::test]
    async fn probe_reads_page_answer() {
        let profile = SiteProfile::gemini();
        let page = ScriptedEvaluator::new();
        page.respond(signed_in_script(&profile), "1");
        assert!(is_signed_in(&page, &profile).await);

        page.respond(signed_in_script(&profile), "0");
        assert!(!is_signed_in(&page, &profile).await);
    }

    #[tokio::test]
    async fn failed_evaluation_is_not_signed_in() {
        let profile = SiteProfile::chatgpt();
        let page = ScriptedEvaluator::new();
        assert!(!is_signed_in(&page, &profile).await);
    }
}
