//! The boundary to the live page.
//!
//! Everything the engine knows about the target site comes through
//! [`PageEvaluator::evaluate`]: a script goes in, its textual result comes
//! out. Implementations fail soft, so callers treat `""` exactly like
//! "nothing matched".

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::model::HarvestOptions;

/// Runs page scripts against the currently displayed document.
#[async_trait]
pub trait PageEvaluator: Send + Sync {
    /// Evaluate `script` and return its result as text. Returns an empty
    /// string on timeout, transport error or a script that threw.
    async fn evaluate(&self, script: &str) -> String;
}

/// Quote `value` as a JavaScript string literal.
pub fn js_string(value: &str) -> String {
    // JSON string syntax is a subset of JS string literal syntax.
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Quote a list of selectors as a JavaScript array literal.
pub fn js_string_array(values: &[&str]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

/// `@@NAME@@` marks a value slot in a page-script template.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"@@[A-Z][A-Z_]*@@").expect("valid regex"));

/// Substitute `@@NAME@@` placeholders in a page-script template in a single
/// pass: substituted values are never scanned again. Placeholders without a
/// value are left in place.
pub fn fill_template(template: &str, vars: &[(&str, String)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let token = &caps[0];
            vars.iter()
                .find(|(name, _)| *name == token)
                .map(|(_, value)| value.clone())
                .unwrap_or_else(|| token.to_string())
        })
        .into_owned()
}

/// Whether `script` still contains an unfilled `@@NAME@@` slot.
pub fn has_unfilled_placeholder(script: &str) -> bool {
    PLACEHOLDER.is_match(script)
}

/// Parse a structured evaluation result. Empty or malformed input yields
/// `None`; the cause is logged at warn level only in verbose mode.
pub fn parse_result<T: DeserializeOwned>(raw: &str, what: &str, opts: HarvestOptions) -> Option<T> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        debug!(what, "empty evaluation result");
        return None;
    }

    match serde_json::from_str(trimmed) {
        Ok(value) => Some(value),
        Err(err) => {
            if opts.verbose {
                warn!(what, error = %err, "failed to parse evaluation result");
            } else {
                debug!(what, error = %err, "failed to parse evaluation result");
            }
            None
        }
    }
}

/// Parse a numeric evaluation result (counts, heights).
pub fn parse_number(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    trimmed
        .parse::<u64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().filter(|n| *n >= 0.0).map(|n| n as u64))
}

/// Scripted page for tests.
///
/// Responses are keyed by the exact script text. A script registered with a
/// sequence yields one entry per call and keeps repeating the last one once
/// the sequence is exhausted. Unregistered scripts evaluate to `""`.
#[derive(Default)]
pub struct ScriptedEvaluator {
    responses: Mutex<HashMap<String, VecDeque<String>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer `script` with `response`.
    pub fn respond(&self, script: impl Into<String>, response: impl Into<String>) -> &Self {
        let response: String = response.into();
        self.respond_sequence(script, [response])
    }

    /// Answer successive evaluations of `script` from `responses`.
    pub fn respond_sequence<I, S>(&self, script: impl Into<String>, responses: I) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue = responses.into_iter().map(Into::into).collect();
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(script.into(), queue);
        self
    }

    /// Every script evaluated so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// How many times `script` was evaluated.
    pub fn call_count(&self, script: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|s| s.as_str() == script)
            .count()
    }
}

#[async_trait]
impl PageEvaluator for ScriptedEvaluator {
    async fn evaluate(&self, script: &str) -> String {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(script.to_string());

        let mut responses = self.responses.lock().unwrap_or_else(PoisonError::into_inner);
        match responses.get_mut(script) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn js_string_escapes_quotes_and_newlines() {
        assert_eq!(js_string(r#"a"b"#), r#""a\"b""#);
        assert_eq!(js_string("line\nbreak"), r#""line\nbreak""#);
    }

    #[test]
    fn parse_number_accepts_floats() {
        assert_eq!(parse_number("42\n"), Some(42));
        assert_eq!(parse_number("1280.5"), Some(1280));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("missing value"), None);
    }

    #[test]
    fn parse_result_is_none_on_garbage() {
        #[derive(Deserialize)]
        struct Row {
            #[allow(dead_code)]
            text: String,
        }
        let opts = HarvestOptions::default();
        assert!(parse_result::<Vec<Row>>("not json", "rows", opts).is_none());
        assert!(parse_result::<Vec<Row>>("", "rows", opts).is_none());
        assert_eq!(
            parse_result::<Vec<Row>>(r#"[{"text":"a"}]"#, "rows", opts).map(|r| r.len()),
            Some(1)
        );
    }

    #[test]
    fn fill_template_is_single_pass() {
        let template = "find(@@SEL@@, @@ROOT@@)";
        let filled = fill_template(
            template,
            &[
                ("@@SEL@@", js_string(".card__title @@ROOT@@")),
                ("@@ROOT@@", js_string("main")),
            ],
        );
        assert_eq!(filled, r#"find(".card__title @@ROOT@@", "main")"#);
    }

    #[test]
    fn unknown_placeholders_stay_visible() {
        let filled = fill_template("go(@@URL@@, @@MISSING@@)", &[("@@URL@@", js_string("x"))]);
        assert_eq!(filled, r#"go("x", @@MISSING@@)"#);
        assert!(has_unfilled_placeholder(&filled));
        assert!(!has_unfilled_placeholder(r#"document.querySelector(".block__elem--mod")"#));
    }

    #[tokio::test]
    async fn scripted_evaluator_repeats_last_response() {
        let page = ScriptedEvaluator::new();
        page.respond_sequence("count()", ["1", "2"]);

        assert_eq!(page.evaluate("count()").await, "1");
        assert_eq!(page.evaluate("count()").await, "2");
        assert_eq!(page.evaluate("count()").await, "2");
        assert_eq!(page.evaluate("other()").await, "");
        assert_eq!(page.call_count("count()"), 3);
        assert_eq!(page.calls().len(), 4);
    }
}
