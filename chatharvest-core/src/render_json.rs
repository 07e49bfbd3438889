use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{HarvestError, Result};
use crate::model::Message;

/// Document written for the JSON export format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationExport {
    pub title: String,
    pub url: String,
    pub exported_at: DateTime<Utc>,
    pub messages: Vec<Message>,
}

impl ConversationExport {
    pub fn new(title: &str, url: &str, messages: &[Message], exported_at: DateTime<Utc>) -> Self {
        Self {
            title: title.trim().to_string(),
            url: url.to_string(),
            exported_at,
            messages: messages.iter().filter(|m| !m.is_empty()).cloned().collect(),
        }
    }
}

/// Serialize with `indent` spaces per level; zero gives compact output.
/// The result always ends with a newline.
pub fn render_json(export: &ConversationExport, indent: usize) -> Result<String> {
    let mut buf = Vec::new();

    if indent > 0 {
        let indent = vec![b' '; indent];
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_slice());
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        export
            .serialize(&mut serializer)
            .map_err(|e| HarvestError::json("conversation export", e))?;
    } else {
        serde_json::to_writer(&mut buf, export)
            .map_err(|e| HarvestError::json("conversation export", e))?;
    }

    buf.push(b'\n');
    String::from_utf8(buf).map_err(|e| HarvestError::config(format!("export is not utf-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;
    use chrono::TimeZone;

    fn sample() -> ConversationExport {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        ConversationExport::new(
            " Trip plan ",
            "https://gemini.google.com/app/abc",
            &[
                Message::new(Role::Human, "Hi"),
                Message {
                    role: Role::Assistant,
                    content: " ".into(),
                },
                Message::new(Role::Assistant, "Hello!"),
            ],
            at,
        )
    }

    #[test]
    fn uses_camel_case_keys_and_lowercase_roles() {
        let json = render_json(&sample(), 2).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["title"], "Trip plan");
        assert_eq!(value["exportedAt"], "2025-03-01T12:00:00Z");
        assert_eq!(value["messages"].as_array().unwrap().len(), 2);
        assert_eq!(value["messages"][0]["role"], "human");
        assert!(json.contains("\n  \"title\""));
        assert!(json.ends_with('\n'));
    }

    #[test]
    fn zero_indent_is_compact() {
        let json = render_json(&sample(), 0).unwrap();
        assert_eq!(json.lines().count(), 1);
        let back: ConversationExport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());
    }
}
