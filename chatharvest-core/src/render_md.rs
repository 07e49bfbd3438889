use std::fmt::Write;

use crate::model::Message;

/// Markdown transcript: a title heading, then one `## Role` section per
/// message separated by horizontal rules.
pub fn render_markdown(title: &str, messages: &[Message]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", title.trim());

    for message in messages.iter().filter(|m| !m.is_empty()) {
        let _ = writeln!(out, "## {}\n", message.role);
        let _ = writeln!(out, "{}\n", message.content);
        let _ = writeln!(out, "---\n");
    }

    out
}
