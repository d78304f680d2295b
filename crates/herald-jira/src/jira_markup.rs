//! Telegram-HTML markup helpers for issue messages.

use crate::jira_event::JiraWebhookEvent;

/// Unicode combining long stroke overlay.
pub const STRIKE_MARKER: char = '\u{0336}';

/// Renders `text` struck through by placing a combining stroke before every
/// character and one after the last. `"abc"` yields four markers.
pub fn strike(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut struck = String::with_capacity(text.len() * 3 + STRIKE_MARKER.len_utf8());
    for character in text.chars() {
        struck.push(STRIKE_MARKER);
        struck.push(character);
    }
    struck.push(STRIKE_MARKER);
    struck
}

/// Browsable issue URL derived from the issue's API self link.
///
/// Only scheme and authority of the self link are kept. Returns an empty
/// string when the self link is not an absolute URL with a host.
pub fn issue_url(event: &JiraWebhookEvent) -> String {
    let Ok(parsed) = url::Url::parse(event.issue.self_link.trim()) else {
        return String::new();
    };
    let Some(host) = parsed.host_str() else {
        return String::new();
    };
    let port = parsed
        .port()
        .map(|port| format!(":{port}"))
        .unwrap_or_default();
    format!(
        "{}://{}{}/browse/{}",
        parsed.scheme(),
        host,
        port,
        event.issue.key
    )
}

/// Escapes the characters Telegram HTML treats as markup.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for character in text.chars() {
        match character {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn anchor(href: &str, text: &str) -> String {
    format!("<a href=\"{href}\">{text}</a>")
}

/// Anchor to the issue with its summary as link text.
pub fn issue_link(event: &JiraWebhookEvent) -> String {
    anchor(&issue_url(event), &event.issue.fields.summary)
}

/// Appends the event's trailing comment on a new line when one is present.
pub fn with_comment(text: String, event: &JiraWebhookEvent) -> String {
    if event.comment.body.is_empty() {
        return text;
    }
    format!("{text}\n{}", event.comment.body)
}
