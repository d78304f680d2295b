//! Jira webhook payload model.
//!
//! Mirrors the subset of the Jira webhook body that message composition reads.
//! Nested objects are optional on the wire and may be `null`; missing pieces
//! deserialize to their defaults so classification stays total over partial
//! deliveries. Unknown fields are ignored.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
/// Enumerates supported `JiraEventError` values.
pub enum JiraEventError {
    #[error("failed to parse jira webhook payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("jira webhook payload must be a JSON object")]
    NotAnObject,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
/// Public struct `JiraWebhookEvent` used across Herald components.
pub struct JiraWebhookEvent {
    #[serde(rename = "webhookEvent", default, deserialize_with = "lenient_text")]
    pub webhook_event: String,
    #[serde(
        default,
        alias = "issueEventTypeName",
        deserialize_with = "lenient_text"
    )]
    pub issue_event_type_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: JiraUser,
    #[serde(default, deserialize_with = "null_as_default")]
    pub issue: JiraIssue,
    #[serde(default, deserialize_with = "null_as_default")]
    pub changelog: JiraChangelog,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment: JiraComment,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JiraUser {
    #[serde(rename = "displayName", default, deserialize_with = "lenient_text")]
    pub display_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
/// Public struct `JiraIssue` used across Herald components.
pub struct JiraIssue {
    #[serde(default, deserialize_with = "lenient_text")]
    pub key: String,
    /// Machine API link, e.g. `https://jira.example.com/rest/api/2/issue/10002`.
    #[serde(rename = "self", default, deserialize_with = "lenient_text")]
    pub self_link: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: JiraIssueFields,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JiraIssueFields {
    #[serde(default, deserialize_with = "lenient_text")]
    pub summary: String,
    #[serde(rename = "attachment", default, deserialize_with = "null_as_default")]
    pub attachments: Vec<JiraAttachment>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub worklog: JiraWorklogPage,
    #[serde(rename = "timetracking", default, deserialize_with = "null_as_default")]
    pub time_tracking: JiraTimeTracking,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
/// Public struct `JiraAttachment` used across Herald components.
pub struct JiraAttachment {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub filename: String,
    #[serde(rename = "mimeType", default, deserialize_with = "lenient_text")]
    pub mime_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: u64,
    /// Download URL of the attachment body.
    #[serde(default, deserialize_with = "lenient_text")]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JiraWorklogPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub worklogs: Vec<JiraWorklog>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JiraWorklog {
    #[serde(default, deserialize_with = "lenient_text")]
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JiraTimeTracking {
    #[serde(rename = "remainingEstimate", default, deserialize_with = "lenient_text")]
    pub remaining_estimate: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JiraChangelog {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<JiraChangelogItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
/// One field-level change inside a changelog.
///
/// `from`/`to` carry the raw machine values. A JSON `null` and a missing key
/// both mean the value did not exist on that side of the change; an empty
/// string is still a present value.
pub struct JiraChangelogItem {
    #[serde(default, deserialize_with = "lenient_text")]
    pub field: String,
    #[serde(default)]
    pub from: Option<Value>,
    #[serde(rename = "fromString", default, deserialize_with = "lenient_text")]
    pub from_text: String,
    #[serde(default)]
    pub to: Option<Value>,
    #[serde(rename = "toString", default, deserialize_with = "lenient_text")]
    pub to_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JiraComment {
    #[serde(default, deserialize_with = "lenient_text")]
    pub body: String,
}

impl JiraChangelogItem {
    pub fn has_from(&self) -> bool {
        self.from.is_some()
    }

    pub fn has_to(&self) -> bool {
        self.to.is_some()
    }

    pub fn from_integer(&self) -> Option<i64> {
        self.from.as_ref().and_then(change_value_as_i64)
    }

    pub fn to_integer(&self) -> Option<i64> {
        self.to.as_ref().and_then(change_value_as_i64)
    }

    /// Human rendering of the old value: `fromString`, else the raw `from`.
    pub fn from_display(&self) -> String {
        display_text(&self.from_text, self.from.as_ref())
    }

    /// Human rendering of the new value: `toString`, else the raw `to`.
    pub fn to_display(&self) -> String {
        display_text(&self.to_text, self.to.as_ref())
    }

    /// Raw `to` value as text, used to match attachment ids.
    pub fn to_raw_text(&self) -> Option<String> {
        match self.to.as_ref()? {
            Value::String(text) => Some(text.trim().to_string()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }
}

impl JiraWebhookEvent {
    pub fn first_change(&self) -> Option<&JiraChangelogItem> {
        self.changelog.items.first()
    }

    pub fn change_count(&self) -> usize {
        self.changelog.items.len()
    }

    /// Copy of this event whose changelog holds only `item`.
    pub fn with_single_change(&self, item: &JiraChangelogItem) -> Self {
        let mut copy = self.clone();
        copy.changelog.items = vec![item.clone()];
        copy
    }

    /// `webhookEvent` without the `jira:` namespace Jira puts on issue events.
    pub fn webhook_event_name(&self) -> &str {
        let trimmed = self.webhook_event.trim();
        trimmed.strip_prefix("jira:").unwrap_or(trimmed)
    }
}

pub fn parse_jira_webhook_event(raw: &str) -> Result<JiraWebhookEvent, JiraEventError> {
    let value: Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        return Err(JiraEventError::NotAnObject);
    }
    Ok(serde_json::from_value(value)?)
}

fn display_text(rendered: &str, raw: Option<&Value>) -> String {
    if !rendered.is_empty() {
        return rendered.to_string();
    }
    match raw {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        _ => String::new(),
    }
}

/// Reads integer change values sent either as JSON numbers or numeric strings.
pub fn change_value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float as i64)),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Jira Cloud sends some text fields as rich document objects; keep their JSON
// text rather than rejecting the whole delivery.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
    })
}
