//! Jira webhook classification and chat message composition for Herald.
//!
//! Turns a Jira webhook delivery into Telegram-HTML text: the event is
//! classified into a message variant (multi-field updates are split into one
//! message per changed field) and rendered with issue links and struck-through
//! superseded values. Everything here is pure; delivery happens elsewhere.
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use herald_jira::{compose_jira_message, parse_jira_webhook_event};
//!
//! let raw = r#"{
//!   "webhookEvent": "jira:issue_updated",
//!   "issue_event_type_name": "issue_assigned",
//!   "user": { "displayName": "Alice" },
//!   "issue": {
//!     "key": "OPS-1",
//!     "self": "https://jira.example.com/rest/api/2/issue/10001",
//!     "fields": { "summary": "Renew TLS certificate" }
//!   },
//!   "changelog": { "items": [
//!     { "field": "assignee", "from": null, "to": "alice", "toString": "alice" }
//!   ] }
//! }"#;
//!
//! let event = parse_jira_webhook_event(raw)?;
//! let text = compose_jira_message(&event);
//! assert!(text.ends_with("assigned to alice"));
//! # Ok(())
//! # }
//! ```

pub mod jira_classify;
pub mod jira_event;
pub mod jira_markup;
pub mod jira_render;

pub use jira_classify::*;
pub use jira_event::*;
pub use jira_markup::*;
pub use jira_render::*;
