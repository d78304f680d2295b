//! Alertmanager payload parsing, template rendering and active-alert digests.

pub mod alert_digest;
pub mod alert_model;
pub mod alert_template;

pub use alert_digest::*;
pub use alert_model::*;
pub use alert_template::*;

use thiserror::Error;

#[derive(Debug, Error)]
/// Enumerates supported `AlertError` values.
pub enum AlertError {
    #[error("alert templates directory {path} does not exist")]
    TemplatesDir { path: String },
    #[error("invalid alert template name '{name}'")]
    InvalidTemplateName { name: String },
    #[error("alert template error: {0}")]
    Template(#[from] minijinja::Error),
    #[error("alertmanager http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("alertmanager returned non-success status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("failed to decode alertmanager response: {0}")]
    Decode(serde_json::Error),
}
