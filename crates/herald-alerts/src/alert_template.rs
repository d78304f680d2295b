//! Directory-backed alert templates.
//!
//! Templates are looked up by file name (e.g. `alert.html`) under a single
//! directory and rendered with an [`AlertTemplateView`] context. `.html`
//! templates are HTML auto-escaped. A `label(labels, name)` function returns
//! a label value or an empty string.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use minijinja::{path_loader, Environment, Value};

use crate::alert_model::{Alert, AlertTemplateView};
use crate::AlertError;

pub const DEFAULT_ALERT_TEMPLATE: &str = "alert.html";

#[derive(Debug)]
/// Public struct `AlertTemplates` used across Herald components.
pub struct AlertTemplates {
    root: PathBuf,
    env: Environment<'static>,
}

impl AlertTemplates {
    pub fn from_dir(root: &Path) -> Result<Self, AlertError> {
        if !root.is_dir() {
            return Err(AlertError::TemplatesDir {
                path: root.display().to_string(),
            });
        }
        let mut env = Environment::new();
        env.set_loader(path_loader(root));
        env.add_function("label", template_label);
        Ok(Self {
            root: root.to_path_buf(),
            env,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn render(&self, template_name: &str, alert: &Alert) -> Result<String, AlertError> {
        self.render_at(template_name, alert, Utc::now())
    }

    pub fn render_at(
        &self,
        template_name: &str,
        alert: &Alert,
        now: DateTime<Utc>,
    ) -> Result<String, AlertError> {
        let template_name = normalize_template_name(template_name)?;
        let template = self.env.get_template(template_name)?;
        let view: AlertTemplateView = alert.template_view(now);
        Ok(template.render(Value::from_serialize(&view))?)
    }
}

fn template_label(labels: Value, name: &str) -> String {
    match labels.get_attr(name) {
        Ok(value) if !value.is_undefined() && !value.is_none() => value.to_string(),
        _ => String::new(),
    }
}

// Template names arrive from query strings; keep them to plain file names.
fn normalize_template_name(raw: &str) -> Result<&str, AlertError> {
    let name = raw.trim();
    if name.is_empty() {
        return Ok(DEFAULT_ALERT_TEMPLATE);
    }
    if name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(AlertError::InvalidTemplateName {
            name: name.to_string(),
        });
    }
    Ok(name)
}
