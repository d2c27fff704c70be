//! HTML page template used by the render endpoint.
//!
//! The template is parsed once at startup and shared by handle. Message text
//! is exposed to it as the `text` variable and HTML-escaped on output.

use std::path::Path;

use minijinja::{context, Environment};
use thiserror::Error;

const TEMPLATE_NAME: &str = "page.html";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to load template {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("Failed to render template: {0}")]
    Render(String),
}

/// A parsed page template.
pub struct PageTemplate {
    env: Environment<'static>,
}

impl PageTemplate {
    /// Read and parse the template at `path`.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let source = std::fs::read_to_string(path).map_err(|e| TemplateError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_source(source).map_err(|e| match e {
            TemplateError::Render(reason) | TemplateError::Load { reason, .. } => {
                TemplateError::Load {
                    path: path.display().to_string(),
                    reason,
                }
            }
        })
    }

    /// Parse a template from its source text.
    pub fn from_source(source: impl Into<String>) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        env.add_template_owned(TEMPLATE_NAME, source.into())
            .map_err(|e| TemplateError::Load {
                path: TEMPLATE_NAME.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { env })
    }

    /// Render `text` through the template.
    pub fn render(&self, text: &str) -> Result<String, TemplateError> {
        let template = self
            .env
            .get_template(TEMPLATE_NAME)
            .map_err(|e| TemplateError::Render(e.to_string()))?;
        template
            .render(context! { text => text })
            .map_err(|e| TemplateError::Render(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_render_inserts_text() {
        let template = PageTemplate::from_source("<pre>{{ text }}</pre>").unwrap();
        assert_eq!(template.render("hello").unwrap(), "<pre>hello</pre>");
    }

    #[test]
    fn test_render_escapes_html() {
        let template = PageTemplate::from_source("<pre>{{ text }}</pre>").unwrap();
        let rendered = template.render("<script>alert(1)</script>").unwrap();
        assert!(!rendered.contains("<script>"));
        assert!(rendered.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let template = PageTemplate::from_source("<p>{{ text }}</p>").unwrap();
        assert_eq!(
            template.render("same").unwrap(),
            template.render("same").unwrap()
        );
    }

    #[test]
    fn test_invalid_source_fails() {
        let result = PageTemplate::from_source("{% if %}");
        assert!(matches!(result, Err(TemplateError::Load { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "<div>{{{{ text }}}}</div>").unwrap();

        let template = PageTemplate::load(file.path()).unwrap();
        assert_eq!(template.render("x").unwrap(), "<div>x</div>");
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = PageTemplate::load(Path::new("/nonexistent/index.html"));
        assert!(matches!(result, Err(TemplateError::Load { .. })));
    }
}
