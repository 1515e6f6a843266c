//! Prompt template parsing and rendering
//!
//! Placeholder syntax: `{name}`, where the name starts with a letter and
//! continues with letters, digits, or underscores. Anything else between
//! braces is left verbatim. Every placeholder must be bound at render time.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::error::SearchError;

static PLACEHOLDER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z][A-Za-z0-9_]*)\}").unwrap());

/// Grounded answer prompt used when neither the strategy registration
/// nor the request supplies a template
pub const DEFAULT_ANSWER_TEMPLATE: &str =
    "Answer the question using only these sources.\n{sources}\nQuestion: {query}";

/// Template processing errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TemplateError {
    #[error("Missing value for placeholder: {name}")]
    MissingVariable { name: String },
}

impl From<TemplateError> for SearchError {
    fn from(error: TemplateError) -> Self {
        SearchError::invalid_params(error.to_string())
    }
}

/// A parsed prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    /// Original template content
    content: String,
    /// Placeholder names in first-occurrence order, deduplicated
    placeholders: Vec<String>,
}

impl PromptTemplate {
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        let mut placeholders: Vec<String> = Vec::new();

        for cap in PLACEHOLDER_PATTERN.captures_iter(&content) {
            let name = cap.get(1).unwrap().as_str();
            if !placeholders.iter().any(|p| p == name) {
                placeholders.push(name.to_string());
            }
        }

        Self {
            content,
            placeholders,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    pub fn has_placeholders(&self) -> bool {
        !self.placeholders.is_empty()
    }

    /// Substitute every placeholder with its bound value.
    ///
    /// Single pass over the template, so placeholder-shaped text inside a
    /// substituted value is not expanded again.
    pub fn render(&self, values: &HashMap<String, String>) -> Result<String, TemplateError> {
        let mut rendered = String::with_capacity(self.content.len());
        let mut last_end = 0;

        for cap in PLACEHOLDER_PATTERN.captures_iter(&self.content) {
            let matched = cap.get(0).unwrap();
            let name = cap.get(1).unwrap().as_str();

            let value = values.get(name).ok_or_else(|| TemplateError::MissingVariable {
                name: name.to_string(),
            })?;

            rendered.push_str(&self.content[last_end..matched.start()]);
            rendered.push_str(value);
            last_end = matched.end();
        }

        rendered.push_str(&self.content[last_end..]);
        Ok(rendered)
    }
}
