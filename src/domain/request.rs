use serde::{Deserialize, Serialize};

use super::error::SearchError;

/// One user-facing query submission. Immutable once constructed; one
/// request corresponds to one orchestration run.
///
/// Generation fields override the configured defaults for this run only
/// and are ignored by retrieval-only strategies. `stop_sequences` is a
/// comma-separated list, split and trimmed when parameters are resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Engine identifier matched against registered strategies
    pub engine: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<u32>,
    /// Filter expression passed through to the search index
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<String>,
    /// Replaces the strategy's default prompt template for this run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, engine: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            engine: engine.into(),
            top: None,
            filter: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
            stop_sequences: None,
            prompt_template: None,
        }
    }

    pub fn with_top(mut self, top: u32) -> Self {
        self.top = Some(top);
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    pub fn with_presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    pub fn with_stop_sequences(mut self, stop_sequences: impl Into<String>) -> Self {
        self.stop_sequences = Some(stop_sequences.into());
        self
    }

    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = Some(template.into());
        self
    }

    /// Request-level checks that need no remote call. Run before any
    /// strategy is selected.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.query.trim().is_empty() {
            return Err(SearchError::invalid_request("query must not be empty"));
        }

        if self.top == Some(0) {
            return Err(SearchError::invalid_request(
                "top must be a positive integer",
            ));
        }

        Ok(())
    }
}
