//! Completion provider trait and generation parameter handling

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::SearchError;
use super::prompt::PromptTemplate;
use super::request::SearchRequest;

/// Process-wide generation defaults. Each field fills in for a request
/// that did not override it; `stop_sequences` is a comma-separated list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationDefaults {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub stop_sequences: String,
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        Self {
            max_tokens: 1000,
            temperature: 0.7,
            top_p: 0.95,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            stop_sequences: String::new(),
        }
    }
}

impl GenerationDefaults {
    /// Merge request overrides onto the defaults, field by field.
    pub fn resolve(&self, request: &SearchRequest) -> GenerationParams {
        let stop_sequences = request
            .stop_sequences
            .as_deref()
            .unwrap_or(&self.stop_sequences);

        GenerationParams {
            max_tokens: request.max_tokens.unwrap_or(self.max_tokens),
            temperature: request.temperature.unwrap_or(self.temperature),
            top_p: request.top_p.unwrap_or(self.top_p),
            frequency_penalty: request.frequency_penalty.unwrap_or(self.frequency_penalty),
            presence_penalty: request.presence_penalty.unwrap_or(self.presence_penalty),
            stop: parse_stop_sequences(stop_sequences),
        }
    }
}

/// Split a comma-separated stop list, trimming entries and dropping
/// empty ones.
pub fn parse_stop_sequences(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// The fully resolved parameter set sent with one completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
    pub stop: Vec<String>,
}

impl GenerationParams {
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_tokens == 0 {
            return Err(SearchError::invalid_params("max_tokens must be positive"));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(SearchError::invalid_params(format!(
                "temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }

        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(SearchError::invalid_params(format!(
                "top_p must be within [0, 1], got {}",
                self.top_p
            )));
        }

        Ok(())
    }
}

/// One ready-to-send completion call: the literal resolved prompt plus
/// validated parameters. The only constructor is `render`, so a request
/// that reaches a provider has already passed both gates.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub params: GenerationParams,
}

impl CompletionRequest {
    pub fn render(
        template: &PromptTemplate,
        variables: &HashMap<String, String>,
        params: GenerationParams,
    ) -> Result<Self, SearchError> {
        params.validate()?;
        let prompt = template.render(variables)?;
        Ok(Self { prompt, params })
    }
}

/// Text generated by the completion model
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub model: Option<String>,
}

impl Completion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Trait for remote completion model clients.
///
/// A call is billable. Implementations must not retry content-filter or
/// other business rejections; one retry for a transient network failure
/// is allowed.
#[async_trait]
pub trait CompletionProvider: Send + Sync + Debug {
    /// Send the resolved prompt and return the generated text
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, SearchError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_request_overrides() {
        let defaults = GenerationDefaults::default();
        let request = SearchRequest::new("q", "rag")
            .with_max_tokens(64)
            .with_temperature(0.1)
            .with_stop_sequences("END");

        let params = defaults.resolve(&request);

        assert_eq!(params.max_tokens, 64);
        assert_eq!(params.temperature, 0.1);
        assert_eq!(params.top_p, defaults.top_p);
        assert_eq!(params.stop, vec!["END".to_string()]);
    }

    #[test]
    fn test_resolve_falls_back_to_defaults() {
        let defaults = GenerationDefaults {
            stop_sequences: "STOP, DONE".to_string(),
            ..GenerationDefaults::default()
        };
        let params = defaults.resolve(&SearchRequest::new("q", "rag"));

        assert_eq!(params.max_tokens, defaults.max_tokens);
        assert_eq!(params.stop, vec!["STOP".to_string(), "DONE".to_string()]);
    }

    #[test]
    fn test_parse_stop_sequences_trims_and_drops_empties() {
        assert_eq!(
            parse_stop_sequences("STOP, END ,,"),
            vec!["STOP".to_string(), "END".to_string()]
        );
        assert!(parse_stop_sequences("").is_empty());
        assert!(parse_stop_sequences(" , ,").is_empty());
    }

    #[test]
    fn test_params_validation_bounds() {
        let defaults = GenerationDefaults::default();

        let hot = defaults.resolve(&SearchRequest::new("q", "rag").with_temperature(3.0));
        assert!(matches!(
            hot.validate(),
            Err(SearchError::InvalidParams { .. })
        ));

        let wide = defaults.resolve(&SearchRequest::new("q", "rag").with_top_p(1.5));
        assert!(matches!(
            wide.validate(),
            Err(SearchError::InvalidParams { .. })
        ));

        let zero = defaults.resolve(&SearchRequest::new("q", "rag").with_max_tokens(0));
        assert!(matches!(
            zero.validate(),
            Err(SearchError::InvalidParams { .. })
        ));

        assert!(defaults.resolve(&SearchRequest::new("q", "rag")).validate().is_ok());
    }

    #[test]
    fn test_render_produces_literal_prompt() {
        use std::collections::HashMap;

        let template = PromptTemplate::new("Q:{query} S:{sources}");
        let mut variables = HashMap::new();
        variables.insert("query".to_string(), "hi".to_string());
        variables.insert("sources".to_string(), "doc1: fact".to_string());

        let params = GenerationDefaults::default().resolve(&SearchRequest::new("hi", "rag"));
        let request = CompletionRequest::render(&template, &variables, params).unwrap();

        assert_eq!(request.prompt, "Q:hi S:doc1: fact");
    }

    #[test]
    fn test_render_missing_variable_is_invalid_params() {
        use std::collections::HashMap;

        let template = PromptTemplate::new("Q:{query} S:{sources}");
        let mut variables = HashMap::new();
        variables.insert("query".to_string(), "hi".to_string());

        let params = GenerationDefaults::default().resolve(&SearchRequest::new("hi", "rag"));
        let result = CompletionRequest::render(&template, &variables, params);

        assert!(matches!(result, Err(SearchError::InvalidParams { .. })));
    }

    #[test]
    fn test_render_rejects_invalid_params_before_substitution() {
        use std::collections::HashMap;

        let template = PromptTemplate::new("{query}");
        let params = GenerationDefaults::default()
            .resolve(&SearchRequest::new("hi", "rag").with_temperature(9.0));
        let result = CompletionRequest::render(&template, &HashMap::new(), params);

        assert!(matches!(result, Err(SearchError::InvalidParams { .. })));
    }
}
