//! Azure OpenAI chat completion provider implementation

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{Completion, CompletionProvider, CompletionRequest, SearchError};
use crate::infrastructure::http::{HttpClientError, HttpClientTrait, RetryPolicy, send_with_retry};

/// Azure OpenAI chat deployment settings
#[derive(Debug, Clone)]
pub struct AzureCompletionConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
}

impl AzureCompletionConfig {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        deployment: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            deployment: deployment.into(),
            api_version: "2024-02-01".to_string(),
        }
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }
}

/// Azure OpenAI chat completion provider
#[derive(Debug)]
pub struct AzureCompletionProvider<C: HttpClientTrait> {
    client: C,
    config: AzureCompletionConfig,
    retry: RetryPolicy,
}

impl<C: HttpClientTrait> AzureCompletionProvider<C> {
    pub fn new(client: C, config: AzureCompletionConfig) -> Self {
        Self {
            client,
            config,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.deployment,
            self.config.api_version
        )
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("api-key", self.config.api_key.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(&self, request: &CompletionRequest) -> serde_json::Value {
        let params = &request.params;

        let mut body = serde_json::json!({
            "messages": [{"role": "user", "content": request.prompt}],
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
            "top_p": params.top_p,
            "frequency_penalty": params.frequency_penalty,
            "presence_penalty": params.presence_penalty,
        });

        if !params.stop.is_empty() {
            body["stop"] = serde_json::json!(params.stop);
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<Completion, SearchError> {
        let response: AzureChatResponse = serde_json::from_value(json).map_err(|e| {
            SearchError::completion_unavailable(format!(
                "Failed to parse completion response: {}",
                e
            ))
        })?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            SearchError::completion_unavailable("Completion response contained no choices")
        })?;

        if choice.finish_reason.as_deref() == Some("content_filter") {
            return Err(SearchError::completion_filtered(
                "The generated answer was blocked by the content filter",
            ));
        }

        let text = choice.message.content.unwrap_or_default();
        let mut completion = Completion::new(text);
        if let Some(model) = response.model {
            completion = completion.with_model(model);
        }

        Ok(completion)
    }

    fn map_http_error(error: HttpClientError) -> SearchError {
        // A 400 carrying the content_filter code means the prompt itself
        // was rejected, which is terminal rather than a provider outage.
        if let HttpClientError::Status { status: 400, ref body } = error {
            if body.contains("content_filter") {
                return SearchError::completion_filtered(
                    "The prompt was blocked by the content filter",
                );
            }
        }

        SearchError::completion_unavailable(error.to_string())
    }
}

#[async_trait]
impl<C: HttpClientTrait> CompletionProvider for AzureCompletionProvider<C> {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, SearchError> {
        let url = self.completions_url();
        let body = self.build_request(request);

        let response = send_with_retry(&self.client, &url, &self.headers(), &body, &self.retry)
            .await
            .map_err(Self::map_http_error)?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "azure_openai"
    }
}

// Azure OpenAI API types for chat completions

#[derive(Debug, Deserialize)]
struct AzureChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<AzureChatChoice>,
}

#[derive(Debug, Deserialize)]
struct AzureChatChoice {
    message: AzureChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AzureChatMessage {
    #[serde(default)]
    content: Option<String>,
}
