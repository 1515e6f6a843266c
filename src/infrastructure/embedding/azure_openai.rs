//! Azure OpenAI embedding provider implementation

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{EmbeddingProvider, EmbeddingVector, SearchError};
use crate::infrastructure::http::{HttpClientTrait, RetryPolicy, send_with_retry};

/// Azure OpenAI embedding deployment settings
#[derive(Debug, Clone)]
pub struct AzureEmbeddingConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
    /// Vector dimensionality the deployment produces
    pub dimensions: usize,
}

impl AzureEmbeddingConfig {
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
            dimensions: 1536,
        }
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }
}

/// Azure OpenAI embedding provider
#[derive(Debug)]
pub struct AzureEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    config: AzureEmbeddingConfig,
    retry: RetryPolicy,
}

impl<C: HttpClientTrait> AzureEmbeddingProvider<C> {
    pub fn new(client: C, config: AzureEmbeddingConfig) -> Self {
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

    fn embeddings_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/embeddings?api-version={}",
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

    fn parse_response(&self, json: serde_json::Value) -> Result<EmbeddingVector, SearchError> {
        let response: AzureEmbeddingResponse = serde_json::from_value(json).map_err(|e| {
            SearchError::embedding_failed(format!("Failed to parse embedding response: {}", e))
        })?;

        let vector = response
            .data
            .into_iter()
            .next()
            .map(|d| EmbeddingVector::new(d.embedding))
            .ok_or_else(|| {
                SearchError::embedding_failed("Embedding response contained no vectors")
            })?;

        if vector.is_empty() {
            return Err(SearchError::embedding_failed(
                "Embedding response contained an empty vector",
            ));
        }

        Ok(vector)
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for AzureEmbeddingProvider<C> {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, SearchError> {
        let url = self.embeddings_url();
        let body = serde_json::json!({ "input": text });

        let response = send_with_retry(&self.client, &url, &self.headers(), &body, &self.retry)
            .await
            .map_err(|e| SearchError::embedding_failed(e.to_string()))?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "azure_openai"
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }
}

// Azure OpenAI API types for embeddings

#[derive(Debug, Deserialize)]
struct AzureEmbeddingResponse {
    #[serde(default)]
    data: Vec<AzureEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct AzureEmbeddingData {
    embedding: Vec<f32>,
}
