//! REST client for the document-search index
//!
//! One client serves both query modes: keyword search with extractive
//! captions and highlighting, and nearest-neighbor search against a
//! vector field. Field names are configurable because index schemas
//! differ between deployments.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::warn;

use super::http::{HttpClientTrait, RetryPolicy, send_with_retry};
use crate::domain::{EmbeddingVector, RetrievalQuery, RetrievedPassage, SearchError};

const DEFAULT_API_VERSION: &str = "2024-07-01";

/// Search index connection settings
#[derive(Debug, Clone)]
pub struct SearchIndexConfig {
    pub endpoint: String,
    pub api_key: String,
    pub index: String,
    pub api_version: String,
    /// Document identifier field
    pub key_field: String,
    pub title_field: String,
    pub content_field: String,
    pub vector_field: String,
}

impl SearchIndexConfig {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        index: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            index: index.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            key_field: "id".to_string(),
            title_field: "title".to_string(),
            content_field: "content".to_string(),
            vector_field: "embedding".to_string(),
        }
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_key_field(mut self, field: impl Into<String>) -> Self {
        self.key_field = field.into();
        self
    }

    pub fn with_title_field(mut self, field: impl Into<String>) -> Self {
        self.title_field = field.into();
        self
    }

    pub fn with_content_field(mut self, field: impl Into<String>) -> Self {
        self.content_field = field.into();
        self
    }

    pub fn with_vector_field(mut self, field: impl Into<String>) -> Self {
        self.vector_field = field.into();
        self
    }
}

/// Query client for one index
#[derive(Debug)]
pub struct SearchIndexClient<C: HttpClientTrait> {
    client: C,
    config: SearchIndexConfig,
    retry: RetryPolicy,
}

impl<C: HttpClientTrait> SearchIndexClient<C> {
    pub fn new(client: C, config: SearchIndexConfig) -> Self {
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

    /// Keyword search ranked by the index's native relevance score
    pub async fn keyword_search(
        &self,
        query: &RetrievalQuery,
    ) -> Result<Vec<RetrievedPassage>, SearchError> {
        let body = self.keyword_body(query);
        self.search("lexical", &body).await
    }

    /// Nearest-neighbor search against the configured vector field
    pub async fn vector_search(
        &self,
        vector: &EmbeddingVector,
        query: &RetrievalQuery,
    ) -> Result<Vec<RetrievedPassage>, SearchError> {
        let body = self.vector_body(vector, query);
        self.search("vector", &body).await
    }

    async fn search(
        &self,
        backend: &str,
        body: &serde_json::Value,
    ) -> Result<Vec<RetrievedPassage>, SearchError> {
        let url = self.search_url();
        let response = send_with_retry(&self.client, &url, &self.headers(), body, &self.retry)
            .await
            .map_err(|e| SearchError::backend_unavailable(backend, e.to_string()))?;

        self.parse_passages(backend, response)
    }

    fn search_url(&self) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.index,
            self.config.api_version
        )
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("api-key", self.config.api_key.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn keyword_body(&self, query: &RetrievalQuery) -> serde_json::Value {
        let mut body = serde_json::json!({
            "search": query.text,
            "top": query.top,
            "highlight": self.config.content_field,
            "captions": "extractive",
        });

        if let Some(ref filter) = query.filter {
            body["filter"] = serde_json::json!(filter);
        }

        body
    }

    fn vector_body(&self, vector: &EmbeddingVector, query: &RetrievalQuery) -> serde_json::Value {
        let mut body = serde_json::json!({
            "vectorQueries": [{
                "kind": "vector",
                "vector": vector.as_slice(),
                "fields": self.config.vector_field,
                "k": query.top,
            }],
            "top": query.top,
        });

        if let Some(ref filter) = query.filter {
            body["filter"] = serde_json::json!(filter);
        }

        body
    }

    fn parse_passages(
        &self,
        backend: &str,
        json: serde_json::Value,
    ) -> Result<Vec<RetrievedPassage>, SearchError> {
        let response: IndexSearchResponse = serde_json::from_value(json).map_err(|e| {
            SearchError::backend_unavailable(backend, format!("Unexpected index response: {}", e))
        })?;

        let mut passages = Vec::with_capacity(response.value.len());

        for result in response.value {
            let Some(document_id) = result.field_str(&self.config.key_field) else {
                warn!(
                    "Skipping index document without '{}' field",
                    self.config.key_field
                );
                continue;
            };
            let document_id = document_id.to_string();

            // The title invariant: substitute the id when the index has
            // no usable title for a document.
            let title = result
                .field_str(&self.config.title_field)
                .map(str::trim)
                .filter(|title| !title.is_empty())
                .unwrap_or(&document_id)
                .to_string();

            let content = result
                .field_str(&self.config.content_field)
                .unwrap_or_default()
                .to_string();

            let mut passage = RetrievedPassage::new(document_id, title)
                .with_content(content)
                .with_score(result.score);
            passage.captions = result.captions.into_iter().map(|c| c.text).collect();
            passage.highlights = result.highlights;

            passages.push(passage);
        }

        Ok(passages)
    }
}

// Search index wire types

#[derive(Debug, Deserialize)]
struct IndexSearchResponse {
    #[serde(default)]
    value: Vec<IndexSearchResult>,
}

#[derive(Debug, Deserialize)]
struct IndexSearchResult {
    #[serde(rename = "@search.score", default)]
    score: f64,
    #[serde(rename = "@search.captions", default)]
    captions: Vec<IndexCaption>,
    #[serde(rename = "@search.highlights", default)]
    highlights: BTreeMap<String, Vec<String>>,
    #[serde(flatten)]
    fields: serde_json::Map<String, serde_json::Value>,
}

impl IndexSearchResult {
    fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(serde_json::Value::as_str)
    }
}

#[derive(Debug, Deserialize)]
struct IndexCaption {
    #[serde(default)]
    text: String,
}
