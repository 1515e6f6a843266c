//! Keyword retrieval over the search index

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{RetrievalBackend, RetrievalQuery, RetrievedPassage, SearchError};
use crate::infrastructure::http::HttpClientTrait;
use crate::infrastructure::search_index::SearchIndexClient;

/// Retrieval backend using the index's keyword ranking
#[derive(Debug)]
pub struct LexicalBackend<C: HttpClientTrait> {
    index: Arc<SearchIndexClient<C>>,
}

impl<C: HttpClientTrait> LexicalBackend<C> {
    pub fn new(index: Arc<SearchIndexClient<C>>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl<C: HttpClientTrait> RetrievalBackend for LexicalBackend<C> {
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<RetrievedPassage>, SearchError> {
        self.index.keyword_search(query).await
    }

    fn backend_name(&self) -> &'static str {
        "lexical"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::mock::MockHttpClient;
    use crate::infrastructure::search_index::SearchIndexConfig;

    #[tokio::test]
    async fn test_lexical_backend_delegates_to_index() {
        let url = "https://search.example.net/indexes/docs/docs/search?api-version=2024-07-01";
        let http = MockHttpClient::new().with_response(
            url,
            serde_json::json!({
                "value": [{"@search.score": 1.0, "id": "doc-1", "title": "Policy.pdf"}]
            }),
        );
        let index = Arc::new(SearchIndexClient::new(
            http,
            SearchIndexConfig::new("https://search.example.net", "test-key", "docs"),
        ));
        let backend = LexicalBackend::new(index);

        let passages = backend
            .retrieve(&RetrievalQuery::new("refunds"))
            .await
            .unwrap();

        assert_eq!(backend.backend_name(), "lexical");
        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].document_id, "doc-1");
    }
}
