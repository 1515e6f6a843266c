//! Vector retrieval over the search index
//!
//! Embeds the query text first, then runs a nearest-neighbor search.
//! An embedding failure surfaces as its own error kind so callers can
//! tell the embedding dependency apart from the index itself.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{
    EmbeddingProvider, RetrievalBackend, RetrievalQuery, RetrievedPassage, SearchError,
};
use crate::infrastructure::http::HttpClientTrait;
use crate::infrastructure::search_index::SearchIndexClient;

#[derive(Debug)]
pub struct VectorBackend<C: HttpClientTrait> {
    index: Arc<SearchIndexClient<C>>,
    embedding: Arc<dyn EmbeddingProvider>,
}

impl<C: HttpClientTrait> VectorBackend<C> {
    pub fn new(index: Arc<SearchIndexClient<C>>, embedding: Arc<dyn EmbeddingProvider>) -> Self {
        Self { index, embedding }
    }
}

#[async_trait]
impl<C: HttpClientTrait> RetrievalBackend for VectorBackend<C> {
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<RetrievedPassage>, SearchError> {
        let vector = self.embedding.embed(&query.text).await?;
        debug!(
            "Embedded query with {} ({} dimensions)",
            self.embedding.provider_name(),
            vector.len()
        );

        self.index.vector_search(&vector, query).await
    }

    fn backend_name(&self) -> &'static str {
        "vector"
    }
}
