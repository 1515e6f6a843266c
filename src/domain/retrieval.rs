//! Retrieval backend trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use super::error::SearchError;
use super::response::RetrievedPassage;

/// Query parameters for one retrieval call
#[derive(Debug, Clone)]
pub struct RetrievalQuery {
    /// Query text
    pub text: String,
    /// Number of passages to return
    pub top: u32,
    /// Optional filter expression, passed through to the index
    pub filter: Option<String>,
}

impl RetrievalQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            top: 10,
            filter: None,
        }
    }

    pub fn with_top(mut self, top: u32) -> Self {
        self.top = top;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Trait for retrieval against a document index.
///
/// Implementations return passages in descending relevance order and
/// guarantee a non-empty title on every passage.
#[async_trait]
pub trait RetrievalBackend: Send + Sync + Debug {
    /// Execute the query and return ranked passages
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<RetrievedPassage>, SearchError>;

    /// Get the backend name
    fn backend_name(&self) -> &'static str;
}
