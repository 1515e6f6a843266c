//! Hybrid retrieval combining a lexical and a vector branch
//!
//! Both branches run concurrently. When one branch fails the other's
//! passages are returned as-is and the failure is logged as partial
//! degradation; only when both fail does the backend report an error.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::{RetrievalBackend, RetrievalQuery, RetrievedPassage, SearchError};

#[derive(Debug)]
pub struct HybridBackend {
    lexical: Arc<dyn RetrievalBackend>,
    vector: Arc<dyn RetrievalBackend>,
}

impl HybridBackend {
    pub fn new(lexical: Arc<dyn RetrievalBackend>, vector: Arc<dyn RetrievalBackend>) -> Self {
        Self { lexical, vector }
    }

    /// Merge two ranked lists into one. A document appearing in both
    /// keeps its higher score and is returned once.
    fn merge(
        first: Vec<RetrievedPassage>,
        second: Vec<RetrievedPassage>,
        top: usize,
    ) -> Vec<RetrievedPassage> {
        let mut by_id: HashMap<String, RetrievedPassage> = HashMap::new();

        for passage in first.into_iter().chain(second) {
            match by_id.entry(passage.document_id.clone()) {
                Entry::Occupied(mut entry) => {
                    if passage.score > entry.get().score {
                        entry.insert(passage);
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(passage);
                }
            }
        }

        let mut merged: Vec<RetrievedPassage> = by_id.into_values().collect();
        merged.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.document_id.cmp(&b.document_id))
        });
        merged.truncate(top);

        merged
    }
}

#[async_trait]
impl RetrievalBackend for HybridBackend {
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<RetrievedPassage>, SearchError> {
        let (lexical, vector) =
            tokio::join!(self.lexical.retrieve(query), self.vector.retrieve(query));

        match (lexical, vector) {
            (Ok(lexical), Ok(vector)) => Ok(Self::merge(lexical, vector, query.top as usize)),
            (Ok(passages), Err(error)) => {
                warn!(
                    "Hybrid branch '{}' failed, serving '{}' results only: {}",
                    self.vector.backend_name(),
                    self.lexical.backend_name(),
                    error
                );
                Ok(passages)
            }
            (Err(error), Ok(passages)) => {
                warn!(
                    "Hybrid branch '{}' failed, serving '{}' results only: {}",
                    self.lexical.backend_name(),
                    self.vector.backend_name(),
                    error
                );
                Ok(passages)
            }
            (Err(lexical_error), Err(vector_error)) => Err(SearchError::backend_unavailable(
                "hybrid",
                format!("Both branches failed: {}; {}", lexical_error, vector_error),
            )),
        }
    }

    fn backend_name(&self) -> &'static str {
        "hybrid"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::retrieval::mock::MockRetrievalBackend;

    fn passage(id: &str, score: f64) -> RetrievedPassage {
        RetrievedPassage::new(id, format!("{}.pdf", id)).with_score(score)
    }

    #[tokio::test]
    async fn test_hybrid_merges_and_ranks_both_branches() {
        let lexical = Arc::new(
            MockRetrievalBackend::new("lexical")
                .with_passages(vec![passage("doc-1", 1.0), passage("doc-2", 0.5)]),
        );
        let vector = Arc::new(
            MockRetrievalBackend::new("vector").with_passages(vec![passage("doc-3", 0.9)]),
        );
        let backend = HybridBackend::new(lexical.clone(), vector.clone());

        let passages = backend
            .retrieve(&RetrievalQuery::new("refunds").with_top(10))
            .await
            .unwrap();

        let ids: Vec<&str> = passages.iter().map(|p| p.document_id.as_str()).collect();
        assert_eq!(ids, vec!["doc-1", "doc-3", "doc-2"]);
        assert_eq!(lexical.retrieve_count(), 1);
        assert_eq!(vector.retrieve_count(), 1);
    }

    #[tokio::test]
    async fn test_hybrid_deduplicates_keeping_higher_score() {
        let lexical = Arc::new(MockRetrievalBackend::new("lexical").with_passages(vec![
            passage("doc-1", 0.4).with_content("keyword match"),
        ]));
        let vector = Arc::new(MockRetrievalBackend::new("vector").with_passages(vec![
            passage("doc-1", 0.9).with_content("semantic match"),
        ]));
        let backend = HybridBackend::new(lexical, vector);

        let passages = backend
            .retrieve(&RetrievalQuery::new("refunds"))
            .await
            .unwrap();

        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].score, 0.9);
        assert_eq!(passages[0].content, "semantic match");
    }

    #[tokio::test]
    async fn test_hybrid_breaks_score_ties_by_document_id() {
        let lexical = Arc::new(
            MockRetrievalBackend::new("lexical")
                .with_passages(vec![passage("doc-b", 0.7), passage("doc-a", 0.7)]),
        );
        let vector = Arc::new(MockRetrievalBackend::new("vector"));
        let backend = HybridBackend::new(lexical, vector);

        let passages = backend
            .retrieve(&RetrievalQuery::new("refunds"))
            .await
            .unwrap();

        let ids: Vec<&str> = passages.iter().map(|p| p.document_id.as_str()).collect();
        assert_eq!(ids, vec!["doc-a", "doc-b"]);
    }

    #[tokio::test]
    async fn test_hybrid_truncates_to_requested_top() {
        let lexical = Arc::new(
            MockRetrievalBackend::new("lexical")
                .with_passages(vec![passage("doc-1", 1.0), passage("doc-2", 0.8)]),
        );
        let vector = Arc::new(
            MockRetrievalBackend::new("vector")
                .with_passages(vec![passage("doc-3", 0.9), passage("doc-4", 0.2)]),
        );
        let backend = HybridBackend::new(lexical, vector);

        let passages = backend
            .retrieve(&RetrievalQuery::new("refunds").with_top(2))
            .await
            .unwrap();

        let ids: Vec<&str> = passages.iter().map(|p| p.document_id.as_str()).collect();
        assert_eq!(ids, vec!["doc-1", "doc-3"]);
    }

    #[tokio::test]
    async fn test_hybrid_degrades_when_vector_branch_fails() {
        let lexical = Arc::new(
            MockRetrievalBackend::new("lexical")
                .with_passages(vec![passage("doc-2", 0.5), passage("doc-1", 1.0)]),
        );
        let vector = Arc::new(MockRetrievalBackend::new("vector").with_error("HTTP 503"));
        let backend = HybridBackend::new(lexical, vector);

        let passages = backend
            .retrieve(&RetrievalQuery::new("refunds"))
            .await
            .unwrap();

        // The surviving branch's passages come back untouched, in the
        // order that branch ranked them.
        let ids: Vec<&str> = passages.iter().map(|p| p.document_id.as_str()).collect();
        assert_eq!(ids, vec!["doc-2", "doc-1"]);
    }

    #[tokio::test]
    async fn test_hybrid_degrades_when_lexical_branch_fails() {
        let lexical = Arc::new(MockRetrievalBackend::new("lexical").with_error("HTTP 503"));
        let vector = Arc::new(
            MockRetrievalBackend::new("vector").with_passages(vec![passage("doc-3", 0.9)]),
        );
        let backend = HybridBackend::new(lexical, vector);

        let passages = backend
            .retrieve(&RetrievalQuery::new("refunds"))
            .await
            .unwrap();

        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].document_id, "doc-3");
    }

    #[tokio::test]
    async fn test_hybrid_fails_when_both_branches_fail() {
        let lexical = Arc::new(MockRetrievalBackend::new("lexical").with_error("HTTP 503"));
        let vector = Arc::new(MockRetrievalBackend::new("vector").with_error("HTTP 502"));
        let backend = HybridBackend::new(lexical, vector);

        let error = backend
            .retrieve(&RetrievalQuery::new("refunds"))
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            SearchError::BackendUnavailable { ref backend, .. } if backend == "hybrid"
        ));
    }
}
