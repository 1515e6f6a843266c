//! Embedding provider trait definition

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::SearchError;

/// A fixed-dimensionality vector representation of text. Produced per
/// query and handed to vector-capable backends; never persisted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingVector(Vec<f32>);

impl EmbeddingVector {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<f32>> for EmbeddingVector {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// Trait for remote embedding model clients
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Embed one query text
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, SearchError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Vector dimensionality of the configured model
    fn dimensions(&self) -> usize;
}
