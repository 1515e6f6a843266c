//! Embedding provider implementations

mod azure_openai;

pub use azure_openai::{AzureEmbeddingConfig, AzureEmbeddingProvider};
