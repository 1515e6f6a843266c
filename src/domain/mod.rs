//! Domain layer - Core search types, traits, and orchestration

pub mod completion;
pub mod context;
pub mod embedding;
pub mod error;
pub mod orchestrator;
pub mod prompt;
pub mod request;
pub mod response;
pub mod retrieval;
pub mod strategy;

pub use completion::{
    Completion, CompletionProvider, CompletionRequest, GenerationDefaults, GenerationParams,
    parse_stop_sequences,
};
pub use context::ContextAssembler;
pub use embedding::{EmbeddingProvider, EmbeddingVector};
pub use error::{CompletionFailureReason, SearchError};
pub use orchestrator::{Orchestrator, OrchestratorSettings};
pub use prompt::{DEFAULT_ANSWER_TEMPLATE, PromptTemplate, TemplateError};
pub use request::SearchRequest;
pub use response::{RetrievedPassage, SearchAnswer, SearchResponse};
pub use retrieval::{RetrievalBackend, RetrievalQuery};
pub use strategy::{EngineStrategy, GenerationBehavior, SearchStrategy, StrategySelector};
