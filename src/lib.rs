//! Grounded Search
//!
//! Retrieval-augmented search over a document index with support for:
//! - Pluggable retrieval strategies (lexical, vector, hybrid) selected per request
//! - Bounded grounding-context assembly from retrieved passages
//! - LLM answer synthesis with per-request generation overrides
//! - Graceful degradation when one hybrid retrieval branch fails
//!
//! Build an [`Orchestrator`] from configuration with
//! [`infrastructure::SearchFactory`], then call [`Orchestrator::run`]
//! once per query.

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{
    Orchestrator, OrchestratorSettings, SearchError, SearchRequest, SearchResponse,
};
pub use infrastructure::SearchFactory;
