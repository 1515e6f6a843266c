//! Search strategies and first-match selection
//!
//! A strategy couples a retrieval backend with optional generation
//! behavior. Selection walks the registered list in declaration order and
//! picks the first strategy whose predicate claims the request, so
//! overlapping claims resolve deterministically by configuration order.

use std::fmt::Debug;
use std::sync::Arc;

use super::completion::CompletionProvider;
use super::error::SearchError;
use super::prompt::PromptTemplate;
use super::request::SearchRequest;
use super::retrieval::RetrievalBackend;

/// Generation half of a strategy: the default prompt template and the
/// completion provider that runs it.
#[derive(Debug)]
pub struct GenerationBehavior {
    template: PromptTemplate,
    provider: Arc<dyn CompletionProvider>,
}

impl GenerationBehavior {
    pub fn new(template: PromptTemplate, provider: Arc<dyn CompletionProvider>) -> Self {
        Self { template, provider }
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub fn provider(&self) -> &dyn CompletionProvider {
        self.provider.as_ref()
    }
}

/// A named retrieval+generation combination selectable per request
pub trait SearchStrategy: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Whether this strategy claims the request's engine identifier
    fn can_handle(&self, request: &SearchRequest) -> bool;

    fn backend(&self) -> &dyn RetrievalBackend;

    /// Present when the strategy runs a generation step after retrieval
    fn generation(&self) -> Option<&GenerationBehavior>;
}

/// The standard strategy: claims exactly one engine identifier.
#[derive(Debug)]
pub struct EngineStrategy {
    engine: String,
    backend: Arc<dyn RetrievalBackend>,
    generation: Option<GenerationBehavior>,
}

impl EngineStrategy {
    pub fn new(engine: impl Into<String>, backend: Arc<dyn RetrievalBackend>) -> Self {
        Self {
            engine: engine.into(),
            backend,
            generation: None,
        }
    }

    pub fn with_generation(mut self, generation: GenerationBehavior) -> Self {
        self.generation = Some(generation);
        self
    }
}

impl SearchStrategy for EngineStrategy {
    fn name(&self) -> &str {
        &self.engine
    }

    fn can_handle(&self, request: &SearchRequest) -> bool {
        request.engine == self.engine
    }

    fn backend(&self) -> &dyn RetrievalBackend {
        self.backend.as_ref()
    }

    fn generation(&self) -> Option<&GenerationBehavior> {
        self.generation.as_ref()
    }
}

/// Ordered strategy registry with first-match selection
#[derive(Debug)]
pub struct StrategySelector {
    strategies: Vec<Arc<dyn SearchStrategy>>,
}

impl StrategySelector {
    pub fn new(strategies: Vec<Arc<dyn SearchStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategies(&self) -> &[Arc<dyn SearchStrategy>] {
        &self.strategies
    }

    /// Pick the first registered strategy that claims the request
    pub fn select(&self, request: &SearchRequest) -> Result<Arc<dyn SearchStrategy>, SearchError> {
        self.strategies
            .iter()
            .find(|strategy| strategy.can_handle(request))
            .cloned()
            .ok_or_else(|| SearchError::no_strategy_found(&request.engine))
    }
}
