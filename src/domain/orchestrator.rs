//! Search orchestration pipeline
//!
//! One `run` per user query: validate the request, select a strategy,
//! retrieve passages, assemble the grounding context, and generate an
//! answer when the strategy asks for one. Every failure leaves as a typed
//! `SearchError`; nothing is retried at this level.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::completion::{CompletionRequest, GenerationDefaults};
use super::context::ContextAssembler;
use super::error::SearchError;
use super::prompt::PromptTemplate;
use super::request::SearchRequest;
use super::response::{RetrievedPassage, SearchAnswer, SearchResponse};
use super::retrieval::RetrievalQuery;
use super::strategy::StrategySelector;

/// Read-only settings shared by every run
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Passage count requested when the caller does not specify one
    pub default_top: u32,
    /// Grounding context budget in characters, whole passages only
    pub max_context_chars: usize,
    pub generation: GenerationDefaults,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            default_top: 10,
            max_context_chars: 8000,
            generation: GenerationDefaults::default(),
        }
    }
}

/// Top-level entry point tying selection, retrieval, assembly, and
/// generation together. Stateless across runs; safe to share behind an
/// `Arc` and call concurrently.
#[derive(Debug)]
pub struct Orchestrator {
    selector: StrategySelector,
    assembler: ContextAssembler,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    pub fn new(selector: StrategySelector, settings: OrchestratorSettings) -> Self {
        Self {
            selector,
            assembler: ContextAssembler::new(),
            settings,
        }
    }

    /// Execute one orchestration run.
    ///
    /// Dropping the returned future cancels whatever remote call is in
    /// flight; a run cancelled before the generation step never issues
    /// the completion call.
    #[instrument(skip(self, request), fields(engine = %request.engine))]
    pub async fn run(&self, request: SearchRequest) -> Result<SearchResponse, SearchError> {
        let run_id = Uuid::new_v4();

        request.validate()?;
        let strategy = self.selector.select(&request)?;

        info!("Search run {}: strategy '{}'", run_id, strategy.name());

        // Retrieve
        let mut retrieval = RetrievalQuery::new(&request.query)
            .with_top(request.top.unwrap_or(self.settings.default_top));
        if let Some(ref filter) = request.filter {
            retrieval = retrieval.with_filter(filter);
        }

        let passages = strategy.backend().retrieve(&retrieval).await?;
        debug!(
            "Run {}: backend '{}' returned {} passages",
            run_id,
            strategy.backend().backend_name(),
            passages.len()
        );

        // Assemble, bounded by the context budget
        let (context, grounded) = self.assemble_bounded(&passages);
        if grounded.len() < passages.len() {
            debug!(
                "Run {}: context budget reached, grounded {} of {} passages",
                run_id,
                grounded.len(),
                passages.len()
            );
        }

        // Generate, if the strategy has a generation step
        let answers = match strategy.generation() {
            Some(generation) => {
                let template = match request.prompt_template {
                    Some(ref text) => PromptTemplate::new(text),
                    None => generation.template().clone(),
                };

                let mut variables = HashMap::new();
                variables.insert("query".to_string(), request.query.clone());
                variables.insert("sources".to_string(), context);

                let params = self.settings.generation.resolve(&request);
                let completion_request =
                    CompletionRequest::render(&template, &variables, params)?;

                let completion = generation.provider().complete(&completion_request).await?;
                debug!(
                    "Run {}: provider '{}' generated {} chars",
                    run_id,
                    generation.provider().provider_name(),
                    completion.text.len()
                );

                vec![SearchAnswer::new(completion.text).with_citations(grounded)]
            }
            None => Vec::new(),
        };

        info!(
            "Search run {} complete: {} passages, {} answers",
            run_id,
            passages.len(),
            answers.len()
        );

        Ok(SearchResponse::new(passages, answers))
    }

    /// Like `run`, but abandons the pipeline when the deadline passes.
    /// In-flight remote calls are dropped with the pipeline future.
    pub async fn run_with_timeout(
        &self,
        request: SearchRequest,
        timeout: Duration,
    ) -> Result<SearchResponse, SearchError> {
        match tokio::time::timeout(timeout, self.run(request)).await {
            Ok(result) => result,
            Err(_) => {
                let elapsed_ms = timeout.as_millis() as u64;
                warn!("Search run abandoned after {}ms", elapsed_ms);
                Err(SearchError::timeout(elapsed_ms))
            }
        }
    }

    /// Longest passage prefix whose rendered text fits the budget.
    /// Returns the context plus the document ids it grounds. Passages
    /// contributing no lines are skipped without consuming budget.
    fn assemble_bounded(&self, passages: &[RetrievedPassage]) -> (String, Vec<String>) {
        let mut context = String::new();
        let mut grounded = Vec::new();

        for passage in passages {
            let block = self.assembler.render_passage(passage);
            if block.is_empty() {
                continue;
            }
            if context.len() + block.len() > self.settings.max_context_chars {
                break;
            }

            context.push_str(&block);
            if !grounded.contains(&passage.document_id) {
                grounded.push(passage.document_id.clone());
            }
        }

        (context, grounded)
    }
}
