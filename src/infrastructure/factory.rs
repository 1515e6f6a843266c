//! Builds the search pipeline from application configuration
//!
//! Wiring errors surface here as `Configuration` errors at build time,
//! before any request is served. Sections a configuration does not use
//! are neither validated nor built: a lexical-only setup needs no
//! embedding or completion credentials.

use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::config::{
    AppConfig, BackendKind, CompletionSettings, EmbeddingSettings, SearchIndexSettings,
};
use crate::domain::{
    CompletionProvider, DEFAULT_ANSWER_TEMPLATE, EmbeddingProvider, EngineStrategy,
    GenerationBehavior, Orchestrator, OrchestratorSettings, PromptTemplate, RetrievalBackend,
    SearchError, SearchStrategy, StrategySelector,
};
use crate::infrastructure::completion::{AzureCompletionConfig, AzureCompletionProvider};
use crate::infrastructure::embedding::{AzureEmbeddingConfig, AzureEmbeddingProvider};
use crate::infrastructure::http::{HttpClient, RetryPolicy};
use crate::infrastructure::retrieval::{HybridBackend, LexicalBackend, VectorBackend};
use crate::infrastructure::search_index::{SearchIndexClient, SearchIndexConfig};

/// Factory for creating a fully wired orchestrator
pub struct SearchFactory;

impl SearchFactory {
    /// Create an orchestrator with every configured strategy registered
    pub fn build(config: &AppConfig) -> Result<Orchestrator, SearchError> {
        if config.orchestration.default_top == 0 {
            return Err(SearchError::configuration(
                "orchestration.default_top must be a positive integer",
            ));
        }
        if config.orchestration.max_context_chars == 0 {
            return Err(SearchError::configuration(
                "orchestration.max_context_chars must be a positive integer",
            ));
        }

        let selector = Self::build_selector(config)?;

        let settings = OrchestratorSettings {
            default_top: config.orchestration.default_top,
            max_context_chars: config.orchestration.max_context_chars,
            generation: config.orchestration.generation.clone(),
        };

        Ok(Orchestrator::new(selector, settings))
    }

    /// Create the strategy registry in configuration order
    pub fn build_selector(config: &AppConfig) -> Result<StrategySelector, SearchError> {
        if config.strategies.is_empty() {
            return Err(SearchError::configuration(
                "At least one strategy must be configured",
            ));
        }

        let retry = RetryPolicy::new(Duration::from_millis(config.orchestration.retry_backoff_ms));
        let http_timeout = Duration::from_millis(config.orchestration.request_timeout_ms);

        let index = Arc::new(Self::build_index_client(&config.search, &retry, http_timeout)?);

        let embedding: Option<Arc<dyn EmbeddingProvider>> = if config
            .strategies
            .iter()
            .any(|s| matches!(s.backend, BackendKind::Vector | BackendKind::Hybrid))
        {
            Some(Self::build_embedding_provider(
                &config.embedding,
                &retry,
                http_timeout,
            )?)
        } else {
            None
        };

        let completion: Option<Arc<dyn CompletionProvider>> =
            if config.strategies.iter().any(|s| s.generate) {
                Some(Self::build_completion_provider(
                    &config.completion,
                    &retry,
                    http_timeout,
                )?)
            } else {
                None
            };

        let mut strategies: Vec<Arc<dyn SearchStrategy>> =
            Vec::with_capacity(config.strategies.len());

        for (position, entry) in config.strategies.iter().enumerate() {
            if entry.engine.trim().is_empty() {
                return Err(SearchError::configuration(
                    "Strategy engine identifiers must not be empty",
                ));
            }
            if config.strategies[..position]
                .iter()
                .any(|earlier| earlier.engine == entry.engine)
            {
                warn!(
                    "Strategy '{}' is shadowed by an earlier registration for the same engine",
                    entry.engine
                );
            }

            let backend: Arc<dyn RetrievalBackend> = match (entry.backend, embedding.as_ref()) {
                (BackendKind::Lexical, _) => Arc::new(LexicalBackend::new(index.clone())),
                (BackendKind::Vector, Some(embedding)) => {
                    Arc::new(VectorBackend::new(index.clone(), embedding.clone()))
                }
                (BackendKind::Hybrid, Some(embedding)) => Arc::new(HybridBackend::new(
                    Arc::new(LexicalBackend::new(index.clone())),
                    Arc::new(VectorBackend::new(index.clone(), embedding.clone())),
                )),
                (BackendKind::Vector | BackendKind::Hybrid, None) => {
                    return Err(SearchError::configuration(format!(
                        "Strategy '{}' requires the embedding section",
                        entry.engine
                    )));
                }
            };

            let mut strategy = EngineStrategy::new(&entry.engine, backend);

            if entry.generate {
                let Some(completion) = completion.as_ref() else {
                    return Err(SearchError::configuration(format!(
                        "Strategy '{}' requires the completion section",
                        entry.engine
                    )));
                };

                let text = entry
                    .prompt_template
                    .as_deref()
                    .or(config.orchestration.default_prompt_template.as_deref())
                    .unwrap_or(DEFAULT_ANSWER_TEMPLATE);
                let template = Self::parse_template(&entry.engine, text)?;

                strategy =
                    strategy.with_generation(GenerationBehavior::new(template, completion.clone()));
            }

            strategies.push(Arc::new(strategy));
        }

        Ok(StrategySelector::new(strategies))
    }

    fn build_index_client(
        settings: &SearchIndexSettings,
        retry: &RetryPolicy,
        timeout: Duration,
    ) -> Result<SearchIndexClient<HttpClient>, SearchError> {
        Self::require(&settings.endpoint, "search.endpoint")?;
        Self::require(&settings.api_key, "search.api_key")?;
        Self::require(&settings.index, "search.index")?;

        let config = SearchIndexConfig::new(&settings.endpoint, &settings.api_key, &settings.index)
            .with_api_version(&settings.api_version)
            .with_key_field(&settings.key_field)
            .with_title_field(&settings.title_field)
            .with_content_field(&settings.content_field)
            .with_vector_field(&settings.vector_field);

        Ok(SearchIndexClient::new(HttpClient::with_timeout(timeout), config)
            .with_retry(retry.clone()))
    }

    fn build_embedding_provider(
        settings: &EmbeddingSettings,
        retry: &RetryPolicy,
        timeout: Duration,
    ) -> Result<Arc<dyn EmbeddingProvider>, SearchError> {
        Self::require(&settings.endpoint, "embedding.endpoint")?;
        Self::require(&settings.api_key, "embedding.api_key")?;
        Self::require(&settings.deployment, "embedding.deployment")?;

        let config =
            AzureEmbeddingConfig::new(&settings.endpoint, &settings.api_key, &settings.deployment)
                .with_api_version(&settings.api_version)
                .with_dimensions(settings.dimensions);

        Ok(Arc::new(
            AzureEmbeddingProvider::new(HttpClient::with_timeout(timeout), config)
                .with_retry(retry.clone()),
        ))
    }

    fn build_completion_provider(
        settings: &CompletionSettings,
        retry: &RetryPolicy,
        timeout: Duration,
    ) -> Result<Arc<dyn CompletionProvider>, SearchError> {
        Self::require(&settings.endpoint, "completion.endpoint")?;
        Self::require(&settings.api_key, "completion.api_key")?;
        Self::require(&settings.deployment, "completion.deployment")?;

        let config =
            AzureCompletionConfig::new(&settings.endpoint, &settings.api_key, &settings.deployment)
                .with_api_version(&settings.api_version);

        Ok(Arc::new(
            AzureCompletionProvider::new(HttpClient::with_timeout(timeout), config)
                .with_retry(retry.clone()),
        ))
    }

    /// A configured template may only reference the variables the
    /// pipeline binds.
    fn parse_template(engine: &str, text: &str) -> Result<PromptTemplate, SearchError> {
        let template = PromptTemplate::new(text);

        for name in template.placeholders() {
            if name != "query" && name != "sources" {
                return Err(SearchError::configuration(format!(
                    "Strategy '{}' template references unknown placeholder '{}'",
                    engine, name
                )));
            }
        }

        Ok(template)
    }

    fn require(value: &str, name: &str) -> Result<(), SearchError> {
        if value.trim().is_empty() {
            return Err(SearchError::configuration(format!("{} is required", name)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StrategyConfig;

    fn configured() -> AppConfig {
        let mut config = AppConfig::default();
        config.search.endpoint = "https://search.example.net".to_string();
        config.search.api_key = "search-key".to_string();
        config.embedding.endpoint = "https://models.example.net".to_string();
        config.embedding.api_key = "embedding-key".to_string();
        config.completion.endpoint = "https://models.example.net".to_string();
        config.completion.api_key = "completion-key".to_string();
        config
    }

    #[test]
    fn test_build_with_default_strategies() {
        let selector = SearchFactory::build_selector(&configured()).unwrap();

        let names: Vec<&str> = selector.strategies().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["lexical", "vector", "hybrid", "rag"]);

        assert!(selector.strategies()[0].generation().is_none());
        assert!(selector.strategies()[3].generation().is_some());
        assert_eq!(
            selector.strategies()[3].backend().backend_name(),
            "hybrid"
        );

        assert!(SearchFactory::build(&configured()).is_ok());
    }

    #[test]
    fn test_missing_search_endpoint_is_a_configuration_error() {
        let mut config = configured();
        config.search.endpoint = String::new();

        let error = SearchFactory::build(&config).unwrap_err();

        assert!(matches!(error, SearchError::Configuration { .. }));
        assert!(error.to_string().contains("search.endpoint"));
    }

    #[test]
    fn test_lexical_only_setup_needs_no_model_sections() {
        let mut config = configured();
        config.embedding = EmbeddingSettings::default();
        config.completion = CompletionSettings::default();
        config.strategies = vec![StrategyConfig::retrieval("lexical", BackendKind::Lexical)];

        assert!(SearchFactory::build(&config).is_ok());
    }

    #[test]
    fn test_vector_strategy_requires_embedding_section() {
        let mut config = configured();
        config.embedding = EmbeddingSettings::default();
        config.strategies = vec![StrategyConfig::retrieval("vector", BackendKind::Vector)];

        let error = SearchFactory::build(&config).unwrap_err();

        assert!(matches!(error, SearchError::Configuration { .. }));
        assert!(error.to_string().contains("embedding.endpoint"));
    }

    #[test]
    fn test_generating_strategy_requires_completion_section() {
        let mut config = configured();
        config.completion = CompletionSettings::default();
        config.strategies = vec![StrategyConfig::generating("rag", BackendKind::Lexical)];

        let error = SearchFactory::build(&config).unwrap_err();

        assert!(matches!(error, SearchError::Configuration { .. }));
        assert!(error.to_string().contains("completion.endpoint"));
    }

    #[test]
    fn test_zero_default_top_is_rejected() {
        let mut config = configured();
        config.orchestration.default_top = 0;

        let error = SearchFactory::build(&config).unwrap_err();

        assert!(matches!(error, SearchError::Configuration { .. }));
        assert!(error.to_string().contains("default_top"));
    }

    #[test]
    fn test_zero_context_budget_is_rejected() {
        let mut config = configured();
        config.orchestration.max_context_chars = 0;

        let error = SearchFactory::build(&config).unwrap_err();

        assert!(matches!(error, SearchError::Configuration { .. }));
        assert!(error.to_string().contains("max_context_chars"));
    }

    #[test]
    fn test_empty_strategy_list_is_rejected() {
        let mut config = configured();
        config.strategies.clear();

        let error = SearchFactory::build(&config).unwrap_err();

        assert!(matches!(error, SearchError::Configuration { .. }));
    }

    #[test]
    fn test_blank_engine_identifier_is_rejected() {
        let mut config = configured();
        config.strategies = vec![StrategyConfig::retrieval("  ", BackendKind::Lexical)];

        let error = SearchFactory::build(&config).unwrap_err();

        assert!(matches!(error, SearchError::Configuration { .. }));
    }

    #[test]
    fn test_template_with_unknown_placeholder_is_rejected() {
        let mut config = configured();
        config.strategies = vec![
            StrategyConfig::generating("rag", BackendKind::Lexical)
                .with_prompt_template("Use {context} for {query}"),
        ];

        let error = SearchFactory::build(&config).unwrap_err();

        assert!(matches!(error, SearchError::Configuration { .. }));
        assert!(error.to_string().contains("context"));
    }

    #[test]
    fn test_strategy_template_wins_over_orchestration_default() {
        let mut config = configured();
        config.orchestration.default_prompt_template =
            Some("Default: {query} {sources}".to_string());
        config.strategies = vec![
            StrategyConfig::generating("rag", BackendKind::Lexical)
                .with_prompt_template("Own: {query} {sources}"),
            StrategyConfig::generating("qa", BackendKind::Lexical),
        ];

        let selector = SearchFactory::build_selector(&config).unwrap();

        let rag_template = selector.strategies()[0].generation().unwrap().template();
        assert_eq!(rag_template.content(), "Own: {query} {sources}");

        let qa_template = selector.strategies()[1].generation().unwrap().template();
        assert_eq!(qa_template.content(), "Default: {query} {sources}");
    }

    #[test]
    fn test_built_in_template_used_when_nothing_configured() {
        let mut config = configured();
        config.strategies = vec![StrategyConfig::generating("rag", BackendKind::Lexical)];

        let selector = SearchFactory::build_selector(&config).unwrap();

        let template = selector.strategies()[0].generation().unwrap().template();
        assert_eq!(template.content(), DEFAULT_ANSWER_TEMPLATE);
    }
}
