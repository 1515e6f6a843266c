use serde::Deserialize;

use crate::domain::GenerationDefaults;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchIndexSettings,
    pub embedding: EmbeddingSettings,
    pub completion: CompletionSettings,
    pub orchestration: OrchestrationConfig,
    pub strategies: Vec<StrategyConfig>,
    pub logging: LoggingConfig,
}

/// Search index connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchIndexSettings {
    pub endpoint: String,
    pub api_key: String,
    pub index: String,
    pub api_version: String,
    pub key_field: String,
    pub title_field: String,
    pub content_field: String,
    pub vector_field: String,
}

/// Embedding deployment settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
    pub dimensions: usize,
}

/// Completion deployment settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompletionSettings {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
}

/// Pipeline-level settings shared by all strategies
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OrchestrationConfig {
    /// Passage count when a request does not ask for one
    pub default_top: u32,
    /// Character budget for assembled source context
    pub max_context_chars: usize,
    /// Backoff before the single retry of a transient remote failure
    pub retry_backoff_ms: u64,
    /// Timeout applied to each HTTP call a component makes
    pub request_timeout_ms: u64,
    /// Replaces the built-in answer template for every generating strategy
    pub default_prompt_template: Option<String>,
    pub generation: GenerationDefaults,
}

/// One strategy registration. Order matters: the selector takes the
/// first entry whose engine matches the request.
#[derive(Debug, Clone, Deserialize)]
pub struct StrategyConfig {
    pub engine: String,
    pub backend: BackendKind,
    #[serde(default)]
    pub generate: bool,
    #[serde(default)]
    pub prompt_template: Option<String>,
}

impl StrategyConfig {
    /// Strategy that only retrieves passages
    pub fn retrieval(engine: impl Into<String>, backend: BackendKind) -> Self {
        Self {
            engine: engine.into(),
            backend,
            generate: false,
            prompt_template: None,
        }
    }

    /// Strategy that retrieves passages and generates an answer
    pub fn generating(engine: impl Into<String>, backend: BackendKind) -> Self {
        Self {
            generate: true,
            ..Self::retrieval(engine, backend)
        }
    }

    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = Some(template.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Lexical,
    Vector,
    Hybrid,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            search: SearchIndexSettings::default(),
            embedding: EmbeddingSettings::default(),
            completion: CompletionSettings::default(),
            orchestration: OrchestrationConfig::default(),
            strategies: default_strategies(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SearchIndexSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            index: "documents".to_string(),
            api_version: "2024-07-01".to_string(),
            key_field: "id".to_string(),
            title_field: "title".to_string(),
            content_field: "content".to_string(),
            vector_field: "embedding".to_string(),
        }
    }
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            deployment: "text-embedding-3-small".to_string(),
            api_version: "2024-02-01".to_string(),
            dimensions: 1536,
        }
    }
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            deployment: "gpt-4o".to_string(),
            api_version: "2024-02-01".to_string(),
        }
    }
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            default_top: 10,
            max_context_chars: 8000,
            retry_backoff_ms: 200,
            request_timeout_ms: 30_000,
            default_prompt_template: None,
            generation: GenerationDefaults::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

/// The stock registrations: three retrieval-only engines plus a
/// generating `rag` engine over hybrid retrieval.
fn default_strategies() -> Vec<StrategyConfig> {
    vec![
        StrategyConfig::retrieval("lexical", BackendKind::Lexical),
        StrategyConfig::retrieval("vector", BackendKind::Vector),
        StrategyConfig::retrieval("hybrid", BackendKind::Hybrid),
        StrategyConfig::generating("rag", BackendKind::Hybrid),
    ]
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("GS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
