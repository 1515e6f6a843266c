//! Application configuration loading

mod app_config;

pub use app_config::{
    AppConfig, BackendKind, CompletionSettings, EmbeddingSettings, LogFormat, LoggingConfig,
    OrchestrationConfig, SearchIndexSettings, StrategyConfig,
};
