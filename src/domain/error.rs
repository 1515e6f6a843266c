use thiserror::Error;

/// Why a completion call failed, so callers can tell a content-filter
/// rejection apart from an unreachable or erroring model endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionFailureReason {
    ContentFiltered,
    Unavailable,
}

/// Core search errors
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("No strategy registered for engine '{engine}'")]
    NoStrategyFound { engine: String },

    #[error("Invalid generation parameters: {message}")]
    InvalidParams { message: String },

    #[error("Search backend '{backend}' unavailable: {message}")]
    BackendUnavailable { backend: String, message: String },

    #[error("Embedding failed: {message}")]
    EmbeddingFailed { message: String },

    #[error("Completion failed ({reason:?}): {message}")]
    CompletionFailed {
        reason: CompletionFailureReason,
        message: String,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Request timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },
}

impl SearchError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn no_strategy_found(engine: impl Into<String>) -> Self {
        Self::NoStrategyFound {
            engine: engine.into(),
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::InvalidParams {
            message: message.into(),
        }
    }

    pub fn backend_unavailable(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            backend: backend.into(),
            message: message.into(),
        }
    }

    pub fn embedding_failed(message: impl Into<String>) -> Self {
        Self::EmbeddingFailed {
            message: message.into(),
        }
    }

    pub fn completion_filtered(message: impl Into<String>) -> Self {
        Self::CompletionFailed {
            reason: CompletionFailureReason::ContentFiltered,
            message: message.into(),
        }
    }

    pub fn completion_unavailable(message: impl Into<String>) -> Self {
        Self::CompletionFailed {
            reason: CompletionFailureReason::Unavailable,
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn timeout(elapsed_ms: u64) -> Self {
        Self::Timeout { elapsed_ms }
    }

    /// User-correctable failures, a 4xx class for the caller.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest { .. } | Self::InvalidParams { .. }
        )
    }

    /// Operator-visible misconfiguration, distinct from user error.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::NoStrategyFound { .. } | Self::Configuration { .. }
        )
    }

    /// Remote dependency failures that may clear on their own.
    pub fn is_dependency_error(&self) -> bool {
        matches!(
            self,
            Self::BackendUnavailable { .. }
                | Self::EmbeddingFailed { .. }
                | Self::CompletionFailed { .. }
                | Self::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_request_error() {
        let error = SearchError::invalid_request("query must not be empty");
        assert_eq!(
            error.to_string(),
            "Invalid request: query must not be empty"
        );
        assert!(error.is_user_error());
        assert!(!error.is_configuration_error());
    }

    #[test]
    fn test_no_strategy_found_error() {
        let error = SearchError::no_strategy_found("plasma");
        assert_eq!(
            error.to_string(),
            "No strategy registered for engine 'plasma'"
        );
        assert!(error.is_configuration_error());
        assert!(!error.is_user_error());
    }

    #[test]
    fn test_completion_failure_reasons() {
        let filtered = SearchError::completion_filtered("prompt rejected");
        let unavailable = SearchError::completion_unavailable("HTTP 503");

        assert!(matches!(
            filtered,
            SearchError::CompletionFailed {
                reason: CompletionFailureReason::ContentFiltered,
                ..
            }
        ));
        assert!(matches!(
            unavailable,
            SearchError::CompletionFailed {
                reason: CompletionFailureReason::Unavailable,
                ..
            }
        ));
        assert!(filtered.is_dependency_error());
    }

    #[test]
    fn test_backend_unavailable_names_backend() {
        let error = SearchError::backend_unavailable("lexical", "HTTP 503");
        assert_eq!(
            error.to_string(),
            "Search backend 'lexical' unavailable: HTTP 503"
        );
    }
}
