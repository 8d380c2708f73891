//! Unified Provider Error Handling
//!
//! Single error type for every outbound provider call.
//!
//! | Variant | Purpose | HTTP Status | Retryable |
//! |------|------|------------|--------|
//! | Authentication | Authentication failed | 401 | No |
//! | RateLimit | Rate limit exceeded | 429 | Yes (after delay) |
//! | ModelNotFound | Model not found | 404 | No |
//! | InvalidRequest | Invalid request | 400 | No |
//! | OperationNotAllowed | Request type disabled for the provider | 403 | No |
//! | Network | Network error | 503 | Yes |
//! | Timeout | Timeout | 503 | Yes |
//! | ApiError | Upstream returned an error status | status | 429 / 5xx |
//! | Streaming | Stream broke after it started | 500 | No |
//! | Other | Other error | 500 | No |
//!
//! Every variant carries the identity of the provider that produced it. The
//! identity is the one reported to callers, which for delegated calls is the
//! delegating provider and never the generic handler doing the I/O.
//!
//! ```rust,ignore
//! use apertus_gateway::ProviderError;
//!
//! let err = ProviderError::rate_limit("apertus", Some(60));
//! if err.is_retryable() {
//!     if let Some(delay) = err.retry_delay() {
//!         println!("Retry after {} seconds", delay);
//!     }
//! }
//! ```

/// Unified provider error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("Authentication failed for {provider}: {message}")]
    Authentication { provider: String, message: String },

    #[error("Rate limit exceeded for {provider}: {message}")]
    RateLimit {
        provider: String,
        message: String,
        retry_after: Option<u64>,
    },

    #[error("Model '{model}' not found for {provider}")]
    ModelNotFound { provider: String, model: String },

    #[error("Invalid request for {provider}: {message}")]
    InvalidRequest { provider: String, message: String },

    /// Rejected by the operation policy before any network activity
    #[error("Operation '{request_type}' is not allowed for {provider}")]
    OperationNotAllowed {
        provider: String,
        request_type: String,
    },

    #[error("Network error for {provider}: {message}")]
    Network { provider: String, message: String },

    #[error("Configuration error for {provider}: {message}")]
    Configuration { provider: String, message: String },

    #[error("Serialization error for {provider}: {message}")]
    Serialization { provider: String, message: String },

    #[error("Timeout for {provider}: {message}")]
    Timeout { provider: String, message: String },

    /// API error with status code
    #[error("API error for {provider} (status {status}): {message}")]
    ApiError {
        provider: String,
        status: u16,
        message: String,
        /// Upstream error type (`error.type` in the OpenAI error body)
        error_type: Option<String>,
        /// Upstream error code (`error.code` in the OpenAI error body)
        code: Option<String>,
    },

    #[error("Failed to parse {provider} response: {message}")]
    ResponseParsing { provider: String, message: String },

    /// Streaming operation error
    #[error("Streaming error for {provider}: {stream_type}: {message}")]
    Streaming {
        provider: String,
        /// Request type the stream belongs to
        stream_type: String,
        message: String,
    },

    #[error("{provider} error: {message}")]
    Other { provider: String, message: String },
}

impl ProviderError {
    pub fn authentication(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Authentication {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create rate limit error
    pub fn rate_limit(provider: impl Into<String>, retry_after: Option<u64>) -> Self {
        Self::RateLimit {
            provider: provider.into(),
            message: match retry_after {
                Some(seconds) => format!("Rate limit exceeded. Retry after {} seconds", seconds),
                None => "Rate limit exceeded".to_string(),
            },
            retry_after,
        }
    }

    /// Create rate limit error with an upstream message
    pub fn rate_limit_with_retry(
        provider: impl Into<String>,
        message: impl Into<String>,
        retry_after: Option<u64>,
    ) -> Self {
        Self::RateLimit {
            provider: provider.into(),
            message: message.into(),
            retry_after,
        }
    }

    pub fn model_not_found(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self::ModelNotFound {
            provider: provider.into(),
            model: model.into(),
        }
    }

    pub fn invalid_request(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create operation-not-allowed error
    pub fn operation_not_allowed(
        provider: impl Into<String>,
        request_type: impl Into<String>,
    ) -> Self {
        Self::OperationNotAllowed {
            provider: provider.into(),
            request_type: request_type.into(),
        }
    }

    pub fn network(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn configuration(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn serialization(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn timeout(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Timeout {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create API error with status code
    pub fn api_error(
        provider: impl Into<String>,
        status: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::ApiError {
            provider: provider.into(),
            status,
            message: message.into(),
            error_type: None,
            code: None,
        }
    }

    pub fn response_parsing(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ResponseParsing {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create streaming error
    pub fn streaming_error(
        provider: impl Into<String>,
        stream_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Streaming {
            provider: provider.into(),
            stream_type: stream_type.into(),
            message: message.into(),
        }
    }

    pub fn other(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Other {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Convert a transport error into a provider error owned by `provider`
    pub fn from_reqwest(provider: impl Into<String>, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout(provider, err.to_string())
        } else {
            Self::network(provider, err.to_string())
        }
    }

    /// Get the provider identity carried by this error
    pub fn provider(&self) -> &str {
        match self {
            Self::Authentication { provider, .. }
            | Self::RateLimit { provider, .. }
            | Self::ModelNotFound { provider, .. }
            | Self::InvalidRequest { provider, .. }
            | Self::OperationNotAllowed { provider, .. }
            | Self::Network { provider, .. }
            | Self::Configuration { provider, .. }
            | Self::Serialization { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::ApiError { provider, .. }
            | Self::ResponseParsing { provider, .. }
            | Self::Streaming { provider, .. }
            | Self::Other { provider, .. } => provider,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Timeout { .. } | Self::RateLimit { .. } => true,

            Self::ApiError { status, .. } => matches!(*status, 429 | 500..=599),

            // A broken stream has already delivered data to the caller
            Self::Streaming { .. } => false,

            Self::Authentication { .. }
            | Self::ModelNotFound { .. }
            | Self::InvalidRequest { .. }
            | Self::OperationNotAllowed { .. }
            | Self::Configuration { .. }
            | Self::Serialization { .. }
            | Self::ResponseParsing { .. }
            | Self::Other { .. } => false,
        }
    }

    /// Get retry delay in seconds
    pub fn retry_delay(&self) -> Option<u64> {
        match self {
            Self::RateLimit { retry_after, .. } => *retry_after,
            Self::Network { .. } | Self::Timeout { .. } => Some(1),
            Self::ApiError { status, .. } => match *status {
                429 => Some(60),
                500..=599 => Some(3),
                _ => None,
            },
            _ => None,
        }
    }

    /// Get HTTP status code for this error
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Authentication { .. } => 401,
            Self::RateLimit { .. } => 429,
            Self::ModelNotFound { .. } => 404,
            Self::InvalidRequest { .. } => 400,
            Self::OperationNotAllowed { .. } => 403,
            Self::Configuration { .. } => 400,
            Self::Network { .. } | Self::Timeout { .. } => 503,
            Self::Serialization { .. } => 500,
            Self::ApiError { status, .. } => *status,
            Self::ResponseParsing { .. } => 502,
            Self::Streaming { .. } => 500,
            Self::Other { .. } => 500,
        }
    }

    /// Short machine-readable error kind
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Authentication { .. } => "authentication",
            Self::RateLimit { .. } => "rate_limit",
            Self::ModelNotFound { .. } => "model_not_found",
            Self::InvalidRequest { .. } => "invalid_request",
            Self::OperationNotAllowed { .. } => "operation_not_allowed",
            Self::Network { .. } => "network",
            Self::Configuration { .. } => "configuration",
            Self::Serialization { .. } => "serialization",
            Self::Timeout { .. } => "timeout",
            Self::ApiError { .. } => "api_error",
            Self::ResponseParsing { .. } => "response_parsing",
            Self::Streaming { .. } => "streaming",
            Self::Other { .. } => "other",
        }
    }
}
