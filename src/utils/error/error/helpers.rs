//! Helper functions for creating specific error types

use super::types::GatewayError;

impl GatewayError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Provider identity when the error came from a provider call
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::Provider(err) => Some(err.provider()),
            _ => None,
        }
    }

    /// Whether the error was caused by malformed persisted or user data
    pub fn is_codec_error(&self) -> bool {
        matches!(self, Self::Serialization(_) | Self::Validation(_))
    }
}
