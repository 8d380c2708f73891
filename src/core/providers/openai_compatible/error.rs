//! Upstream error mapping for OpenAI-compatible backends

use serde_json::Value;

use crate::core::providers::unified_provider::ProviderError;

/// Maps OpenAI-style error responses to [`ProviderError`]s owned by the
/// delegating provider
#[derive(Debug, Clone)]
pub struct OpenAIErrorMapper {
    provider: String,
}

impl OpenAIErrorMapper {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
        }
    }

    /// Map HTTP status code and response body to a provider error
    pub fn map_http_error(
        &self,
        status_code: u16,
        response_body: &str,
        retry_after: Option<u64>,
    ) -> ProviderError {
        match serde_json::from_str::<Value>(response_body) {
            Ok(error_json) if error_json.get("error").is_some() => {
                self.map_json_error(status_code, &error_json, retry_after)
            }
            _ => self.map_status(status_code, response_body.trim(), None, None, retry_after),
        }
    }

    /// Map a parsed `{"error": {...}}` body
    pub fn map_json_error(
        &self,
        status_code: u16,
        error_response: &Value,
        retry_after: Option<u64>,
    ) -> ProviderError {
        let error = error_response.get("error").unwrap_or(error_response);

        // Some backends send `"error": "text"` instead of an object
        if let Some(text) = error.as_str() {
            return self.map_status(status_code, text, None, None, retry_after);
        }

        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error");
        let error_type = error.get("type").and_then(Value::as_str);
        let code = error.get("code").and_then(|c| match c {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        if code.as_deref() == Some("model_not_found") {
            let model = error
                .get("param")
                .and_then(Value::as_str)
                .unwrap_or(message);
            return ProviderError::model_not_found(self.provider.clone(), model);
        }

        self.map_status(status_code, message, error_type, code, retry_after)
    }

    fn map_status(
        &self,
        status_code: u16,
        message: &str,
        error_type: Option<&str>,
        code: Option<String>,
        retry_after: Option<u64>,
    ) -> ProviderError {
        let message = if message.is_empty() {
            format!("HTTP {}", status_code)
        } else {
            message.to_string()
        };

        match status_code {
            401 | 403 => ProviderError::authentication(self.provider.clone(), message),
            429 => ProviderError::rate_limit_with_retry(self.provider.clone(), message, retry_after),
            400 if error_type == Some("invalid_request_error") => {
                ProviderError::invalid_request(self.provider.clone(), message)
            }
            _ => ProviderError::ApiError {
                provider: self.provider.clone(),
                status: status_code,
                message,
                error_type: error_type.map(str::to_string),
                code,
            },
        }
    }
}
