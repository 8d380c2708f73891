//! Shared request handler for OpenAI-compatible backends.
//!
//! The handler performs the network I/O for every request shape. It never
//! decides who it is: the caller hands over a [`RequestTarget`] naming the
//! provider identity, and that identity is stamped on every response, chunk
//! and error produced here.

use futures::Stream;
use reqwest::header::{ACCEPT, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;
use std::time::{Duration, Instant};
use tracing::debug;

use super::error::OpenAIErrorMapper;
use super::multipart::create_transcription_form;
use crate::core::providers::base::{ConnectionPool, OpenAICompatibleTransformer, UnifiedSSEStream};
use crate::core::providers::unified_provider::ProviderError;
use crate::core::types::{
    ProviderResponse, RequestType, ResponseExtraFields, SpeechResponse, StreamChunk,
    TranscriptionRequest, TranscriptionResponse,
};
use crate::utils::error::{RetryConfig, RetryPolicy};
use crate::utils::logging::mask_secret;

/// Stream of chunks; ends after completion or after the first error
pub type ProviderStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, ProviderError>> + Send>>;

/// Everything one outbound call needs.
///
/// Built fresh for every request and never shared, so per-request settings
/// cannot leak between calls.
#[derive(Clone)]
pub struct RequestTarget {
    /// Fully resolved URL
    pub url: String,
    /// Bearer credential; empty sends no Authorization header
    pub api_key: String,
    /// Identity reported on responses and errors
    pub provider: String,
    pub request_type: RequestType,
    /// Model name before mapping
    pub model_requested: String,
    pub extra_headers: HashMap<String, String>,
    pub timeout: Duration,
    pub retry: RetryConfig,
    pub send_back_raw_response: bool,
}

impl fmt::Debug for RequestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestTarget")
            .field("url", &self.url)
            .field("api_key", &mask_secret(&self.api_key))
            .field("provider", &self.provider)
            .field("request_type", &self.request_type)
            .field("model_requested", &self.model_requested)
            .field("timeout", &self.timeout)
            .field("max_attempts", &self.retry.max_attempts)
            .finish()
    }
}

impl RequestTarget {
    fn extra_fields(&self, started: Instant, raw: Option<&Value>) -> ResponseExtraFields {
        let mut extra_fields = ResponseExtraFields::new(
            self.provider.clone(),
            self.request_type,
            self.model_requested.clone(),
        );
        extra_fields.latency = started.elapsed().as_millis() as u64;
        if self.send_back_raw_response {
            extra_fields.raw_response = raw.cloned();
        }
        extra_fields
    }
}

/// OpenAI-compatible request handler
#[derive(Debug, Clone)]
pub struct OpenAICompatibleHandler {
    pool: ConnectionPool,
}

impl OpenAICompatibleHandler {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Blocking JSON call: completion, chat, responses, embedding
    pub async fn json_request<B>(
        &self,
        target: &RequestTarget,
        body: &B,
    ) -> Result<ProviderResponse, ProviderError>
    where
        B: Serialize + ?Sized,
    {
        let started = Instant::now();
        let payload = serde_json::to_value(body)
            .map_err(|e| ProviderError::serialization(&target.provider, e.to_string()))?;

        let response = self
            .send(target, |client| Ok(client.post(&target.url).json(&payload)), false)
            .await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::from_reqwest(&target.provider, &e))?;
        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ProviderError::response_parsing(&target.provider, e.to_string()))?;

        Ok(ProviderResponse {
            extra_fields: target.extra_fields(started, Some(&body)),
            body,
        })
    }

    /// Streaming JSON call; `payload` must already carry the stream switch
    pub async fn stream_request(
        &self,
        target: &RequestTarget,
        payload: Value,
    ) -> Result<ProviderStream, ProviderError> {
        let response = self
            .send(target, |client| Ok(client.post(&target.url).json(&payload)), true)
            .await?;
        Ok(Self::into_stream(target, response))
    }

    /// Speech synthesis returning the audio bytes
    pub async fn speech_request<B>(
        &self,
        target: &RequestTarget,
        body: &B,
    ) -> Result<SpeechResponse, ProviderError>
    where
        B: Serialize + ?Sized,
    {
        let started = Instant::now();
        let payload = serde_json::to_value(body)
            .map_err(|e| ProviderError::serialization(&target.provider, e.to_string()))?;

        let response = self
            .send(target, |client| Ok(client.post(&target.url).json(&payload)), false)
            .await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let audio = response
            .bytes()
            .await
            .map_err(|e| ProviderError::from_reqwest(&target.provider, &e))?;

        Ok(SpeechResponse {
            audio,
            content_type,
            extra_fields: target.extra_fields(started, None),
        })
    }

    /// Multipart transcription upload
    pub async fn transcription_request(
        &self,
        target: &RequestTarget,
        request: &TranscriptionRequest,
    ) -> Result<TranscriptionResponse, ProviderError> {
        let started = Instant::now();
        let response = self
            .send(
                target,
                |client| {
                    let form = create_transcription_form(&target.provider, request, false)?;
                    Ok(client.post(&target.url).multipart(form))
                },
                false,
            )
            .await?;

        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::from_reqwest(&target.provider, &e))?;

        let json_format = matches!(
            request.response_format.as_deref(),
            None | Some("json") | Some("verbose_json")
        );
        let body = if json_format {
            serde_json::from_str::<Value>(&text)
                .map_err(|e| ProviderError::response_parsing(&target.provider, e.to_string()))?
        } else {
            json!({ "text": text })
        };

        Ok(TranscriptionResponse {
            text: body
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            language: body
                .get("language")
                .and_then(Value::as_str)
                .map(str::to_string),
            duration: body.get("duration").and_then(Value::as_f64),
            extra_fields: target.extra_fields(started, Some(&body)),
            body,
        })
    }

    /// Streaming multipart transcription
    pub async fn transcription_stream(
        &self,
        target: &RequestTarget,
        request: &TranscriptionRequest,
    ) -> Result<ProviderStream, ProviderError> {
        let response = self
            .send(
                target,
                |client| {
                    let form = create_transcription_form(&target.provider, request, true)?;
                    Ok(client.post(&target.url).multipart(form))
                },
                true,
            )
            .await?;
        Ok(Self::into_stream(target, response))
    }

    fn into_stream(target: &RequestTarget, response: Response) -> ProviderStream {
        let transformer = OpenAICompatibleTransformer::new(
            target.provider.clone(),
            target.request_type,
            target.model_requested.clone(),
        );
        Box::pin(UnifiedSSEStream::new(
            Box::pin(response.bytes_stream()),
            transformer,
        ))
    }

    /// Send with retries; only failures before a successful status are retried
    async fn send<F>(
        &self,
        target: &RequestTarget,
        build: F,
        streaming: bool,
    ) -> Result<Response, ProviderError>
    where
        F: Fn(&Client) -> Result<RequestBuilder, ProviderError>,
    {
        let policy = RetryPolicy::new(target.retry.clone());
        policy
            .call_if(
                || self.send_once(target, &build, streaming),
                ProviderError::is_retryable,
            )
            .await
    }

    async fn send_once<F>(
        &self,
        target: &RequestTarget,
        build: &F,
        streaming: bool,
    ) -> Result<Response, ProviderError>
    where
        F: Fn(&Client) -> Result<RequestBuilder, ProviderError>,
    {
        let mut request = build(self.pool.client())?;
        if !target.api_key.is_empty() {
            request = request.bearer_auth(&target.api_key);
        }
        for (name, value) in &target.extra_headers {
            request = request.header(name.as_str(), value.as_str());
        }

        debug!(
            provider = %target.provider,
            request_type = %target.request_type,
            url = %target.url,
            "sending upstream request"
        );

        let response = if streaming {
            // Whole-request timeouts would cut long streams short; bound only
            // the wait for response headers.
            tokio::time::timeout(target.timeout, request.header(ACCEPT, "text/event-stream").send())
                .await
                .map_err(|_| {
                    ProviderError::timeout(
                        &target.provider,
                        format!("no response within {:?}", target.timeout),
                    )
                })?
        } else {
            request.timeout(target.timeout).send().await
        }
        .map_err(|e| ProviderError::from_reqwest(&target.provider, &e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();

        Err(OpenAIErrorMapper::new(target.provider.clone()).map_http_error(
            status.as_u16(),
            &body,
            retry_after,
        ))
    }
}
