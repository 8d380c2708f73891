//! Unified SSE (Server-Sent Events) Parser
//!
//! Line buffering and event assembly live here; what an event turns into is
//! decided by an [`SSETransformer`].

use base64::Engine;
use bytes::Bytes;
use futures::Stream;
use serde_json::Value;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use crate::core::providers::unified_provider::ProviderError;
use crate::core::types::{RequestType, ResponseExtraFields, StreamChunk};

/// Parsed SSE Event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SSEEvent {
    pub event_type: Option<String>,
    pub data: String,
    pub id: Option<String>,
    pub retry: Option<u64>,
}

impl SSEEvent {
    /// Parse SSE event from a line
    pub fn from_line(line: &str) -> Option<Self> {
        if line.is_empty() || line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.find(':') {
            Some(colon_pos) => (&line[..colon_pos], line[colon_pos + 1..].trim_start()),
            None => (line, ""),
        };

        match field {
            "data" => Some(SSEEvent {
                data: value.to_string(),
                ..Default::default()
            }),
            "event" => Some(SSEEvent {
                event_type: Some(value.to_string()),
                ..Default::default()
            }),
            "id" => Some(SSEEvent {
                id: Some(value.to_string()),
                ..Default::default()
            }),
            "retry" => value.parse::<u64>().ok().map(|retry_ms| SSEEvent {
                retry: Some(retry_ms),
                ..Default::default()
            }),
            _ => None,
        }
    }
}

/// Trait for provider-specific SSE transformation
pub trait SSETransformer: Send {
    type Output: Send;

    /// Provider name for error reporting
    fn provider_name(&self) -> &str;

    /// Request type the stream belongs to
    fn stream_type(&self) -> &str;

    /// Check if this is the end-of-stream marker
    fn is_end_marker(&self, data: &str) -> bool {
        data.trim() == "[DONE]"
    }

    /// Transform one complete event; `Ok(None)` skips it
    fn transform_event(&mut self, event: &SSEEvent)
    -> Result<Option<Self::Output>, ProviderError>;
}

/// Chunks parsed from one batch of bytes, plus the error that cut the batch
/// short, if any
pub type ParsedBatch<O> = (Vec<O>, Option<ProviderError>);

/// Unified SSE Parser
pub struct UnifiedSSEParser<T: SSETransformer> {
    transformer: T,
    /// Raw bytes of the trailing incomplete line
    buffer: Vec<u8>,
    current_event: Option<SSEEvent>,
    done: bool,
}

impl<T: SSETransformer> UnifiedSSEParser<T> {
    /// Create new SSE parser with a transformer
    pub fn new(transformer: T) -> Self {
        Self {
            transformer,
            buffer: Vec::new(),
            current_event: None,
            done: false,
        }
    }

    /// Whether the end marker has been seen
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn transformer(&self) -> &T {
        &self.transformer
    }

    /// Process raw bytes into transformed events.
    ///
    /// Only complete lines are decoded, so a UTF-8 sequence split across
    /// network reads is reassembled first. Chunks parsed before an error are
    /// returned alongside it. Data after the end marker is ignored.
    pub fn process_bytes(&mut self, bytes: &[u8]) -> ParsedBatch<T::Output> {
        self.buffer.extend_from_slice(bytes);

        let mut chunks = Vec::new();
        let Some(pos) = self.buffer.iter().rposition(|&b| b == b'\n') else {
            return (chunks, None);
        };
        let complete: Vec<u8> = self.buffer.drain(..=pos).collect();

        for line in complete[..pos].split(|&b| b == b'\n') {
            if self.done {
                break;
            }
            let line = String::from_utf8_lossy(line);
            match self.process_line(line.trim_end_matches('\r')) {
                Ok(Some(chunk)) => chunks.push(chunk),
                Ok(None) => {}
                Err(e) => return (chunks, Some(e)),
            }
        }

        (chunks, None)
    }

    /// Flush whatever is left once the body has ended
    pub fn finish(&mut self) -> ParsedBatch<T::Output> {
        let mut chunks = Vec::new();
        if self.done {
            return (chunks, None);
        }

        let rest = std::mem::take(&mut self.buffer);
        if !rest.is_empty() {
            let line = String::from_utf8_lossy(&rest);
            match self.process_line(line.trim_end_matches('\r')) {
                Ok(Some(chunk)) => chunks.push(chunk),
                Ok(None) => {}
                Err(e) => return (chunks, Some(e)),
            }
        }
        if !self.done {
            match self.process_line("") {
                Ok(Some(chunk)) => chunks.push(chunk),
                Ok(None) => {}
                Err(e) => return (chunks, Some(e)),
            }
        }
        (chunks, None)
    }

    /// Process a single SSE line
    fn process_line(&mut self, line: &str) -> Result<Option<T::Output>, ProviderError> {
        // Empty line signals end of event
        if line.is_empty() {
            if let Some(event) = self.current_event.take() {
                return self.process_event(event);
            }
            return Ok(None);
        }

        if let Some(event) = SSEEvent::from_line(line) {
            match self.current_event.as_mut() {
                None => self.current_event = Some(event),
                Some(current) => {
                    if !event.data.is_empty() {
                        if !current.data.is_empty() {
                            current.data.push('\n');
                        }
                        current.data.push_str(&event.data);
                    }
                    if event.event_type.is_some() {
                        current.event_type = event.event_type;
                    }
                    if event.id.is_some() {
                        current.id = event.id;
                    }
                    if event.retry.is_some() {
                        current.retry = event.retry;
                    }
                }
            }
        }

        Ok(None)
    }

    /// Process a complete SSE event
    fn process_event(&mut self, event: SSEEvent) -> Result<Option<T::Output>, ProviderError> {
        if event.data.is_empty() {
            return Ok(None);
        }

        if self.transformer.is_end_marker(&event.data) {
            self.done = true;
            return Ok(None);
        }

        self.transformer.transform_event(&event)
    }
}

/// Streaming wrapper that uses UnifiedSSEParser.
///
/// The stream ends after the end marker, after the body ends, or right after
/// yielding the first error, whichever comes first. Chunks parsed ahead of an
/// error in the same read are yielded before it.
pub struct UnifiedSSEStream<S, T>
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + Unpin,
    T: SSETransformer,
{
    inner: S,
    parser: UnifiedSSEParser<T>,
    chunk_buffer: VecDeque<T::Output>,
    pending_error: Option<ProviderError>,
    finished: bool,
}

impl<S, T> UnifiedSSEStream<S, T>
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + Unpin,
    T: SSETransformer,
{
    pub fn new(stream: S, transformer: T) -> Self {
        Self {
            inner: stream,
            parser: UnifiedSSEParser::new(transformer),
            chunk_buffer: VecDeque::new(),
            pending_error: None,
            finished: false,
        }
    }

    fn absorb(&mut self, (chunks, error): ParsedBatch<T::Output>) {
        self.chunk_buffer.extend(chunks);
        self.pending_error = error;
    }
}

impl<S, T> Stream for UnifiedSSEStream<S, T>
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + Unpin,
    T: SSETransformer + Unpin,
    T::Output: Unpin,
{
    type Item = Result<T::Output, ProviderError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(chunk) = this.chunk_buffer.pop_front() {
                return Poll::Ready(Some(Ok(chunk)));
            }

            if let Some(error) = this.pending_error.take() {
                this.finished = true;
                return Poll::Ready(Some(Err(error)));
            }

            if this.finished || this.parser.is_done() {
                return Poll::Ready(None);
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    let batch = this.parser.process_bytes(&bytes);
                    this.absorb(batch);
                }
                Poll::Ready(Some(Err(e))) => {
                    let transformer = this.parser.transformer();
                    this.pending_error = Some(ProviderError::streaming_error(
                        transformer.provider_name(),
                        transformer.stream_type(),
                        format!("Stream error: {}", e),
                    ));
                }
                Poll::Ready(None) => {
                    this.finished = true;
                    let batch = this.parser.finish();
                    this.absorb(batch);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// OpenAI-compatible SSE transformer producing [`StreamChunk`]s stamped with
/// the delegating provider's identity
#[derive(Debug, Clone)]
pub struct OpenAICompatibleTransformer {
    provider: String,
    request_type: RequestType,
    model_requested: String,
    started: Instant,
    next_index: u64,
}

impl OpenAICompatibleTransformer {
    pub fn new(
        provider: impl Into<String>,
        request_type: RequestType,
        model_requested: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            request_type,
            model_requested: model_requested.into(),
            started: Instant::now(),
            next_index: 0,
        }
    }

    fn error_from_payload(&self, error: &Value) -> ProviderError {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("upstream stream error");
        ProviderError::streaming_error(
            self.provider.clone(),
            self.request_type.as_str(),
            message,
        )
    }

    fn decode_audio(&self, data: &Value) -> Result<Option<Bytes>, ProviderError> {
        if self.request_type != RequestType::SpeechStream {
            return Ok(None);
        }
        let Some(encoded) = data.get("audio").and_then(Value::as_str) else {
            return Ok(None);
        };
        base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map(|audio| Some(Bytes::from(audio)))
            .map_err(|e| {
                ProviderError::response_parsing(
                    self.provider.clone(),
                    format!("Invalid base64 audio delta: {}", e),
                )
            })
    }
}

impl SSETransformer for OpenAICompatibleTransformer {
    type Output = StreamChunk;

    fn provider_name(&self) -> &str {
        &self.provider
    }

    fn stream_type(&self) -> &str {
        self.request_type.as_str()
    }

    fn transform_event(&mut self, event: &SSEEvent) -> Result<Option<StreamChunk>, ProviderError> {
        let data: Value = serde_json::from_str(&event.data).map_err(|e| {
            ProviderError::response_parsing(
                self.provider.clone(),
                format!("Failed to parse SSE JSON: {}", e),
            )
        })?;

        if event.event_type.as_deref() == Some("error") {
            return Err(self.error_from_payload(data.get("error").unwrap_or(&data)));
        }
        if let Some(error) = data.get("error").filter(|e| e.is_object()) {
            return Err(self.error_from_payload(error));
        }

        let audio = self.decode_audio(&data)?;

        let mut extra_fields = ResponseExtraFields::new(
            self.provider.clone(),
            self.request_type,
            self.model_requested.clone(),
        );
        extra_fields.latency = self.started.elapsed().as_millis() as u64;
        extra_fields.chunk_index = Some(self.next_index);
        self.next_index += 1;

        Ok(Some(StreamChunk {
            data,
            audio,
            extra_fields,
        }))
    }
}
