//! Request shapes understood by the dispatcher

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One API operation kind, blocking or streaming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    ListModels,
    TextCompletion,
    TextCompletionStream,
    ChatCompletion,
    ChatCompletionStream,
    Responses,
    ResponsesStream,
    Embedding,
    Speech,
    SpeechStream,
    Transcription,
    TranscriptionStream,
}

impl RequestType {
    pub const ALL: [RequestType; 12] = [
        RequestType::ListModels,
        RequestType::TextCompletion,
        RequestType::TextCompletionStream,
        RequestType::ChatCompletion,
        RequestType::ChatCompletionStream,
        RequestType::Responses,
        RequestType::ResponsesStream,
        RequestType::Embedding,
        RequestType::Speech,
        RequestType::SpeechStream,
        RequestType::Transcription,
        RequestType::TranscriptionStream,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::ListModels => "list_models",
            RequestType::TextCompletion => "text_completion",
            RequestType::TextCompletionStream => "text_completion_stream",
            RequestType::ChatCompletion => "chat_completion",
            RequestType::ChatCompletionStream => "chat_completion_stream",
            RequestType::Responses => "responses",
            RequestType::ResponsesStream => "responses_stream",
            RequestType::Embedding => "embedding",
            RequestType::Speech => "speech",
            RequestType::SpeechStream => "speech_stream",
            RequestType::Transcription => "transcription",
            RequestType::TranscriptionStream => "transcription_stream",
        }
    }

    /// Fixed path suffix appended to the base URL
    pub fn default_path(&self) -> &'static str {
        match self {
            RequestType::ListModels => "/v1/models",
            RequestType::TextCompletion | RequestType::TextCompletionStream => "/v1/completions",
            RequestType::ChatCompletion | RequestType::ChatCompletionStream => {
                "/v1/chat/completions"
            }
            RequestType::Responses | RequestType::ResponsesStream => "/v1/responses",
            RequestType::Embedding => "/v1/embeddings",
            RequestType::Speech | RequestType::SpeechStream => "/v1/audio/speech",
            RequestType::Transcription | RequestType::TranscriptionStream => {
                "/v1/audio/transcriptions"
            }
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(
            self,
            RequestType::TextCompletionStream
                | RequestType::ChatCompletionStream
                | RequestType::ResponsesStream
                | RequestType::SpeechStream
                | RequestType::TranscriptionStream
        )
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RequestType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown request type: {}", s))
    }
}
