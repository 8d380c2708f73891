//! Multipart form construction for audio uploads

use reqwest::multipart;

use crate::core::providers::unified_provider::ProviderError;
use crate::core::types::TranscriptionRequest;

/// MIME type inferred from the upload's file name
pub fn audio_mime_type(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "mp3" | "mpga" | "mpeg" => "audio/mpeg",
        "mp4" | "m4a" => "audio/mp4",
        "wav" => "audio/wav",
        "webm" => "audio/webm",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        _ => "application/octet-stream",
    }
}

/// Create multipart form for a transcription upload
pub fn create_transcription_form(
    provider: &str,
    request: &TranscriptionRequest,
    stream: bool,
) -> Result<multipart::Form, ProviderError> {
    let filename = if request.filename.is_empty() {
        "audio.mp3".to_string()
    } else {
        request.filename.clone()
    };

    let file_part = multipart::Part::bytes(request.file.clone())
        .file_name(filename.clone())
        .mime_str(audio_mime_type(&filename))
        .map_err(|e| ProviderError::invalid_request(provider, format!("Invalid MIME type: {}", e)))?;

    let mut form = multipart::Form::new()
        .part("file", file_part)
        .text("model", request.model.clone());

    if let Some(language) = &request.language {
        form = form.text("language", language.clone());
    }
    if let Some(prompt) = &request.prompt {
        form = form.text("prompt", prompt.clone());
    }
    if let Some(response_format) = &request.response_format {
        form = form.text("response_format", response_format.clone());
    }
    if let Some(temperature) = request.temperature {
        form = form.text("temperature", temperature.to_string());
    }
    if let Some(timestamp_granularities) = &request.timestamp_granularities {
        for granularity in timestamp_granularities {
            form = form.text("timestamp_granularities[]", granularity.clone());
        }
    }
    if stream {
        form = form.text("stream", "true");
    }

    Ok(form)
}
