//! Streaming dispatch tests

#[cfg(test)]
mod tests {
    use crate::common::upstream::{chat_chunk, sse_response};
    use crate::common::{KeyFactory, ProviderFactory};
    use crate::{assert_err, assert_ok};
    use apertus_gateway::{
        ApertusProvider, ChatRequest, ProviderError, RequestType, ResponsesRequest,
        TextCompletionRequest,
    };
    use futures::StreamExt;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_chat_stream_yields_chunks_until_done() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({ "model": "prod-deploy-1", "stream": true })))
            .respond_with(sse_response(&[chat_chunk("Hel"), chat_chunk("lo")]))
            .expect(1)
            .mount(&server)
            .await;

        let provider = assert_ok!(ApertusProvider::new(ProviderFactory::custom(
            &server.uri(),
            "swiss-apertus"
        )));
        let key = KeyFactory::with_mapping("gpt-4o", "prod-deploy-1");
        let request = ChatRequest::new("gpt-4o")
            .with_param("messages", json!([{ "role": "user", "content": "Hi" }]));

        let stream = assert_ok!(provider.chat_completion_stream(&key, request).await);
        let chunks: Vec<_> = stream.collect().await;
        assert_eq!(chunks.len(), 2);

        let chunks: Vec<_> = chunks.into_iter().map(|c| assert_ok!(c)).collect();
        let text: String = chunks.iter().filter_map(|c| c.text_delta()).collect();
        assert_eq!(text, "Hello");
        for (index, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.extra_fields.provider, "swiss-apertus");
            assert_eq!(chunk.extra_fields.request_type, RequestType::ChatCompletionStream);
            assert_eq!(chunk.extra_fields.model_requested, "gpt-4o");
            assert_eq!(chunk.extra_fields.chunk_index, Some(index as u64));
        }
    }

    #[tokio::test]
    async fn test_text_and_responses_streams() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .and(body_partial_json(json!({ "stream": true })))
            .respond_with(sse_response(&[json!({
                "id": "cmpl-1",
                "choices": [{ "index": 0, "text": "hi" }]
            })]))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .and(body_partial_json(json!({ "stream": true })))
            .respond_with(sse_response(&[
                json!({ "type": "response.output_text.delta", "delta": "Hi" }),
                json!({ "type": "response.completed" }),
            ]))
            .expect(1)
            .mount(&server)
            .await;

        let provider = assert_ok!(ApertusProvider::new(ProviderFactory::with_base_url(&server.uri())));
        let key = KeyFactory::create();

        let text_stream = assert_ok!(
            provider
                .text_completion_stream(
                    &key,
                    TextCompletionRequest::new("gpt-3.5-turbo-instruct").with_param("prompt", json!("x")),
                )
                .await
        );
        let text_chunks: Vec<_> = text_stream.collect().await;
        assert_eq!(text_chunks.len(), 1);
        assert_eq!(assert_ok!(&text_chunks[0]).text_delta(), Some("hi"));

        let responses_stream = assert_ok!(
            provider
                .responses_stream(&key, ResponsesRequest::new("gpt-4o").with_param("input", json!("x")))
                .await
        );
        let events: Vec<_> = responses_stream.collect().await;
        assert_eq!(events.len(), 2);
        assert_eq!(assert_ok!(&events[0]).text_delta(), Some("Hi"));
        assert_eq!(
            assert_ok!(&events[1]).extra_fields.request_type,
            RequestType::ResponsesStream
        );
    }

    #[tokio::test]
    async fn test_stream_ends_after_error_event() {
        let server = MockServer::start().await;
        let body = format!(
            "data: {}\n\ndata: {}\n\ndata: {}\n\ndata: [DONE]\n\n",
            chat_chunk("partial"),
            json!({ "error": { "message": "backend overloaded", "type": "server_error" } }),
            chat_chunk("never seen"),
        );
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let provider = assert_ok!(ApertusProvider::new(ProviderFactory::with_base_url(&server.uri())));
        let stream = assert_ok!(
            provider
                .chat_completion_stream(&KeyFactory::create(), ChatRequest::new("gpt-4"))
                .await
        );
        let items: Vec<_> = stream.collect().await;

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        let err = assert_err!(&items[1]);
        assert!(matches!(err, ProviderError::Streaming { .. }));
        assert_eq!(err.provider(), "apertus");
    }

    #[tokio::test]
    async fn test_stream_rejected_before_first_byte() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "message": "Too many requests", "type": "rate_limit_error" }
            })))
            .mount(&server)
            .await;

        let provider = assert_ok!(ApertusProvider::new(ProviderFactory::with_base_url(&server.uri())));
        let result = provider
            .chat_completion_stream(&KeyFactory::create(), ChatRequest::new("gpt-4"))
            .await;
        let err = assert_err!(result.map(|_| ()));
        assert!(matches!(err, ProviderError::RateLimit { .. }));
    }

    #[tokio::test]
    async fn test_stream_policy_is_per_mode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = assert_ok!(ApertusProvider::new(ProviderFactory::denying(
            &server.uri(),
            "swiss-apertus",
            RequestType::ChatCompletionStream,
        )));
        let result = provider
            .chat_completion_stream(&KeyFactory::create(), ChatRequest::new("gpt-4"))
            .await;
        let err = assert_err!(result.map(|_| ()));
        assert!(matches!(err, ProviderError::OperationNotAllowed { .. }));
    }
}
