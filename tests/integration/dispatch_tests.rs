//! Blocking dispatch tests against a mock OpenAI-compatible backend

#[cfg(test)]
mod tests {
    use crate::common::upstream::chat_completion_body;
    use crate::common::{KeyFactory, ProviderFactory};
    use crate::{assert_err, assert_ok};
    use apertus_gateway::{
        ApertusKeyConfig, ApertusProvider, ChatRequest, EmbeddingRequest, ProviderError,
        RequestType, ResponsesRequest, TextCompletionRequest,
    };
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // Nothing listens on the discard port
    const UNREACHABLE: &str = "http://127.0.0.1:9";

    fn chat(model: &str) -> ChatRequest {
        ChatRequest::new(model).with_param("messages", json!([{ "role": "user", "content": "Hi" }]))
    }

    #[tokio::test]
    async fn test_endpoint_override_routes_chat() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test-0123456789"))
            .and(body_partial_json(json!({ "model": "gpt-4" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body("gpt-4", "Hello")))
            .expect(1)
            .mount(&server)
            .await;

        let provider = assert_ok!(ApertusProvider::new(ProviderFactory::with_base_url(UNREACHABLE)));
        let key = KeyFactory::with_endpoint(&format!("{}/", server.uri()));

        let response = assert_ok!(provider.chat_completion(&key, chat("gpt-4")).await);
        assert_eq!(response.body["choices"][0]["message"]["content"], "Hello");
        assert_eq!(response.extra_fields.provider, "apertus");
        assert_eq!(response.extra_fields.request_type, RequestType::ChatCompletion);
        assert_eq!(response.extra_fields.model_requested, "gpt-4");
        assert!(response.extra_fields.raw_response.is_none());
    }

    #[tokio::test]
    async fn test_model_mapping_rewrites_outgoing_model() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({ "model": "prod-deploy-1" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(chat_completion_body("prod-deploy-1", "ok")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = assert_ok!(ApertusProvider::new(ProviderFactory::with_base_url(&server.uri())));
        let key = KeyFactory::with_mapping("gpt-4o", "prod-deploy-1");

        let response = assert_ok!(provider.chat_completion(&key, chat("gpt-4o")).await);
        assert_eq!(response.model(), Some("prod-deploy-1"));
        assert_eq!(response.extra_fields.model_requested, "gpt-4o");
    }

    #[tokio::test]
    async fn test_unmapped_model_passes_through() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/completions"))
            .and(body_partial_json(json!({ "model": "gpt-3.5-turbo-instruct", "prompt": "Say hi" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cmpl-1",
                "object": "text_completion",
                "model": "gpt-3.5-turbo-instruct",
                "choices": [{ "index": 0, "text": "hi", "finish_reason": "stop" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = assert_ok!(ApertusProvider::new(ProviderFactory::with_base_url(&server.uri())));
        let key = KeyFactory::with_mapping("gpt-4o", "prod-deploy-1");
        let request = TextCompletionRequest::new("gpt-3.5-turbo-instruct")
            .with_param("prompt", json!("Say hi"));

        let response = assert_ok!(provider.text_completion(&key, request).await);
        assert_eq!(response.body["choices"][0]["text"], "hi");
        assert_eq!(response.extra_fields.request_type, RequestType::TextCompletion);
    }

    #[tokio::test]
    async fn test_responses_and_embeddings_paths() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "resp_1", "object": "response", "model": "gpt-4o", "output": []
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .and(body_partial_json(json!({ "model": "text-embedding-3-small" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [{ "object": "embedding", "index": 0, "embedding": [0.1, 0.2] }],
                "model": "text-embedding-3-small"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = assert_ok!(ApertusProvider::new(ProviderFactory::with_base_url(&server.uri())));
        let key = KeyFactory::create();

        let response = assert_ok!(
            provider
                .responses(&key, ResponsesRequest::new("gpt-4o").with_param("input", json!("Hi")))
                .await
        );
        assert_eq!(response.id(), Some("resp_1"));

        let embedding = assert_ok!(
            provider
                .embedding(
                    &key,
                    EmbeddingRequest::new("text-embedding-3-small").with_param("input", json!("Hi")),
                )
                .await
        );
        assert_eq!(embedding.body["data"][0]["embedding"][1], 0.2);
        assert_eq!(embedding.extra_fields.request_type, RequestType::Embedding);
    }

    #[tokio::test]
    async fn test_path_override_and_extra_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(header("x-tenant", "zurich"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body("gpt-4", "ok")))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = ProviderFactory::custom(&server.uri(), "swiss-apertus");
        config
            .network_config
            .extra_headers
            .insert("x-tenant".to_string(), "zurich".to_string());
        if let Some(custom) = config.custom_provider_config.as_mut() {
            custom
                .request_path_overrides
                .insert(RequestType::ChatCompletion, "/api/chat".to_string());
        }

        let provider = assert_ok!(ApertusProvider::new(config));
        let response = assert_ok!(provider.chat_completion(&KeyFactory::create(), chat("gpt-4")).await);
        assert_eq!(response.extra_fields.provider, "swiss-apertus");
    }

    #[tokio::test]
    async fn test_upstream_error_carries_identity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {
                    "message": "Incorrect API key provided",
                    "type": "invalid_request_error",
                    "code": "invalid_api_key"
                }
            })))
            .mount(&server)
            .await;

        let provider = assert_ok!(ApertusProvider::new(ProviderFactory::custom(
            &server.uri(),
            "swiss-apertus"
        )));
        let err = assert_err!(provider.chat_completion(&KeyFactory::create(), chat("gpt-4")).await);
        assert!(matches!(err, ProviderError::Authentication { .. }));
        assert_eq!(err.provider(), "swiss-apertus");
        assert_eq!(err.http_status(), 401);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let provider = assert_ok!(ApertusProvider::new(ProviderFactory::with_base_url(UNREACHABLE)));
        let err = assert_err!(provider.chat_completion(&KeyFactory::create(), chat("gpt-4")).await);
        assert_eq!(err.provider(), "apertus");
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_body("gpt-4", "ok")))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = ProviderFactory::with_base_url(&server.uri());
        config.network_config.max_retries = 2;
        config.network_config.retry_backoff_initial_ms = 1;
        config.network_config.retry_backoff_max_ms = 5;

        let provider = assert_ok!(ApertusProvider::new(config));
        let response = assert_ok!(provider.chat_completion(&KeyFactory::create(), chat("gpt-4")).await);
        assert_eq!(response.body["choices"][0]["message"]["content"], "ok");
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "message": "bad messages", "type": "invalid_request_error" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = ProviderFactory::with_base_url(&server.uri());
        config.network_config.max_retries = 3;
        config.network_config.retry_backoff_initial_ms = 1;

        let provider = assert_ok!(ApertusProvider::new(config));
        let err = assert_err!(provider.chat_completion(&KeyFactory::create(), chat("gpt-4")).await);
        assert!(matches!(err, ProviderError::InvalidRequest { .. }));
    }

    #[tokio::test]
    async fn test_raw_response_echo() {
        let server = MockServer::start().await;
        let body = chat_completion_body("gpt-4", "raw");
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .mount(&server)
            .await;

        let mut config = ProviderFactory::with_base_url(&server.uri());
        config.send_back_raw_response = true;

        let provider = assert_ok!(ApertusProvider::new(config));
        let response = assert_ok!(provider.chat_completion(&KeyFactory::create(), chat("gpt-4")).await);
        assert_eq!(response.extra_fields.raw_response, Some(body));
    }

    #[tokio::test]
    async fn test_policy_rejection_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = assert_ok!(ApertusProvider::new(ProviderFactory::denying(
            &server.uri(),
            "swiss-apertus",
            RequestType::ChatCompletion,
        )));
        let err = assert_err!(provider.chat_completion(&KeyFactory::create(), chat("gpt-4")).await);
        assert!(matches!(
            err,
            ProviderError::OperationNotAllowed { ref request_type, .. } if request_type == "chat_completion"
        ));
        assert_eq!(err.provider(), "swiss-apertus");
        assert_eq!(err.http_status(), 403);
    }

    #[tokio::test]
    async fn test_model_listing_makes_no_network_call() {
        let provider = assert_ok!(ApertusProvider::new(ProviderFactory::with_base_url(UNREACHABLE)));
        let keys = vec![
            KeyFactory::named("a", "apertus").with_models(["apertus-8b", "apertus-70b"]),
            KeyFactory::named("b", "apertus")
                .with_models(["apertus-70b"])
                .with_apertus_config(ApertusKeyConfig::with_mappings([("apertus-70b", "swiss-70b")])),
        ];

        let listing = assert_ok!(provider.list_models(&keys));
        let ids: Vec<&str> = listing.data.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["apertus/apertus-8b", "apertus/apertus-70b"]);
        assert!(listing.data.iter().all(|m| m.owned_by == "system"));
        assert_eq!(listing.extra_fields.latency, 0);
        assert_eq!(listing.extra_fields.provider, "apertus");
    }
}
