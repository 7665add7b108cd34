#[cfg(test)]
mod tests {
    use crate::client::LlmClient;
    use crate::completion::CompletionService;
    use crate::error::LlmError;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reply(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{
                "message": {
                    "content": content,
                    "role": "assistant"
                }
            }]
        }))
    }

    fn client_for(server: &MockServer) -> LlmClient {
        LlmClient::new("test-key".to_owned(), format!("{}/", server.uri()))
            .unwrap()
            .with_model("test-model".to_owned())
            .with_max_retries(0)
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "messages": [{"role": "user", "content": "hello"}]
            })))
            .respond_with(reply("test response"))
            .expect(1)
            .mount(&server)
            .await;

        let result = client.complete("hello").await.unwrap();
        assert_eq!(result, "test response");
    }

    #[tokio::test]
    async fn test_complete_json_requests_json_mode() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "response_format": {"type": "json_object"}
            })))
            .respond_with(reply("{\"topic\":\"T\"}"))
            .expect(1)
            .mount(&server)
            .await;

        let result = client.complete_json("fix it").await.unwrap();
        assert_eq!(result, "{\"topic\":\"T\"}");
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, LlmError::HttpStatus { code: 503, .. }));
    }

    #[tokio::test]
    async fn test_opt_in_retry_on_503_then_success() {
        let server = MockServer::start().await;
        let client = client_for(&server).with_max_retries(1);

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(reply("success after 503"))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        let result = client.complete("hello").await.unwrap();
        assert_eq!(result, "success after 503");
    }

    #[tokio::test]
    async fn test_no_retry_on_401() {
        let server = MockServer::start().await;
        let client = client_for(&server).with_max_retries(2);

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client.complete("hello").await.unwrap_err();
        assert!(err.is_unauthorized());
        let err_msg = err.to_string();
        assert!(err_msg.contains("401"));
        assert!(err_msg.contains("Unauthorized"));
    }

    #[tokio::test]
    async fn test_empty_choices_is_error() {
        let server = MockServer::start().await;
        let client = client_for(&server);

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&server)
            .await;

        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_retries_exhausted_wraps_last_error() {
        let server = MockServer::start().await;
        let client = client_for(&server).with_max_retries(1);

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit exceeded"))
            .expect(2)
            .mount(&server)
            .await;

        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, LlmError::RetriesExhausted(_)));
        assert!(err.to_string().contains("429"));
    }

    #[test]
    fn test_blank_key_rejected() {
        let err = LlmClient::new("  ".to_owned(), "http://localhost".to_owned()).unwrap_err();
        assert!(matches!(err, LlmError::ClientInit(_)));
    }
}
