use std::time::Duration;

use actionlog_core::constants::DEFAULT_MODEL;
use actionlog_core::env_parse_with_default;
use async_trait::async_trait;

use crate::ai_types::{ChatRequest, ChatResponse, Message, ResponseFormat};
use crate::completion::CompletionService;
use crate::error::LlmError;

/// Maximum output length for truncation.
pub const MAX_OUTPUT_LEN: usize = 2000;

const RETRY_DELAYS: [u64; 4] = [0, 1, 2, 4];

/// Client for an OpenAI-compatible chat-completions endpoint.
pub struct LlmClient {
    pub(crate) client: reqwest::Client,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) model: String,
    pub(crate) max_retries: usize,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("client", &self.client)
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl LlmClient {
    /// Creates a new client with the given API key and base URL.
    ///
    /// `ACTIONLOG_LLM_TIMEOUT_SECS` sets a request timeout (unset or 0: none) and
    /// `ACTIONLOG_LLM_MAX_RETRIES` enables retries of transient failures (default 0).
    ///
    /// # Errors
    /// Returns an error if the key is blank or the HTTP client cannot be built.
    pub fn new(api_key: String, base_url: String) -> Result<Self, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::ClientInit("API key is required".to_owned()));
        }
        let base_url = base_url.trim_end_matches('/').to_owned();
        let timeout_secs: u64 = env_parse_with_default("ACTIONLOG_LLM_TIMEOUT_SECS", 0);
        let mut builder = reqwest::Client::builder();
        if timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }
        let client = builder.build().map_err(|e| LlmError::ClientInit(e.to_string()))?;
        let max_retries: usize = env_parse_with_default("ACTIONLOG_LLM_MAX_RETRIES", 0);
        Ok(Self { client, api_key, base_url, model: DEFAULT_MODEL.to_owned(), max_retries })
    }

    /// Sets a custom model for this client.
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Sets how many times transient failures are retried.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the model name.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_for(&self, prompt: &str, json_only: bool) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![Message { role: "user".to_owned(), content: prompt.to_owned() }],
            response_format: json_only
                .then(|| ResponseFormat { format_type: "json_object".to_owned() }),
        }
    }

    /// Send a chat completion request and return the extracted content string.
    ///
    /// # Errors
    /// Returns an error if the HTTP request fails, the API returns a
    /// non-success status, the response body cannot be parsed, or the choices
    /// array is empty.
    pub(crate) async fn chat_completion(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay_secs = RETRY_DELAYS.get(attempt).copied().unwrap_or(4);
                let delay = Duration::from_secs(delay_secs);
                tokio::time::sleep(delay).await;
                tracing::warn!("LLM retry attempt {attempt}/{} after {delay:?}", self.max_retries);
            }

            let response_result = self
                .client
                .post(format!("{}/chat/completions", self.base_url))
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(request)
                .send()
                .await;

            let response = match response_result {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::HttpRequest(e));
                    continue;
                },
            };

            let status = response.status();
            if status.is_success() {
                let body = match response.text().await {
                    Ok(b) => b,
                    Err(e) => {
                        last_error = Some(LlmError::HttpRequest(e));
                        continue;
                    },
                };

                let chat_response: ChatResponse =
                    serde_json::from_str(&body).map_err(|e| LlmError::JsonParse {
                        context: format!(
                            "chat completion response (body: {})",
                            truncate(&body, 200)
                        ),
                        source: e,
                    })?;

                let first_choice = chat_response.choices.first().ok_or(LlmError::EmptyResponse)?;
                let content = first_choice.message.content.clone().unwrap_or_default();
                tracing::debug!(chars = content.len(), "completion received");
                return Ok(content);
            }

            let status_code = status.as_u16();
            let body =
                response.text().await.unwrap_or_else(|_| "Could not read error body".to_owned());

            let err = LlmError::HttpStatus { code: status_code, body };
            if err.is_transient() {
                last_error = Some(err);
                continue;
            }
            return Err(err);
        }

        let last = last_error.unwrap_or(LlmError::EmptyResponse);
        if self.max_retries == 0 {
            return Err(last);
        }
        Err(LlmError::RetriesExhausted(Box::new(last)))
    }
}

#[async_trait]
impl CompletionService for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        tracing::debug!(model = %self.model, prompt = truncate(prompt, MAX_OUTPUT_LEN), "sending completion");
        self.chat_completion(&self.request_for(prompt, false)).await
    }

    async fn complete_json(&self, prompt: &str) -> Result<String, LlmError> {
        self.chat_completion(&self.request_for(prompt, true)).await
    }
}

/// Truncates a string to the given maximum length at a char boundary.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end = end.saturating_sub(1);
        }
        s.get(..end).unwrap_or("")
    }
}
