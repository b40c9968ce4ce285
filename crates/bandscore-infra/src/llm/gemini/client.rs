//! GeminiProvider -- concrete [`LlmProvider`] implementation for Google Gemini.
//!
//! Sends one non-streaming `generateContent` request per completion. The API
//! key travels in the `x-goog-api-key` header rather than the query string,
//! so it never shows up in URLs or request logs.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use bandscore_core::llm::box_provider::BoxLlmProvider;
use bandscore_core::llm::provider::{LlmProvider, ProviderFactory};
use bandscore_types::config::ModelConfig;
use bandscore_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, MessageRole, StopReason, Usage,
};

use super::types::{
    GeminiContent, GeminiErrorEnvelope, GeminiPart, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig,
};

/// Google Gemini LLM provider.
///
/// The API key is stored as a [`SecretString`] and only exposed when setting
/// the request header. The type does not implement `Debug`.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com";

    pub fn new(api_key: SecretString, model: String, timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            model,
        })
    }

    /// Override the base URL (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }

    fn to_gemini_request(request: &CompletionRequest) -> GenerateContentRequest {
        let contents = request
            .messages
            .iter()
            .map(|m| GeminiContent {
                role: Some(match m.role {
                    MessageRole::User => "user".to_string(),
                }),
                parts: vec![GeminiPart {
                    text: Some(m.content.clone()),
                }],
            })
            .collect();

        GenerateContentRequest {
            contents,
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        }
    }
}

/// Map a non-success HTTP status and body to an [`LlmError`].
fn map_error(status: reqwest::StatusCode, retry_after: Option<u64>, body: &str) -> LlmError {
    let message = serde_json::from_str::<GeminiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());
    let mentions_key = message.to_lowercase().contains("api key");

    match status.as_u16() {
        401 | 403 => LlmError::AuthenticationFailed,
        400 if mentions_key => LlmError::AuthenticationFailed,
        400 => LlmError::InvalidRequest(message),
        429 => LlmError::RateLimited {
            retry_after_ms: retry_after.map(|secs| secs.saturating_mul(1000)),
        },
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {message}"),
        },
    }
}

fn map_finish_reason(reason: Option<&str>) -> StopReason {
    match reason {
        Some("STOP") | None => StopReason::EndTurn,
        Some("MAX_TOKENS") => StopReason::MaxTokens,
        Some("SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII") => {
            StopReason::ContentFilter
        }
        Some(_) => StopReason::Other,
    }
}

impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let model = if request.model.is_empty() {
            self.model.as_str()
        } else {
            request.model.as_str()
        };
        let body = Self::to_gemini_request(request);

        let response = self
            .client
            .post(self.url(model))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {}", e.without_url()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, model, "Gemini request failed");
            return Err(map_error(status, retry_after, &error_body));
        }

        let gemini_resp: GenerateContentResponse = response.json().await.map_err(|e| {
            LlmError::Deserialization(format!("failed to parse response: {e}"))
        })?;

        let candidate = gemini_resp
            .candidates
            .into_iter()
            .next()
            .ok_or(LlmError::EmptyResponse)?;

        let content = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        if content.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        let usage = gemini_resp.usage_metadata.unwrap_or_default();
        Ok(CompletionResponse {
            content,
            model: gemini_resp
                .model_version
                .unwrap_or_else(|| model.to_string()),
            stop_reason: map_finish_reason(candidate.finish_reason.as_deref()),
            usage: Usage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
            },
        })
    }
}

/// Builds a [`GeminiProvider`] per evaluation from the configured model settings.
pub struct GeminiProviderFactory {
    base_url: String,
    model: String,
    timeout: Duration,
}

impl GeminiProviderFactory {
    pub fn from_config(config: &ModelConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            model: config.name.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl ProviderFactory for GeminiProviderFactory {
    fn create(&self, api_key: &str) -> Result<BoxLlmProvider, LlmError> {
        let key = api_key.trim();
        if key.is_empty() {
            return Err(LlmError::AuthenticationFailed);
        }
        let provider = GeminiProvider::new(
            SecretString::from(key.to_string()),
            self.model.clone(),
            self.timeout,
        )?
        .with_base_url(self.base_url.clone());
        Ok(BoxLlmProvider::new(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandscore_types::llm::Message;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

    fn provider(server: &MockServer) -> GeminiProvider {
        GeminiProvider::new(
            SecretString::from("test-key-not-real"),
            "gemini-1.5-flash".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
        .with_base_url(server.uri())
    }

    fn request(prompt: &str) -> CompletionRequest {
        CompletionRequest {
            model: "gemini-1.5-flash".to_string(),
            messages: vec![Message::user(prompt)],
            max_tokens: 4000,
            temperature: Some(0.0),
        }
    }

    #[tokio::test]
    async fn test_request_shape_and_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(header("x-goog-api-key", "test-key-not-real"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "Grade this"}]}],
                "generationConfig": {"temperature": 0.0, "maxOutputTokens": 4000}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Band "}, {"text": "6.5"}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 30},
                "modelVersion": "gemini-1.5-flash-002"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = provider(&server).complete(&request("Grade this")).await.unwrap();
        assert_eq!(response.content, "Band 6.5");
        assert_eq!(response.model, "gemini-1.5-flash-002");
        assert_eq!(response.stop_reason, StopReason::EndTurn);
        assert_eq!(response.usage.input_tokens, 120);
        assert_eq!(response.usage.output_tokens, 30);
    }

    #[tokio::test]
    async fn test_empty_model_uses_default() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "ok"}]}, "finishReason": "MAX_TOKENS"}]
            })))
            .mount(&server)
            .await;

        let mut req = request("x");
        req.model = String::new();
        let response = provider(&server).complete(&req).await.unwrap();
        assert_eq!(response.model, "gemini-1.5-flash");
        assert_eq!(response.stop_reason, StopReason::MaxTokens);
    }

    #[tokio::test]
    async fn test_invalid_key_is_authentication_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT"
                }
            })))
            .mount(&server)
            .await;

        let err = provider(&server).complete(&request("x")).await.unwrap_err();
        assert!(matches!(err, LlmError::AuthenticationFailed));
    }

    #[tokio::test]
    async fn test_other_bad_request_is_invalid_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": 400, "message": "maxOutputTokens too large"}
            })))
            .mount(&server)
            .await;

        let err = provider(&server).complete(&request("x")).await.unwrap_err();
        match err {
            LlmError::InvalidRequest(message) => assert!(message.contains("maxOutputTokens")),
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rate_limited_reads_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "3"))
            .mount(&server)
            .await;

        let err = provider(&server).complete(&request("x")).await.unwrap_err();
        assert!(matches!(
            err,
            LlmError::RateLimited {
                retry_after_ms: Some(3000)
            }
        ));
    }

    #[tokio::test]
    async fn test_huge_retry_after_saturates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(429).insert_header("retry-after", u64::MAX.to_string()),
            )
            .mount(&server)
            .await;

        let err = provider(&server).complete(&request("x")).await.unwrap_err();
        assert!(matches!(
            err,
            LlmError::RateLimited {
                retry_after_ms: Some(u64::MAX)
            }
        ));
    }

    #[tokio::test]
    async fn test_server_error_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = provider(&server).complete(&request("x")).await.unwrap_err();
        match err {
            LlmError::Provider { message } => {
                assert!(message.contains("503"));
                assert!(!message.contains("test-key-not-real"));
            }
            other => panic!("expected Provider, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_candidates_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [],
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let err = provider(&server).complete(&request("x")).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_factory_builds_provider_for_configured_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(header("x-goog-api-key", "factory-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "via factory"}]}}]
            })))
            .mount(&server)
            .await;

        let config = ModelConfig {
            base_url: server.uri(),
            ..ModelConfig::default()
        };
        let provider = GeminiProviderFactory::from_config(&config)
            .create("factory-key")
            .unwrap();
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.default_model(), "gemini-1.5-flash");

        let response = provider.complete(&request("x")).await.unwrap();
        assert_eq!(response.content, "via factory");
    }

    #[test]
    fn test_factory_rejects_blank_key() {
        let factory = GeminiProviderFactory::from_config(&ModelConfig::default());
        assert!(matches!(
            factory.create("  "),
            Err(LlmError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_finish_reason_mapping() {
        assert_eq!(map_finish_reason(Some("SAFETY")), StopReason::ContentFilter);
        assert_eq!(map_finish_reason(Some("OTHER")), StopReason::Other);
        assert_eq!(map_finish_reason(None), StopReason::EndTurn);
    }
}
