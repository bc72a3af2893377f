use super::models::{Model, Usage};
use super::prompts;
use matchday_adapters::config::{Config, PromptVariant};
use matchday_core::protocol::{Analyzer, BoxFuture, UpstreamError};
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Maximum length for error content in error messages
const MAX_ERROR_CONTENT_LEN: usize = 200;

/// Sanitize API response content for error messages to prevent credential leakage.
fn sanitize_api_response(content: &str) -> String {
    const SECRET_PATTERNS: &[&str] = &[
        "api_key",
        "apikey",
        "secret",
        "password",
        "credential",
        "bearer",
        "sk-", // OpenAI key prefix
    ];

    let truncated = truncate_str(content, MAX_ERROR_CONTENT_LEN);

    let lower = truncated.to_lowercase();
    for pattern in SECRET_PATTERNS {
        if lower.contains(pattern) {
            return "(response details redacted - may contain sensitive data)".to_string();
        }
    }

    truncated.to_string()
}

/// Response from LLM including content and usage stats
#[derive(Debug)]
pub struct LlmResponse {
    pub content: String,
    pub usage: Option<Usage>,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

/// Response format configuration.
/// Supports both simple JSON mode and structured output with schema
#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    json_schema: Option<JsonSchemaWrapper>,
}

/// Wrapper for JSON Schema in structured output mode
#[derive(Serialize)]
struct JsonSchemaWrapper {
    name: String,
    strict: bool,
    schema: serde_json::Value,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    /// Content can be null in some API responses (e.g., when refusal or error occurs)
    #[serde(default)]
    content: Option<String>,
    /// Refusal reason - set when content is blocked by content moderation
    #[serde(default)]
    refusal: Option<String>,
}

/// Provider error body: `{"error": {"message", "type", "code"}}`.
#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

impl ApiError {
    /// Structured code, falling back to the error type when no code is set.
    fn code(&self) -> Option<String> {
        match &self.code {
            Some(serde_json::Value::String(code)) if !code.is_empty() => Some(code.clone()),
            Some(serde_json::Value::Number(code)) => Some(code.to_string()),
            _ => self.kind.clone().filter(|kind| !kind.is_empty()),
        }
    }
}

const QUOTA_CODE: &str = "insufficient_quota";
const INVALID_KEY_CODE: &str = "invalid_api_key";

/// Retry configuration
pub(crate) const MAX_RETRIES: u32 = 2;
pub(crate) const INITIAL_BACKOFF_MS: u64 = 1000;
pub(crate) const BACKOFF_MULTIPLIER: u64 = 2; // Exponential backoff
pub(crate) const REQUEST_TIMEOUT_SECS: u64 = 60;
const MAX_RETRY_AFTER_SECS: u64 = 20;

pub(crate) fn backoff_secs(retry_count: u32) -> u64 {
    let factor = BACKOFF_MULTIPLIER.pow(retry_count.saturating_sub(1));
    let ms = INITIAL_BACKOFF_MS.saturating_mul(factor);
    let secs = ms / 1000;
    if secs == 0 {
        1
    } else {
        secs
    }
}

pub(crate) fn is_retryable_network_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

fn parse_retry_after(value: Option<&reqwest::header::HeaderValue>) -> Option<u64> {
    value
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(|secs| secs.min(MAX_RETRY_AFTER_SECS))
}

fn map_send_error(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::new("The AI provider timed out. Please try again.")
    } else if err.is_connect() {
        UpstreamError::new(
            "Could not connect to the AI provider. Check the network and OPENAI_BASE_URL.",
        )
    } else {
        UpstreamError::new(err.to_string())
    }
}

/// Turn a non-success provider response into the error the client will show.
fn upstream_error(status: StatusCode, text: &str, retry_count: u32) -> UpstreamError {
    let parsed = serde_json::from_str::<ApiErrorBody>(text)
        .ok()
        .map(|body| body.error);
    let code = parsed.as_ref().and_then(ApiError::code);

    let message = match status.as_u16() {
        401 => "Incorrect API key provided. Check OPENAI_API_KEY where the function runs."
            .to_string(),
        429 => match &parsed {
            Some(err) => sanitize_api_response(&err.message),
            None => format!(
                "Rate limited by the AI provider (429) after {} retries.",
                retry_count
            ),
        },
        500..=599 => format!(
            "AI provider server error ({}). The service may be temporarily unavailable.",
            status
        ),
        _ => match &parsed {
            Some(err) => format!(
                "AI provider error {}: {}",
                status.as_u16(),
                sanitize_api_response(&err.message)
            ),
            None => format!("API error {}: {}", status, sanitize_api_response(text)),
        },
    };

    let code = match (status.as_u16(), code) {
        (_, Some(code)) => Some(code),
        (401, None) => Some(INVALID_KEY_CODE.to_string()),
        (_, None) => None,
    };
    match code {
        Some(code) => UpstreamError::new(message).with_code(code),
        None => UpstreamError::new(message),
    }
}

fn is_quota_error(text: &str) -> bool {
    serde_json::from_str::<ApiErrorBody>(text)
        .ok()
        .and_then(|body| body.error.code())
        .is_some_and(|code| code == QUOTA_CODE)
}

/// Send a chat completion with automatic retry on transient failures.
///
/// Handles:
/// - Network errors (timeout, connection failures)
/// - Rate limits (429), except exhausted quota which no wait will fix
/// - Server errors (5xx)
///
/// Returns the response text on success.
pub(crate) async fn send_with_retry<T: Serialize>(
    client: &reqwest::Client,
    url: &str,
    api_key: &str,
    request_body: &T,
) -> Result<String, UpstreamError> {
    let mut retry_count = 0;

    loop {
        let response = match client
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(request_body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                if is_retryable_network_error(&err) && retry_count < MAX_RETRIES {
                    retry_count += 1;
                    debug!(retry_count, error = %err, "retrying chat completion");
                    tokio::time::sleep(Duration::from_secs(backoff_secs(retry_count))).await;
                    continue;
                }
                return Err(map_send_error(err));
            }
        };

        let status = response.status();
        let retry_after = parse_retry_after(response.headers().get(RETRY_AFTER));
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => {
                if is_retryable_network_error(&err) && retry_count < MAX_RETRIES {
                    retry_count += 1;
                    tokio::time::sleep(Duration::from_secs(backoff_secs(retry_count))).await;
                    continue;
                }
                return Err(map_send_error(err));
            }
        };

        if status.is_success() {
            return Ok(text);
        }

        let retryable = (status == StatusCode::TOO_MANY_REQUESTS && !is_quota_error(&text))
            || status.is_server_error();
        if retryable && retry_count < MAX_RETRIES {
            retry_count += 1;
            let wait = retry_after.unwrap_or_else(|| backoff_secs(retry_count));
            warn!(%status, retry_count, wait, "AI provider busy, retrying");
            tokio::time::sleep(Duration::from_secs(wait)).await;
            continue;
        }

        return Err(upstream_error(status, &text, retry_count));
    }
}

/// Pull the reply text out of a chat completion body.
fn extract_reply(text: &str) -> Result<LlmResponse, UpstreamError> {
    // Some OpenAI-compatible gateways report upstream errors with a 200 status.
    if let Ok(err_resp) = serde_json::from_str::<ApiErrorBody>(text) {
        let message = format!(
            "AI provider error: {}",
            sanitize_api_response(&err_resp.error.message)
        );
        return Err(match err_resp.error.code() {
            Some(code) => UpstreamError::new(message).with_code(code),
            None => UpstreamError::new(message),
        });
    }

    let parsed: ChatResponse = serde_json::from_str(text).map_err(|e| {
        UpstreamError::new(format!(
            "Unexpected response from the AI provider ({}): {}",
            e,
            sanitize_api_response(text)
        ))
    })?;

    let message = parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| UpstreamError::new("The AI provider returned no choices."))?;

    if let Some(refusal) = message.refusal.filter(|r| !r.trim().is_empty()) {
        if message.content.as_deref().is_none_or(|c| c.trim().is_empty()) {
            return Err(UpstreamError::new(format!(
                "The model declined to answer: {}",
                truncate_str(&refusal, MAX_ERROR_CONTENT_LEN)
            )));
        }
    }

    Ok(LlmResponse {
        content: message.content.unwrap_or_default(),
        usage: parsed.usage,
    })
}

/// Create a configured HTTP client for provider requests
pub(crate) fn create_http_client(timeout_secs: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))
}

/// Truncate a string for display (Unicode-safe)
pub(crate) fn truncate_str(s: &str, max_chars: usize) -> &str {
    if s.chars().count() <= max_chars {
        s
    } else {
        let byte_idx = s
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        &s[..byte_idx]
    }
}

/// OpenAI-compatible chat completions client used by the analyze function.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    completions_url: String,
    model: Model,
    variant: PromptVariant,
    system_prompt: String,
}

impl OpenAiClient {
    pub fn new(
        api_base: &str,
        model: Model,
        variant: PromptVariant,
        language: &str,
    ) -> anyhow::Result<Self> {
        let variant = if variant == PromptVariant::Schema && !model.supports_structured_outputs()
        {
            warn!(
                model = model.id(),
                "structured outputs aren't supported for this model, using JSON mode"
            );
            PromptVariant::Json
        } else {
            variant
        };

        Ok(Self {
            http: create_http_client(REQUEST_TIMEOUT_SECS)?,
            completions_url: format!("{}/chat/completions", api_base.trim_end_matches('/')),
            system_prompt: prompts::analyze_system(variant, language),
            model,
            variant,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            &config.api_base,
            Model::new(config.model.clone(), config.max_tokens),
            config.prompt_variant,
            &config.language,
        )
    }

    /// The variant actually in use after model capability checks.
    pub fn variant(&self) -> PromptVariant {
        self.variant
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    fn build_request(&self, input_text: &str) -> ChatRequest {
        let response_format = match self.variant {
            PromptVariant::Json => ResponseFormat {
                format_type: "json_object".to_string(),
                json_schema: None,
            },
            PromptVariant::Schema => ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: Some(JsonSchemaWrapper {
                    name: prompts::SCHEMA_NAME.to_string(),
                    strict: true,
                    schema: prompts::analysis_schema(),
                }),
            },
        };

        ChatRequest {
            model: self.model.id().to_string(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: self.system_prompt.clone(),
                },
                Message {
                    role: "user".to_string(),
                    content: input_text.to_string(),
                },
            ],
            max_tokens: self.model.max_tokens(),
            stream: false,
            response_format: Some(response_format),
        }
    }
}

impl Analyzer for OpenAiClient {
    fn analyze<'a>(
        &'a self,
        api_key: &'a str,
        input_text: &'a str,
    ) -> BoxFuture<'a, Result<String, UpstreamError>> {
        Box::pin(async move {
            let request = self.build_request(input_text);
            let text =
                send_with_retry(&self.http, &self.completions_url, api_key, &request).await?;
            let reply = extract_reply(&text)?;
            if let Some(usage) = &reply.usage {
                debug!(
                    model = self.model.id(),
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    total_tokens = usage.total_tokens,
                    "chat completion finished"
                );
            }
            Ok(reply.content)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
    use axum::http::HeaderMap;
    use axum::routing::post;
    use axum::Router;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const COMPLETION: &str = r#"{
        "choices": [{"message": {"role": "assistant", "content": "{\"temperature\":\"Alta\"}"}}],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    }"#;

    fn client(variant: PromptVariant, model: &str, base: &str) -> OpenAiClient {
        OpenAiClient::new(base, Model::new(model, 900), variant, "English").unwrap()
    }

    /// Serve `/chat/completions`, answering `statuses[n]` to the n-th call
    /// (the last entry repeats). Requests without the test key get a 401.
    async fn spawn_stub(statuses: &'static [u16], body: &'static str) -> (String, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let app = Router::new().route(
            "/chat/completions",
            post(move |headers: HeaderMap| {
                let counter = counter.clone();
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst);
                    let authorized = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
                        == Some("Bearer test-key");
                    let code = if authorized {
                        statuses[n.min(statuses.len() - 1)]
                    } else {
                        401
                    };
                    (
                        StatusCode::from_u16(code).unwrap(),
                        [(CONTENT_TYPE, "application/json")],
                        body,
                    )
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), calls)
    }

    #[test]
    fn test_sanitize_api_response_redacts_secrets() {
        assert_eq!(
            sanitize_api_response("bad key sk-abc123"),
            "(response details redacted - may contain sensitive data)"
        );
        assert_eq!(sanitize_api_response("plain failure"), "plain failure");
        assert_eq!(
            sanitize_api_response(&"x".repeat(500)).len(),
            MAX_ERROR_CONTENT_LEN
        );
    }

    #[test]
    fn test_truncate_str_is_char_safe() {
        assert_eq!(truncate_str("ação", 2), "aç");
        assert_eq!(truncate_str("abc", 10), "abc");
    }

    #[test]
    fn test_backoff_secs_grows() {
        assert_eq!(backoff_secs(1), 1);
        assert_eq!(backoff_secs(2), 2);
        assert_eq!(backoff_secs(3), 4);
    }

    #[test]
    fn test_json_variant_request_shape() {
        let client = client(PromptVariant::Json, "gpt-4o-mini", "https://api.example/v1/");
        assert_eq!(
            client.completions_url,
            "https://api.example/v1/chat/completions"
        );
        let request = serde_json::to_value(client.build_request("Benfica v Porto")).unwrap();
        assert_eq!(request["model"], "gpt-4o-mini");
        assert_eq!(request["max_tokens"], 900);
        assert_eq!(request["response_format"]["type"], "json_object");
        assert!(request["response_format"].get("json_schema").is_none());
        assert_eq!(request["messages"][0]["role"], "system");
        assert_eq!(request["messages"][1]["content"], "Benfica v Porto");
    }

    #[test]
    fn test_schema_variant_request_shape() {
        let client = client(PromptVariant::Schema, "gpt-4o-mini", "https://api.example/v1");
        let request = serde_json::to_value(client.build_request("x")).unwrap();
        assert_eq!(request["response_format"]["type"], "json_schema");
        assert_eq!(
            request["response_format"]["json_schema"]["name"],
            prompts::SCHEMA_NAME
        );
        assert_eq!(request["response_format"]["json_schema"]["strict"], true);
    }

    #[test]
    fn test_schema_falls_back_for_unsupported_model() {
        let client = client(PromptVariant::Schema, "gpt-3.5-turbo", "https://api.example/v1");
        assert_eq!(client.variant(), PromptVariant::Json);
    }

    #[test]
    fn test_extract_reply_content_and_usage() {
        let reply = extract_reply(COMPLETION).unwrap();
        assert_eq!(reply.content, r#"{"temperature":"Alta"}"#);
        assert_eq!(reply.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_extract_reply_null_content_is_empty() {
        let reply = extract_reply(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert_eq!(reply.content, "");
    }

    #[test]
    fn test_extract_reply_refusal() {
        let err = extract_reply(
            r#"{"choices":[{"message":{"content":null,"refusal":"I can't help with that."}}]}"#,
        )
        .unwrap_err();
        assert!(err.message.contains("declined"));
    }

    #[test]
    fn test_extract_reply_error_with_ok_status() {
        let err = extract_reply(
            r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota","code":"insufficient_quota"}}"#,
        )
        .unwrap_err();
        assert!(err.message.contains("exceeded your current quota"));
        assert_eq!(err.code.as_deref(), Some("insufficient_quota"));
    }

    #[test]
    fn test_extract_reply_garbage() {
        assert!(extract_reply("<html>bad gateway</html>").is_err());
        assert!(extract_reply(r#"{"choices":[]}"#).is_err());
    }

    #[test]
    fn test_upstream_error_codes() {
        let err = upstream_error(StatusCode::UNAUTHORIZED, "", 0);
        assert_eq!(err.code.as_deref(), Some("invalid_api_key"));
        assert!(err.message.contains("Incorrect API key"));

        let err = upstream_error(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"message":"You exceeded your current quota, please check your plan.","type":"insufficient_quota","code":"insufficient_quota"}}"#,
            0,
        );
        assert_eq!(err.code.as_deref(), Some("insufficient_quota"));
        assert!(err.message.contains("exceeded your current quota"));

        let err = upstream_error(StatusCode::BAD_REQUEST, "nope", 0);
        assert_eq!(err.code, None);
        assert!(err.message.contains("400"));
    }

    #[test]
    fn test_quota_errors_are_not_retried() {
        assert!(is_quota_error(
            r#"{"error":{"message":"q","type":"insufficient_quota","code":"insufficient_quota"}}"#
        ));
        assert!(!is_quota_error(
            r#"{"error":{"message":"slow down","type":"requests","code":"rate_limit_exceeded"}}"#
        ));
    }

    #[tokio::test]
    async fn test_analyze_against_stub() {
        let (base, calls) = spawn_stub(&[200], COMPLETION).await;
        let client = client(PromptVariant::Json, "gpt-4o-mini", &base);
        let content = client.analyze("test-key", "Benfica v Porto").await.unwrap();
        assert_eq!(content, r#"{"temperature":"Alta"}"#);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_analyze_wrong_key_is_not_retried() {
        let (base, calls) = spawn_stub(&[200], COMPLETION).await;
        let client = client(PromptVariant::Json, "gpt-4o-mini", &base);
        let err = client.analyze("wrong", "x").await.unwrap_err();
        assert_eq!(err.code.as_deref(), Some("invalid_api_key"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_analyze_retries_server_errors() {
        let (base, calls) = spawn_stub(&[503, 200], COMPLETION).await;
        let client = client(PromptVariant::Json, "gpt-4o-mini", &base);
        let content = client.analyze("test-key", "x").await.unwrap();
        assert!(content.contains("Alta"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
