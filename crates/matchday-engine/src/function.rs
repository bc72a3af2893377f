//! The analyze function: validates a client request, calls the model, and
//! wraps the outcome in the `{content}` / `{error}` reply shape.

use axum::http::{Method, StatusCode};
use matchday_adapters::config::{Config, API_KEY_ENV};
use matchday_core::protocol::{AnalyzeRequest, Analyzer, FunctionReply, UpstreamError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum FunctionError {
    #[error("Method not allowed. Use POST.")]
    MethodNotAllowed,
    #[error("Invalid request body: {0}")]
    MalformedBody(String),
    #[error("inputText is required")]
    MissingInput,
    #[error("Missing {} in the function environment.", API_KEY_ENV)]
    MissingApiKey,
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl FunctionError {
    pub fn status(&self) -> StatusCode {
        match self {
            FunctionError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            FunctionError::MalformedBody(_) | FunctionError::MissingInput => {
                StatusCode::BAD_REQUEST
            }
            FunctionError::MissingApiKey | FunctionError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn into_reply(self) -> FunctionReply {
        match self {
            FunctionError::Upstream(err) => FunctionReply::Error {
                error: err.message,
                code: err.code,
            },
            other => FunctionReply::error(other.to_string()),
        }
    }
}

/// Status plus body, independent of the HTTP framework serving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionResponse {
    pub status: StatusCode,
    pub reply: FunctionReply,
}

type KeySource = Arc<dyn Fn() -> Option<String> + Send + Sync>;

pub struct AnalyzeFunction<A> {
    analyzer: A,
    api_key: KeySource,
}

impl<A: Analyzer> AnalyzeFunction<A> {
    /// Reads the API key from the process environment on every request.
    pub fn new(analyzer: A) -> Self {
        Self::with_key_source(analyzer, Config::api_key)
    }

    pub fn with_key_source(
        analyzer: A,
        api_key: impl Fn() -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            analyzer,
            api_key: Arc::new(api_key),
        }
    }

    pub async fn handle(&self, method: &Method, body: &[u8]) -> FunctionResponse {
        match self.run(method, body).await {
            Ok(content) => {
                info!(bytes = content.len(), "analysis returned");
                FunctionResponse {
                    status: StatusCode::OK,
                    reply: FunctionReply::content(content),
                }
            }
            Err(err) => {
                let status = err.status();
                warn!(%status, error = %err, "analysis failed");
                FunctionResponse {
                    status,
                    reply: err.into_reply(),
                }
            }
        }
    }

    async fn run(&self, method: &Method, body: &[u8]) -> Result<String, FunctionError> {
        if *method != Method::POST {
            return Err(FunctionError::MethodNotAllowed);
        }

        let request: AnalyzeRequest = serde_json::from_slice(body)
            .map_err(|e| FunctionError::MalformedBody(e.to_string()))?;
        let input_text = request.input_text.trim();
        if input_text.is_empty() {
            return Err(FunctionError::MissingInput);
        }

        let api_key = (self.api_key)().ok_or(FunctionError::MissingApiKey)?;
        Ok(self.analyzer.analyze(&api_key, input_text).await?)
    }
}
