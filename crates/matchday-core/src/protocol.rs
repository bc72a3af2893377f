use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Route the analyze function is served on, kept compatible with the
/// Netlify layout existing clients post to.
pub const FUNCTION_PATH: &str = "/.netlify/functions/analyze";
/// Shorter alias route.
pub const API_PATH: &str = "/api/analyze";

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Body the client posts to the function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(rename = "inputText", alias = "text")]
    pub input_text: String,
}

impl AnalyzeRequest {
    pub fn new(input_text: impl Into<String>) -> Self {
        Self {
            input_text: input_text.into(),
        }
    }
}

/// Body the function answers with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FunctionReply {
    Content {
        content: String,
    },
    Error {
        error: String,
        /// Provider error code (e.g. `insufficient_quota`) when known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },
}

impl FunctionReply {
    pub fn content(content: impl Into<String>) -> Self {
        FunctionReply::Content {
            content: content.into(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        FunctionReply::Error {
            error: error.into(),
            code: None,
        }
    }
}

/// Failure reported by the LLM provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct UpstreamError {
    pub message: String,
    pub code: Option<String>,
}

impl UpstreamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// The request never produced a usable response body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Something that can turn match context into a model reply.
pub trait Analyzer: Send + Sync {
    fn analyze<'a>(
        &'a self,
        api_key: &'a str,
        input_text: &'a str,
    ) -> BoxFuture<'a, Result<String, UpstreamError>>;
}

/// Client-side path to the analyze function.
///
/// Implementations return the response body text whatever the HTTP status;
/// the function reports its own failures inside the body.
pub trait Transport: Send + Sync {
    fn post_analyze<'a>(&'a self, input_text: &'a str)
        -> BoxFuture<'a, Result<String, TransportError>>;
}
