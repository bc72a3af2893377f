//! Response parsing for model output.
//!
//! The function hands back whatever the model wrote. That is usually JSON,
//! sometimes fenced in Markdown, and sometimes a JSON object whose `content`
//! field holds the real (again possibly fenced) JSON as a string.

use crate::fence::strip_code_fences;
use serde_json::Value;

/// Outcome of parsing a raw model reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse {
    /// The text parsed as JSON.
    Structured {
        value: Value,
        /// Fence-stripped text the value was parsed from.
        cleaned: String,
    },
    /// The text was not JSON, even after stripping fences.
    Raw {
        /// Original text, unchanged.
        raw: String,
        /// Parser error message.
        error: String,
    },
}

impl ParsedResponse {
    pub fn is_structured(&self) -> bool {
        matches!(self, ParsedResponse::Structured { .. })
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            ParsedResponse::Structured { value, .. } => Some(value),
            ParsedResponse::Raw { .. } => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            ParsedResponse::Structured { value, .. } => Some(value),
            ParsedResponse::Raw { .. } => None,
        }
    }
}

fn parse_once(raw: &str) -> ParsedResponse {
    let cleaned = strip_code_fences(raw);
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(value) => ParsedResponse::Structured { value, cleaned },
        Err(err) => ParsedResponse::Raw {
            raw: raw.to_string(),
            error: err.to_string(),
        },
    }
}

/// Parse a model reply, unwrapping one `{"content": "..."}` envelope.
///
/// When the outer text parses to an object with a string `content` field and
/// that string parses too, the inner value wins. Otherwise the outer result is
/// returned as is.
pub fn parse_response(raw: &str) -> ParsedResponse {
    let outer = parse_once(raw);

    let inner = match &outer {
        ParsedResponse::Structured { value, .. } => value
            .get("content")
            .and_then(Value::as_str)
            .map(parse_once),
        ParsedResponse::Raw { .. } => None,
    };

    match inner {
        Some(inner @ ParsedResponse::Structured { .. }) => inner,
        _ => outer,
    }
}
