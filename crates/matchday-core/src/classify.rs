//! Best-effort classification of model output that did not parse as JSON.
//!
//! When the upstream provider fails, its error text sometimes ends up where
//! the model reply should have been. Matching a few well-known phrases lets
//! the UI say something more useful than "unexpected format". This depends on
//! provider wording and is a heuristic, not a contract.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatFailure {
    #[error("No quota or credits left with the AI provider. Enable billing and try again.")]
    QuotaExceeded,
    #[error("The AI provider rejected the API key. Check OPENAI_API_KEY where the function runs.")]
    InvalidApiKey,
    #[error("Too many requests (429). Wait a moment and try again.")]
    RateLimited,
    #[error("Couldn't read JSON from the response (unexpected format).")]
    Unexpected,
}

/// Checked in order; the first match wins.
const VENDOR_PHRASES: &[(FormatFailure, &[&str])] = &[
    (
        FormatFailure::QuotaExceeded,
        &["exceeded your current quota", "insufficient_quota"],
    ),
    (
        FormatFailure::InvalidApiKey,
        &["Incorrect API key", "invalid_api_key"],
    ),
    (FormatFailure::RateLimited, &["429", "rate_limit_exceeded"]),
];

/// Classify unparseable, fence-stripped reply text.
pub fn classify_format_failure(text: &str) -> FormatFailure {
    VENDOR_PHRASES
        .iter()
        .find(|(_, needles)| needles.iter().any(|needle| text.contains(needle)))
        .map(|(failure, _)| *failure)
        .unwrap_or(FormatFailure::Unexpected)
}
