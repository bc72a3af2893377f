//! Submission state machine between the form and the analyze function.
//!
//! One controller owns the request lifecycle: it validates the input, lets at
//! most one request run, interprets the function's reply, keeps the last good
//! result for rendering and copying, and enforces a fixed cooldown after every
//! attempt. The network call itself can run elsewhere: `begin_submit` hands
//! out the text to send and `complete` takes the result back.

use chrono::{DateTime, Local};
use matchday_core::classify::{classify_format_failure, FormatFailure};
use matchday_core::fence::strip_code_fences;
use matchday_core::parse::{parse_response, ParsedResponse};
use matchday_core::payload::{is_truthy, Payload};
use matchday_core::protocol::{Transport, TransportError};
use matchday_core::render::{render, RenderedResult};
use matchday_core::summary::{copy_json, copy_summary};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How long the success notice stays up.
pub const SUCCESS_NOTICE: Duration = Duration::from_millis(1500);
/// How long the copy notices stay up.
pub const COPY_NOTICE: Duration = Duration::from_millis(1200);

pub const PROGRESS_TEXT: &str = "Generating analysis...";
pub const SUCCESS_TEXT: &str = "Analysis ready.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzeError {
    #[error("Paste some match context first.")]
    EmptyInput,
    #[error("Failed to reach the server. {0}")]
    Transport(String),
    /// The function's `error` text, shown as is.
    #[error("{0}")]
    Upstream(String),
    #[error("Empty response from the server.")]
    EmptyResponse,
    #[error(transparent)]
    Format(#[from] FormatFailure),
}

/// A failed attempt: what to tell the user, and what to show in the debug view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct Failure {
    pub error: AnalyzeError,
    pub debug: Option<String>,
}

impl Failure {
    fn new(error: AnalyzeError, debug: Option<String>) -> Self {
        Self { error, debug }
    }
}

impl From<AnalyzeError> for Failure {
    fn from(error: AnalyzeError) -> Self {
        Self { error, debug: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
    CoolingDown { until: Instant },
}

/// What `begin_submit` decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Send this (trimmed) text, then call `complete`.
    Send(String),
    /// Refused before any request; tell the user.
    Rejected(AnalyzeError),
    /// A request is running or the cooldown is active. Nothing to show.
    Ignored,
}

/// The most recent successful analysis.
#[derive(Debug, Clone)]
pub struct LastResult {
    pub payload: Payload,
    pub rendered: RenderedResult,
    pub received_at: DateTime<Local>,
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Turn a function response body into a payload, or explain why not.
pub fn interpret_reply(body: &str) -> Result<Payload, Failure> {
    let data: Value = serde_json::from_str(body).map_err(|e| {
        Failure::new(
            AnalyzeError::Transport(format!("The reply was not JSON ({}).", e)),
            (!body.trim().is_empty()).then(|| body.to_string()),
        )
    })?;

    if let Some(error) = data.get("error").filter(|error| is_truthy(error)) {
        let message = match error {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        return Err(Failure::new(
            AnalyzeError::Upstream(message),
            Some(pretty(&data)),
        ));
    }

    let content = data.get("content").and_then(Value::as_str).unwrap_or("");
    if content.is_empty() {
        return Err(Failure::new(
            AnalyzeError::EmptyResponse,
            Some(pretty(&data)),
        ));
    }

    match parse_response(content) {
        ParsedResponse::Structured { value, .. } => Ok(Payload::from(value)),
        ParsedResponse::Raw { raw, error } => {
            let cleaned = strip_code_fences(&raw);
            let failure = classify_format_failure(&cleaned);
            debug!(%error, ?failure, "model reply was not JSON");
            Err(Failure::new(AnalyzeError::Format(failure), Some(cleaned)))
        }
    }
}

pub struct AnalyzeController {
    transport: Arc<dyn Transport>,
    cooldown: Duration,
    phase: Phase,
    last: Option<LastResult>,
}

impl AnalyzeController {
    pub fn new(transport: Arc<dyn Transport>, cooldown: Duration) -> Self {
        Self {
            transport,
            cooldown,
            phase: Phase::Idle,
            last: None,
        }
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        self.transport.clone()
    }

    /// Current phase, with an elapsed cooldown folded back into `Idle`.
    pub fn phase(&mut self) -> Phase {
        if let Phase::CoolingDown { until } = self.phase {
            if Instant::now() >= until {
                debug!("cooldown over");
                self.phase = Phase::Idle;
            }
        }
        self.phase
    }

    pub fn is_ready(&mut self) -> bool {
        self.phase() == Phase::Idle
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    /// Time left before another submit is accepted, while the cooldown runs.
    pub fn cooldown_remaining(&self) -> Option<Duration> {
        match self.phase {
            Phase::CoolingDown { until } => {
                let left = until.saturating_duration_since(Instant::now());
                (!left.is_zero()).then_some(left)
            }
            _ => None,
        }
    }

    pub fn last_result(&self) -> Option<&LastResult> {
        self.last.as_ref()
    }

    /// Validate `input` and, if a request may start, move to `Submitting`.
    pub fn begin_submit(&mut self, input: &str) -> Submission {
        let text = input.trim();
        if text.is_empty() {
            return Submission::Rejected(AnalyzeError::EmptyInput);
        }
        if !self.is_ready() {
            debug!(phase = ?self.phase, "submit ignored");
            return Submission::Ignored;
        }
        self.phase = Phase::Submitting;
        info!(chars = text.chars().count(), "submitting match context");
        Submission::Send(text.to_string())
    }

    /// Record the outcome of the request started by `begin_submit`.
    ///
    /// The cooldown starts here whatever the outcome. On success the new
    /// result replaces the last one; on failure the last one is kept.
    pub fn complete(&mut self, result: Result<String, TransportError>) -> Result<(), Failure> {
        self.phase = Phase::CoolingDown {
            until: Instant::now() + self.cooldown,
        };

        let outcome = result
            .map_err(|err| Failure::new(AnalyzeError::Transport(err.message), None))
            .and_then(|body| interpret_reply(&body));

        match outcome {
            Ok(payload) => {
                let rendered = render(&payload);
                self.last = Some(LastResult {
                    payload,
                    rendered,
                    received_at: Local::now(),
                });
                info!("analysis rendered");
                Ok(())
            }
            Err(failure) => {
                warn!(error = %failure.error, "analysis failed");
                Err(failure)
            }
        }
    }

    /// Run a whole submission in place. `None` when the submit was ignored.
    pub async fn submit(&mut self, input: &str) -> Option<Result<(), Failure>> {
        match self.begin_submit(input) {
            Submission::Send(text) => {
                let transport = self.transport.clone();
                let result = transport.post_analyze(&text).await;
                Some(self.complete(result))
            }
            Submission::Rejected(error) => Some(Err(error.into())),
            Submission::Ignored => None,
        }
    }

    /// Summary text for the clipboard, if there is a result to summarize.
    pub fn summary_text(&self) -> Option<String> {
        self.last.as_ref().map(|last| copy_summary(&last.payload))
    }

    pub fn json_text(&self) -> String {
        copy_json(self.last.as_ref().map(|last| &last.payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matchday_core::protocol::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeTransport {
        reply: Result<String, TransportError>,
        calls: AtomicUsize,
        sent: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        fn replying(body: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(body.to_string()),
                calls: AtomicUsize::new(0),
                sent: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(TransportError::new(message)),
                calls: AtomicUsize::new(0),
                sent: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Transport for FakeTransport {
        fn post_analyze<'a>(
            &'a self,
            input_text: &'a str,
        ) -> BoxFuture<'a, Result<String, TransportError>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                self.sent.lock().unwrap().push(input_text.to_string());
                self.reply.clone()
            })
        }
    }

    const COOLDOWN: Duration = Duration::from_secs(25);

    const GOOD_BODY: &str = r#"{"content":"```json\n{\"temperature\":\"Alta\",\"intensity\":8,\"triggers\":[\"x\"],\"scorelines\":[{\"score\":\"2-1\",\"why\":\"r\"}]}\n```"}"#;

    fn controller(transport: Arc<FakeTransport>) -> AnalyzeController {
        AnalyzeController::new(transport, COOLDOWN)
    }

    #[tokio::test(start_paused = true)]
    async fn blank_input_never_reaches_transport() {
        let transport = FakeTransport::replying(GOOD_BODY);
        let mut controller = controller(transport.clone());

        for input in ["", "   ", "\n\t "] {
            let outcome = controller.submit(input).await;
            assert_eq!(outcome, Some(Err(Failure::from(AnalyzeError::EmptyInput))));
        }
        assert_eq!(transport.calls(), 0);
        assert!(controller.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn sends_trimmed_text() {
        let transport = FakeTransport::replying(GOOD_BODY);
        let mut controller = controller(transport.clone());
        controller.submit("  Benfica v Porto\n").await;
        assert_eq!(
            transport.sent.lock().unwrap().as_slice(),
            &["Benfica v Porto".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn second_submit_within_cooldown_is_a_no_op() {
        let transport = FakeTransport::replying(GOOD_BODY);
        let mut controller = controller(transport.clone());

        assert_eq!(controller.submit("match").await, Some(Ok(())));
        assert_eq!(controller.submit("match").await, None);
        assert_eq!(transport.calls(), 1);

        tokio::time::advance(Duration::from_secs(24)).await;
        assert_eq!(controller.submit("match").await, None);
        assert_eq!(transport.calls(), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(controller.is_ready());
        assert_eq!(controller.submit("match").await, Some(Ok(())));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cooldown_follows_failures_too() {
        let transport = FakeTransport::failing("connection refused");
        let mut controller = controller(transport.clone());

        let failure = controller.submit("match").await.unwrap().unwrap_err();
        assert_eq!(
            failure.error,
            AnalyzeError::Transport("connection refused".to_string())
        );
        assert!(controller.cooldown_remaining().is_some());
        assert_eq!(controller.submit("match").await, None);

        tokio::time::advance(COOLDOWN).await;
        assert!(controller.cooldown_remaining().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_submit_is_ignored() {
        let transport = FakeTransport::replying(GOOD_BODY);
        let mut controller = controller(transport.clone());

        assert!(matches!(controller.begin_submit("a"), Submission::Send(_)));
        assert!(controller.is_submitting());
        assert_eq!(controller.begin_submit("a"), Submission::Ignored);
        // Blank input is still reported while busy.
        assert_eq!(
            controller.begin_submit(" "),
            Submission::Rejected(AnalyzeError::EmptyInput)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn end_to_end_render() {
        let transport = FakeTransport::replying(GOOD_BODY);
        let mut controller = controller(transport);

        assert_eq!(controller.submit("Benfica v Porto").await, Some(Ok(())));
        let rendered = &controller.last_result().unwrap().rendered;
        assert_eq!(rendered.temperature_text, "Alta");
        assert_eq!(rendered.intensity_text, "8/10");
        assert_eq!(rendered.triggers, vec!["x".to_string()]);
        assert_eq!(rendered.outcomes.len(), 1);
        assert_eq!(rendered.outcomes[0].score, "2-1");
        assert_eq!(rendered.outcomes[0].why.as_deref(), Some("r"));
    }

    #[tokio::test(start_paused = true)]
    async fn failure_keeps_previous_result() {
        let good = FakeTransport::replying(GOOD_BODY);
        let mut controller = controller(good);
        controller.submit("a").await;
        tokio::time::advance(COOLDOWN).await;

        controller.transport = FakeTransport::replying(r#"{"error":"boom"}"#);
        let failure = controller.submit("a").await.unwrap().unwrap_err();
        assert_eq!(failure.error, AnalyzeError::Upstream("boom".to_string()));
        assert_eq!(
            controller.last_result().unwrap().rendered.temperature_text,
            "Alta"
        );
    }

    #[test]
    fn non_json_body_is_a_transport_failure() {
        let failure = interpret_reply("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(failure.error, AnalyzeError::Transport(_)));
        assert_eq!(failure.debug.as_deref(), Some("<html>502 Bad Gateway</html>"));
    }

    #[test]
    fn error_field_is_passed_through() {
        let failure = interpret_reply(r#"{"error":"Missing OPENAI_API_KEY"}"#).unwrap_err();
        assert_eq!(
            failure.to_string(),
            "Missing OPENAI_API_KEY"
        );
        assert!(failure.debug.unwrap().contains("\"error\""));

        let failure = interpret_reply(r#"{"error":{"message":"x"}}"#).unwrap_err();
        assert_eq!(
            failure.error,
            AnalyzeError::Upstream(r#"{"message":"x"}"#.to_string())
        );
    }

    #[test]
    fn falsy_error_field_is_ignored() {
        let payload = interpret_reply(r#"{"error":"","content":"{\"temperature\":\"Baixa\"}"}"#)
            .unwrap();
        assert_eq!(payload.raw()["temperature"], "Baixa");
    }

    #[test]
    fn missing_or_empty_content_is_empty_response() {
        for body in [r#"{}"#, r#"{"content":""}"#, r#"{"content":42}"#, "null"] {
            let failure = interpret_reply(body).unwrap_err();
            assert_eq!(failure.error, AnalyzeError::EmptyResponse, "{}", body);
        }
    }

    #[test]
    fn unparseable_content_is_classified() {
        let failure =
            interpret_reply(r#"{"content":"```\nYou exceeded your current quota\n```"}"#)
                .unwrap_err();
        assert_eq!(
            failure.error,
            AnalyzeError::Format(FormatFailure::QuotaExceeded)
        );
        assert_eq!(failure.debug.as_deref(), Some("You exceeded your current quota"));

        let failure = interpret_reply(r#"{"content":"Sure, here you go"}"#).unwrap_err();
        assert_eq!(failure.error, AnalyzeError::Format(FormatFailure::Unexpected));
    }

    #[test]
    fn nested_content_is_unwrapped() {
        let payload = interpret_reply(
            r#"{"content":"{\"content\":\"```json\\n{\\\"x\\\":1}\\n```\"}"}"#,
        )
        .unwrap();
        assert_eq!(payload.raw(), &serde_json::json!({"x": 1}));
    }

    #[tokio::test(start_paused = true)]
    async fn copy_texts_follow_last_result() {
        let mut controller = controller(FakeTransport::replying(GOOD_BODY));
        assert_eq!(controller.summary_text(), None);
        assert_eq!(controller.json_text(), "{}");

        controller.submit("a").await;
        assert_eq!(
            controller.summary_text().unwrap(),
            "TEMPERATURE: Alta\nINTENSITY: 8/10\nTRIGGERS: x\nSCORELINES: 2-1"
        );
        assert!(controller.json_text().contains("\"temperature\": \"Alta\""));
    }
}
