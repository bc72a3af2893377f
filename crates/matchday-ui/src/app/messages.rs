use matchday_core::protocol::TransportError;

/// Messages from background tasks to the main UI thread.
pub enum BackgroundMessage {
    /// The analyze request came back (or never got a body).
    AnalysisFinished(Result<String, TransportError>),
    /// A background task crashed
    Error(String),
}
