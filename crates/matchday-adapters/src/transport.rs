//! HTTP transport from the client to the analyze function.

use matchday_core::protocol::{AnalyzeRequest, BoxFuture, Transport, TransportError};
use tracing::debug;

/// Posts match context to the analyze function over HTTP.
///
/// No request timeout is set here: a submission runs until the function
/// answers or the connection fails.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("matchday/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn map_send_error(err: reqwest::Error) -> TransportError {
    if err.is_connect() {
        TransportError::new(format!(
            "Could not connect to the analyze function: {}",
            err
        ))
    } else if err.is_timeout() {
        TransportError::new("The analyze function timed out.")
    } else {
        TransportError::new(err.to_string())
    }
}

impl Transport for HttpTransport {
    fn post_analyze<'a>(
        &'a self,
        input_text: &'a str,
    ) -> BoxFuture<'a, Result<String, TransportError>> {
        Box::pin(async move {
            let response = self
                .client
                .post(&self.endpoint)
                .json(&AnalyzeRequest::new(input_text))
                .send()
                .await
                .map_err(map_send_error)?;

            let status = response.status();
            let body = response.text().await.map_err(map_send_error)?;
            debug!(%status, bytes = body.len(), endpoint = %self.endpoint, "analyze function responded");
            Ok(body)
        })
    }
}
