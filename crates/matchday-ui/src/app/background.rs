//! Background task handling for Matchday
//!
//! Channel sends use `let _ =`: a failed send means the UI loop is gone and
//! nobody is waiting for the result.

use crate::app::messages::BackgroundMessage;
use crate::ui::App;
use futures::FutureExt;
use matchday_adapters::clipboard::copy_text;
use matchday_core::protocol::{Transport, TransportError};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::mpsc;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Post `text` on a tokio task and report the body back over `tx`.
pub fn spawn_analysis(
    tx: mpsc::Sender<BackgroundMessage>,
    transport: Arc<dyn Transport>,
    text: String,
) {
    let tx_result = tx.clone();
    spawn_background(tx, "analysis", async move {
        let result = transport.post_analyze(&text).await;
        let _ = tx_result.send(BackgroundMessage::AnalysisFinished(result));
    });
}

/// Hand `text` to the clipboard on a blocking thread; failures are only logged.
pub fn spawn_copy(tx: mpsc::Sender<BackgroundMessage>, what: &'static str, text: String) {
    spawn_background(tx, "clipboard", async move {
        match tokio::task::spawn_blocking(move || copy_text(&text)).await {
            Ok(Some(path)) => debug!(what, ?path, "copied to clipboard"),
            Ok(None) => warn!(what, "no clipboard available"),
            Err(err) => warn!(what, error = %err, "clipboard task failed"),
        }
    });
}

/// Apply every pending background message. Returns true if anything arrived.
pub fn drain_messages(app: &mut App, rx: &mpsc::Receiver<BackgroundMessage>) -> bool {
    let mut changed = false;
    while let Ok(message) = rx.try_recv() {
        changed = true;
        match message {
            BackgroundMessage::AnalysisFinished(result) => app.finish_analysis(result),
            BackgroundMessage::Error(message) => {
                warn!(%message, "background task failed");
                // A crashed request still has to end the submission.
                if app.controller.is_submitting() {
                    app.finish_analysis(Err(TransportError::new(message)));
                } else {
                    app.error = Some(message);
                }
            }
        }
    }
    changed
}

pub fn spawn_background<F>(tx: mpsc::Sender<BackgroundMessage>, task_name: &'static str, fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(panic) = AssertUnwindSafe(fut).catch_unwind().await {
            let detail = if let Some(s) = panic.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic payload".to_string()
            };
            error!(task_name, %detail, "background task panicked");
            let _ = tx.send(BackgroundMessage::Error(format!(
                "Background task '{}' crashed unexpectedly: {}",
                task_name, detail
            )));
        }
    });
}
