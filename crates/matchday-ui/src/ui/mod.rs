//! Application state and rendering for the Matchday TUI.

pub mod render;
pub mod theme;
pub mod types;

pub use render::render;
pub use types::{InputBuffer, ResultView, Toast, ToastKind, SPINNER_FRAMES};

use crate::controller::{
    AnalyzeController, Failure, Submission, COPY_NOTICE, PROGRESS_TEXT, SUCCESS_NOTICE,
    SUCCESS_TEXT,
};
use matchday_core::protocol::TransportError;
use std::time::Duration;

/// Main application state
pub struct App {
    pub controller: AnalyzeController,
    pub input: InputBuffer,
    /// Endpoint shown in the header.
    pub endpoint: String,
    /// Last failure message; cleared on the next analyze attempt.
    pub error: Option<String>,
    /// Text of the debug view: the payload JSON, or the raw reply of a failure.
    pub debug_text: Option<String>,
    pub view: ResultView,
    /// Vertical scroll of the right-hand panel.
    pub result_scroll: u16,
    pub toast: Option<Toast>,
    pub spinner_frame: usize,
    pub should_quit: bool,
    pub needs_redraw: bool,
}

impl App {
    pub fn new(controller: AnalyzeController, endpoint: impl Into<String>) -> Self {
        Self {
            controller,
            input: InputBuffer::default(),
            endpoint: endpoint.into(),
            error: None,
            debug_text: None,
            view: ResultView::default(),
            result_scroll: 0,
            toast: None,
            spinner_frame: 0,
            should_quit: false,
            needs_redraw: true,
        }
    }

    pub fn show_toast(&mut self, toast: Toast) {
        self.toast = Some(toast);
        self.needs_redraw = true;
    }

    /// Drop an expired toast. Returns true when something changed.
    pub fn clear_expired_toast(&mut self) -> bool {
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn tick_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
    }

    /// Start an analysis of the current input. Returns the text to send
    /// when a request should go out.
    pub fn request_analysis(&mut self) -> Option<String> {
        self.error = None;
        match self.controller.begin_submit(self.input.text()) {
            Submission::Send(text) => {
                self.show_toast(Toast::progress(PROGRESS_TEXT));
                Some(text)
            }
            Submission::Rejected(err) => {
                self.error = Some(err.to_string());
                self.toast = None;
                None
            }
            Submission::Ignored => None,
        }
    }

    /// Apply the result of the request started by `request_analysis`.
    pub fn finish_analysis(&mut self, result: Result<String, TransportError>) {
        match self.controller.complete(result) {
            Ok(()) => {
                self.debug_text = self
                    .controller
                    .last_result()
                    .map(|last| last.rendered.debug_json.clone());
                self.view = ResultView::Result;
                self.result_scroll = 0;
                self.show_toast(Toast::success(SUCCESS_TEXT, SUCCESS_NOTICE));
            }
            Err(Failure { error, debug }) => {
                self.error = Some(error.to_string());
                if debug.is_some() {
                    self.debug_text = debug;
                    self.view = ResultView::Debug;
                    self.result_scroll = 0;
                }
                self.toast = None;
            }
        }
        self.needs_redraw = true;
    }

    /// Summary text to copy, with the copy notice shown; `None` without a
    /// result. The clipboard write itself happens off the UI thread.
    pub fn copy_summary(&mut self) -> Option<String> {
        let text = self.controller.summary_text()?;
        self.show_toast(Toast::info("Summary copied", COPY_NOTICE));
        Some(text)
    }

    /// Payload JSON to copy (`{}` without a result), with the copy notice shown.
    pub fn copy_json(&mut self) -> String {
        self.show_toast(Toast::info("JSON copied", COPY_NOTICE));
        self.controller.json_text()
    }

    pub fn toggle_view(&mut self) {
        self.view = self.view.toggle();
        self.result_scroll = 0;
    }

    pub fn scroll_result(&mut self, delta: i32) {
        self.result_scroll = (self.result_scroll as i32 + delta).clamp(0, u16::MAX as i32) as u16;
    }

    pub fn clear_input(&mut self) {
        self.input.clear();
    }

    /// Seconds left on the cooldown, rounded up, while it runs.
    pub fn cooldown_secs(&self) -> Option<u64> {
        self.controller
            .cooldown_remaining()
            .map(|left| left.as_millis().div_ceil(1000) as u64)
            .filter(|secs| *secs > 0)
    }

    pub fn status(&self) -> Status {
        if self.controller.is_submitting() {
            Status::Submitting
        } else if let Some(secs) = self.cooldown_secs() {
            Status::CoolingDown(secs)
        } else {
            Status::Ready
        }
    }

    /// How long the runtime may sleep before the view could change.
    pub fn poll_interval(&self) -> Duration {
        match self.status() {
            Status::Submitting => Duration::from_millis(100),
            Status::CoolingDown(_) => Duration::from_millis(250),
            Status::Ready if self.toast.is_some() => Duration::from_millis(100),
            Status::Ready => Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ready,
    Submitting,
    CoolingDown(u64),
}
