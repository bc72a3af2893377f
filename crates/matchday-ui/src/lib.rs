//! Terminal UI layer for Matchday.

pub mod app;
pub mod controller;
pub mod ui;

pub use app::run_tui;
pub use controller::{AnalyzeController, AnalyzeError, Failure, LastResult, Submission};
