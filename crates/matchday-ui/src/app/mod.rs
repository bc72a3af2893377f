//! Application runtime module for Matchday
//!
//! This module contains the TUI runtime, background task management,
//! input handling, and message passing infrastructure.

pub mod background;
pub mod input;
pub mod messages;
pub mod runtime;

pub use runtime::run_tui;
