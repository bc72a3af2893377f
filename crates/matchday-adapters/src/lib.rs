//! Runtime adapters for Matchday (config, HTTP transport, clipboard).

pub mod clipboard;
pub mod config;
pub mod transport;
