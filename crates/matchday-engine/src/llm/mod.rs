pub mod client;
pub mod models;
pub mod prompts;

pub use client::OpenAiClient;
pub use models::{Model, Usage};
