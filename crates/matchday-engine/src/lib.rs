//! Server side of Matchday: the analyze function and the LLM call behind it.

pub mod function;
pub mod llm;
pub mod server;

pub use function::{AnalyzeFunction, FunctionError, FunctionResponse};
pub use llm::client::OpenAiClient;
