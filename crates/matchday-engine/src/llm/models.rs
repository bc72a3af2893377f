use serde::Deserialize;

/// Model families that accept `response_format: json_schema`.
const STRUCTURED_OUTPUT_PREFIXES: [&str; 6] = ["gpt-4o", "gpt-4.1", "gpt-5", "o1", "o3", "o4"];

fn supports_structured_format(model_id: &str) -> bool {
    // OpenAI-compatible routers prefix ids with the vendor ("openai/gpt-4o").
    let bare = model_id.rsplit('/').next().unwrap_or(model_id);
    STRUCTURED_OUTPUT_PREFIXES
        .iter()
        .any(|prefix| bare.starts_with(prefix))
}

/// The chat model the function talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    id: String,
    max_tokens: u32,
}

impl Model {
    pub fn new(id: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            id: id.into(),
            max_tokens,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Whether this model supports structured outputs with JSON schema.
    pub fn supports_structured_outputs(&self) -> bool {
        supports_structured_format(&self.id)
    }
}

/// API usage information from the LLM provider.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}
