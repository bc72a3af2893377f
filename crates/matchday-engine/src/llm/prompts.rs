use matchday_adapters::config::PromptVariant;
use serde_json::{json, Value};

// ═══════════════════════════════════════════════════════════════════════════════
// SHARED BUILDING BLOCKS
// ═══════════════════════════════════════════════════════════════════════════════

const ROLE: &str = r#"You are Matchday, a football (soccer) match analyst.
The user pastes free-form match context: teams, form, injuries, odds, news.
Read it as a scout would and judge how the match is likely to play out."#;

const ANALYSIS_RULES: &str = r#"RULES:
- Base every claim on the provided context; say so when the context is thin.
- Keep sentences short and concrete. No betting advice.
- "temperature" is one word describing how heated the match will be (e.g. Low, Medium, High).
- "intensity" is a number from 0 to 10.
- Give at most 3 key drivers and at most 2 scorelines."#;

/// Field list for the plain JSON-mode variant.
const JSON_FIELDS: &str = r#"Reply with a single JSON object and nothing else, using exactly these fields:
{
  "temperature": string,
  "intensity": number,
  "triggers": [string],
  "tacticalScenario": string,
  "factors": string,
  "scorelines": [{ "score": string, "tag": string, "why": string }],
  "confidenceNote": string
}"#;

/// Field guidance for the schema variant; the schema itself is enforced by the provider.
const SCHEMA_FIELDS: &str = r#"Fill every field of the response schema:
- matchSummary: the tactical scenario in two or three sentences.
- tacticalReality: the factors that decide the match.
- keyDrivers: the triggers that could swing it.
- suggestedOutcomes: one or two scorelines, each with a probability label and a reason.
- confidenceNote: how much to trust this read, and why."#;

// ═══════════════════════════════════════════════════════════════════════════════
// PROMPTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Name sent with the strict schema.
pub const SCHEMA_NAME: &str = "match_analysis";

pub fn analyze_system(variant: PromptVariant, language: &str) -> String {
    let fields = match variant {
        PromptVariant::Json => JSON_FIELDS,
        PromptVariant::Schema => SCHEMA_FIELDS,
    };
    format!(
        "{}\n\n{}\n\n{}\n\nWrite all text values in {}. Keep JSON keys in English.",
        ROLE,
        ANALYSIS_RULES,
        fields,
        language.trim()
    )
}

/// JSON schema for the `schema` variant. Strict mode needs every property
/// listed as required and `additionalProperties: false` at every level.
pub fn analysis_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "matchSummary": { "type": "string" },
            "temperature": { "type": "string" },
            "intensity": { "type": "number" },
            "tacticalReality": { "type": "string" },
            "keyDrivers": {
                "type": "array",
                "items": { "type": "string" }
            },
            "suggestedOutcomes": {
                "type": "array",
                "minItems": 1,
                "maxItems": 2,
                "items": {
                    "type": "object",
                    "properties": {
                        "score": { "type": "string" },
                        "probabilityLabel": { "type": "string" },
                        "reason": { "type": "string" }
                    },
                    "required": ["score", "probabilityLabel", "reason"],
                    "additionalProperties": false
                }
            },
            "confidenceNote": { "type": "string" }
        },
        "required": [
            "matchSummary",
            "temperature",
            "intensity",
            "tacticalReality",
            "keyDrivers",
            "suggestedOutcomes",
            "confidenceNote"
        ],
        "additionalProperties": false
    })
}
