//! Normalized match-analysis payload.
//!
//! Producers disagree on field names (`triggers` vs `keyDrivers`,
//! `tacticalScenario` vs `matchSummary`, ...). Each logical field has one
//! priority-ordered alias list below, and [`Payload::from_value`] is the only
//! place they are resolved.

use serde_json::Value;

/// Priority-ordered key aliases for each logical payload field.
pub mod aliases {
    pub const TEMPERATURE: &[&str] = &["temperature"];
    pub const INTENSITY: &[&str] = &["intensity", "intensityLevel"];
    pub const TRIGGERS: &[&str] = &["triggers", "keyDrivers"];
    pub const SCENARIO: &[&str] = &["tacticalScenario", "matchSummary", "summary"];
    pub const FACTORS: &[&str] = &["factors", "tacticalReality"];
    pub const CONFIDENCE_NOTE: &[&str] = &["confidenceNote"];
    pub const OUTCOMES: &[&str] = &["scorelines", "suggestedOutcomes"];

    pub const OUTCOME_SCORE: &[&str] = &["score"];
    pub const OUTCOME_TAG: &[&str] = &["tag", "probabilityLabel"];
    pub const OUTCOME_WHY: &[&str] = &["why", "reason"];
}

/// Loose truthiness: `null`, `false`, `0`, `NaN` and `""` count as absent.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// First truthy value among `keys` on an object.
pub fn lookup<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find(|candidate| is_truthy(candidate))
}

/// Format a number the way a person would write it: `8`, not `8.0`.
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Normalizes -0.
        return "0".to_string();
    }
    format!("{}", n)
}

/// Display text for a truthy value; `None` for anything falsy.
pub fn display_text(value: &Value) -> Option<String> {
    if !is_truthy(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.as_f64().map(format_number).unwrap_or_else(|| n.to_string())),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Coerce an untrusted value to a number.
///
/// Strings are parsed as decimals after trimming (blank is zero); booleans are
/// one or zero; anything else, and anything unparseable, is zero.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse::<f64>().unwrap_or(0.0)
            }
        }
        _ => 0.0,
    };
    if n.is_nan() {
        0.0
    } else {
        n
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Temperature {
    Label(String),
    Level(f64),
}

impl std::fmt::Display for Temperature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Temperature::Label(label) => write!(f, "{}", label),
            Temperature::Level(level) => write!(f, "{}", format_number(*level)),
        }
    }
}

/// One candidate final score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub score: Option<String>,
    pub tag: Option<String>,
    pub why: Option<String>,
}

impl Outcome {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::String(score) => Outcome {
                score: Some(score.clone()).filter(|s| !s.is_empty()),
                ..Outcome::default()
            },
            Value::Object(_) => Outcome {
                score: lookup(value, aliases::OUTCOME_SCORE).and_then(display_text),
                tag: lookup(value, aliases::OUTCOME_TAG).and_then(display_text),
                why: lookup(value, aliases::OUTCOME_WHY).and_then(display_text),
            },
            _ => Outcome::default(),
        }
    }
}

/// A model reply with its field aliases resolved.
///
/// The raw JSON is kept alongside so debug views and JSON copies show exactly
/// what the producer sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub temperature: Option<Temperature>,
    /// Untrusted; use [`Payload::intensity`] for the clamped value.
    pub intensity_raw: Option<Value>,
    /// Truthy trigger entries as text, in producer order, untruncated.
    pub triggers: Vec<String>,
    pub scenario: Option<String>,
    pub factors: Option<String>,
    pub confidence_note: Option<String>,
    /// Outcome entries in producer order, untruncated.
    pub outcomes: Vec<Outcome>,
    raw: Value,
}

impl Payload {
    pub const INTENSITY_MAX: f64 = 10.0;

    pub fn from_value(value: &Value) -> Self {
        // Numbers win before truthiness: a level of 0 is still a level.
        let level = aliases::TEMPERATURE
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_f64));
        let temperature = match level {
            Some(level) => Some(Temperature::Level(level)),
            None => lookup(value, aliases::TEMPERATURE)
                .and_then(display_text)
                .map(Temperature::Label),
        };

        let intensity_raw = aliases::INTENSITY
            .iter()
            .filter_map(|key| value.get(*key))
            .find(|v| !v.is_null())
            .cloned();

        let triggers = match lookup(value, aliases::TRIGGERS) {
            Some(Value::Array(items)) => items.iter().filter_map(display_text).collect(),
            _ => Vec::new(),
        };

        let outcomes = match lookup(value, aliases::OUTCOMES) {
            Some(Value::Array(items)) => items.iter().map(Outcome::from_value).collect(),
            _ => Vec::new(),
        };

        Payload {
            temperature,
            intensity_raw,
            triggers,
            scenario: lookup(value, aliases::SCENARIO).and_then(display_text),
            factors: lookup(value, aliases::FACTORS).and_then(display_text),
            confidence_note: lookup(value, aliases::CONFIDENCE_NOTE).and_then(display_text),
            outcomes,
            raw: value.clone(),
        }
    }

    /// Intensity coerced to a number and clamped to `0..=10`.
    pub fn intensity(&self) -> f64 {
        coerce_number(self.intensity_raw.as_ref()).clamp(0.0, Self::INTENSITY_MAX)
    }

    /// The producer's JSON, untouched.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Pretty-printed producer JSON.
    pub fn pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.raw).unwrap_or_else(|_| self.raw.to_string())
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::from_value(&value)
    }
}
