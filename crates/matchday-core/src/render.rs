//! Display mapping for analysis payloads.
//!
//! Rendering never fails: every field has a fallback, so a half-empty or
//! malformed reply still produces a complete [`RenderedResult`].

use crate::payload::{format_number, Payload, Temperature};
use serde::Serialize;
use serde_json::Value;

/// Glyph shown wherever a field has nothing to display.
pub const PLACEHOLDER: &str = "—";
pub const MAX_TRIGGERS: usize = 3;
pub const MAX_OUTCOMES: usize = 2;
/// Title of the card shown when the reply carried no scorelines.
pub const NO_OUTCOMES_TITLE: &str = "Possible results";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeCard {
    pub score: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub why: Option<String>,
    /// Stand-in card for a reply without outcomes.
    pub placeholder: bool,
}

impl OutcomeCard {
    pub fn placeholder() -> Self {
        Self {
            score: PLACEHOLDER.to_string(),
            tag: None,
            why: None,
            placeholder: true,
        }
    }
}

/// Display-ready view of one analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedResult {
    pub temperature_text: String,
    pub intensity_value: f64,
    pub intensity_text: String,
    /// Bar fill in `0.0..=1.0`.
    pub fill_ratio: f64,
    pub triggers: Vec<String>,
    pub scenario_text: String,
    pub factors_text: String,
    pub confidence_text: String,
    pub outcomes: Vec<OutcomeCard>,
    /// Full payload, pretty-printed and never escaped.
    #[serde(skip)]
    pub debug_json: String,
}

fn temperature_text(temperature: Option<&Temperature>) -> String {
    match temperature {
        Some(Temperature::Level(level)) => format!("Temperature {}", format_number(*level)),
        Some(Temperature::Label(label)) => label.clone(),
        None => PLACEHOLDER.to_string(),
    }
}

fn or_placeholder(text: Option<&String>) -> String {
    text.cloned().unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Map a resolved payload onto the fixed display schema.
pub fn render(payload: &Payload) -> RenderedResult {
    let intensity = payload.intensity();

    let mut triggers: Vec<String> = payload.triggers.iter().take(MAX_TRIGGERS).cloned().collect();
    if triggers.is_empty() {
        triggers.push(PLACEHOLDER.to_string());
    }

    let mut outcomes: Vec<OutcomeCard> = payload
        .outcomes
        .iter()
        .take(MAX_OUTCOMES)
        .map(|outcome| OutcomeCard {
            score: or_placeholder(outcome.score.as_ref()),
            tag: outcome.tag.clone(),
            why: outcome.why.clone(),
            placeholder: false,
        })
        .collect();
    if outcomes.is_empty() {
        outcomes.push(OutcomeCard::placeholder());
    }

    RenderedResult {
        temperature_text: temperature_text(payload.temperature.as_ref()),
        intensity_value: intensity,
        intensity_text: format!("{}/10", format_number(intensity)),
        fill_ratio: intensity / Payload::INTENSITY_MAX,
        triggers,
        scenario_text: or_placeholder(payload.scenario.as_ref()),
        factors_text: or_placeholder(payload.factors.as_ref()),
        confidence_text: payload.confidence_note.clone().unwrap_or_default(),
        outcomes,
        debug_json: payload.pretty_json(),
    }
}

/// Resolve and render an untyped reply in one go.
pub fn render_value(value: &Value) -> RenderedResult {
    render(&Payload::from_value(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn intensity_is_clamped_and_coerced() {
        assert_eq!(render_value(&json!({"intensity": 15})).intensity_text, "10/10");
        assert_eq!(render_value(&json!({"intensity": -3})).intensity_text, "0/10");
        let junk = render_value(&json!({"intensity": "abc"}));
        assert_eq!(junk.intensity_value, 0.0);
        assert_eq!(junk.fill_ratio, 0.0);
    }

    #[test]
    fn fill_ratio_tracks_intensity() {
        let rendered = render_value(&json!({"intensity": "7.5"}));
        assert_eq!(rendered.intensity_text, "7.5/10");
        assert!((rendered.fill_ratio - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn triggers_are_truncated_to_three() {
        let rendered = render_value(&json!({"triggers": ["a", "b", "c", "d"]}));
        assert_eq!(rendered.triggers, vec!["a", "b", "c"]);
    }

    #[test]
    fn falsy_triggers_are_dropped_before_truncation() {
        let rendered = render_value(&json!({"triggers": ["", "a", null, "b", false, "c", "d"]}));
        assert_eq!(rendered.triggers, vec!["a", "b", "c"]);
    }

    #[test]
    fn missing_triggers_yield_one_placeholder() {
        assert_eq!(render_value(&json!({})).triggers, vec![PLACEHOLDER]);
        assert_eq!(render_value(&json!({"triggers": "x"})).triggers, vec![PLACEHOLDER]);
    }

    #[test]
    fn empty_or_missing_scorelines_yield_one_placeholder_card() {
        for value in [json!({"scorelines": []}), json!({}), json!({"scorelines": "2-1"})] {
            let rendered = render_value(&value);
            assert_eq!(rendered.outcomes, vec![OutcomeCard::placeholder()]);
        }
    }

    #[test]
    fn scorelines_are_truncated_to_two() {
        let rendered = render_value(&json!({
            "scorelines": ["1-0", {"score": "2-2", "tag": "draw", "why": "both press"}, "3-3"]
        }));
        assert_eq!(rendered.outcomes.len(), 2);
        assert_eq!(rendered.outcomes[0].score, "1-0");
        assert_eq!(rendered.outcomes[0].tag, None);
        assert_eq!(rendered.outcomes[1].tag.as_deref(), Some("draw"));
        assert_eq!(rendered.outcomes[1].why.as_deref(), Some("both press"));
    }

    #[test]
    fn outcome_without_score_shows_placeholder_score() {
        let rendered = render_value(&json!({"scorelines": [{"why": "no score given"}]}));
        assert_eq!(rendered.outcomes[0].score, PLACEHOLDER);
        assert!(!rendered.outcomes[0].placeholder);
    }

    #[test]
    fn temperature_variants() {
        assert_eq!(render_value(&json!({"temperature": "Alta"})).temperature_text, "Alta");
        assert_eq!(
            render_value(&json!({"temperature": 8})).temperature_text,
            "Temperature 8"
        );
        assert_eq!(
            render_value(&json!({"temperature": 0})).temperature_text,
            "Temperature 0"
        );
        assert_eq!(
            render_value(&json!({"temperature": 0.0})).temperature_text,
            "Temperature 0"
        );
        assert_eq!(render_value(&json!({"temperature": ""})).temperature_text, PLACEHOLDER);
        assert_eq!(render_value(&json!({})).temperature_text, PLACEHOLDER);
    }

    #[test]
    fn text_fields_fall_back() {
        let rendered = render_value(&json!({"tacticalReality": "wide play"}));
        assert_eq!(rendered.scenario_text, PLACEHOLDER);
        assert_eq!(rendered.factors_text, "wide play");
        assert_eq!(rendered.confidence_text, "");
    }

    #[test]
    fn debug_json_is_verbatim_and_unescaped() {
        let value = json!({"scenario": "<b>&'\"</b>", "intensity": 3});
        let rendered = render_value(&value);
        assert!(rendered.debug_json.contains("<b>&'\\\"</b>"));
        assert_eq!(
            serde_json::from_str::<Value>(&rendered.debug_json).unwrap(),
            value
        );
    }

    #[test]
    fn never_panics_on_non_object_payloads() {
        for value in [json!(null), json!(3), json!("text"), json!([{"a": 1}])] {
            let rendered = render_value(&value);
            assert_eq!(rendered.temperature_text, PLACEHOLDER);
            assert_eq!(rendered.outcomes.len(), 1);
        }
    }
}
