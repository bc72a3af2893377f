//! Plain-text exports of the last analysis, for the copy actions.

use crate::payload::{format_number, Payload};
use crate::render::{MAX_OUTCOMES, MAX_TRIGGERS, PLACEHOLDER};

/// Short human-readable summary of a payload.
///
/// Only fields the reply actually carried get a line. An empty summary
/// collapses to the placeholder glyph.
pub fn copy_summary(payload: &Payload) -> String {
    let mut lines = Vec::new();

    if let Some(temperature) = &payload.temperature {
        lines.push(format!("TEMPERATURE: {}", temperature));
    }
    if payload.intensity_raw.is_some() {
        lines.push(format!("INTENSITY: {}/10", format_number(payload.intensity())));
    }
    if !payload.triggers.is_empty() {
        let triggers: Vec<&str> = payload
            .triggers
            .iter()
            .take(MAX_TRIGGERS)
            .map(String::as_str)
            .collect();
        lines.push(format!("TRIGGERS: {}", triggers.join(" | ")));
    }
    if let Some(scenario) = &payload.scenario {
        lines.push(format!("SCENARIO: {}", scenario));
    }
    let scores: Vec<&str> = payload
        .outcomes
        .iter()
        .take(MAX_OUTCOMES)
        .filter_map(|outcome| outcome.score.as_deref())
        .collect();
    if !scores.is_empty() {
        lines.push(format!("SCORELINES: {}", scores.join(" / ")));
    }

    if lines.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        lines.join("\n")
    }
}

/// Pretty JSON of the payload, or `{}` when there is none yet.
pub fn copy_json(payload: Option<&Payload>) -> String {
    payload
        .map(Payload::pretty_json)
        .unwrap_or_else(|| "{}".to_string())
}
