//! HTML fragments for rendered results.
//!
//! Every piece of producer text goes through [`escape_html`] before it is
//! embedded. The debug JSON is not part of the markup.

use crate::render::{OutcomeCard, RenderedResult, NO_OUTCOMES_TITLE};
use html_escape::encode_quoted_attribute;
use std::fmt::Write;

/// Escape the five HTML metacharacters `& < > " '`.
pub fn escape_html(text: &str) -> String {
    encode_quoted_attribute(text).into_owned()
}

/// Trigger pills, one `<span class="pill">` per entry.
pub fn trigger_pills(triggers: &[String]) -> String {
    triggers
        .iter()
        .map(|t| format!("<span class=\"pill\">{}</span>", escape_html(t)))
        .collect()
}

fn outcome_card(card: &OutcomeCard) -> String {
    if card.placeholder {
        return format!(
            "<div class=\"card\"><div class=\"title\">{}</div><div>{}</div></div>",
            escape_html(NO_OUTCOMES_TITLE),
            escape_html(&card.score)
        );
    }

    let mut html = String::from("<div class=\"card\"><div class=\"card-head\">");
    let _ = write!(html, "<div class=\"cs\">{}</div>", escape_html(&card.score));
    if let Some(tag) = &card.tag {
        let _ = write!(html, "<span class=\"label\">{}</span>", escape_html(tag));
    }
    html.push_str("</div>");
    if let Some(why) = &card.why {
        let _ = write!(html, "<div class=\"why\">{}</div>", escape_html(why));
    }
    html.push_str("</div>");
    html
}

/// Outcome cards, in display order.
pub fn outcome_cards(cards: &[OutcomeCard]) -> String {
    cards.iter().map(outcome_card).collect()
}

impl RenderedResult {
    /// Full result section as an HTML fragment.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<section class=\"result\">\n");
        let _ = writeln!(
            html,
            "  <div id=\"temperature\">{}</div>",
            escape_html(&self.temperature_text)
        );
        let _ = writeln!(
            html,
            "  <div id=\"intensity\">{}</div>",
            escape_html(&self.intensity_text)
        );
        let _ = writeln!(
            html,
            "  <div class=\"bar\"><div id=\"bar\" style=\"width:{}%\"></div></div>",
            self.fill_ratio * 100.0
        );
        let _ = writeln!(
            html,
            "  <div id=\"drivers\">{}</div>",
            trigger_pills(&self.triggers)
        );
        let _ = writeln!(
            html,
            "  <div id=\"matchSummary\">{}</div>",
            escape_html(&self.scenario_text)
        );
        let _ = writeln!(
            html,
            "  <div id=\"tacticalReality\">{}</div>",
            escape_html(&self.factors_text)
        );
        let _ = writeln!(
            html,
            "  <div id=\"outcomes\">{}</div>",
            outcome_cards(&self.outcomes)
        );
        let _ = writeln!(
            html,
            "  <div id=\"confidenceNote\">{}</div>",
            escape_html(&self.confidence_text)
        );
        html.push_str("</section>\n");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::render_value;
    use serde_json::json;

    #[test]
    fn escapes_all_five_metacharacters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's/</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#x27;s/&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain — text"), "plain — text");
    }

    #[test]
    fn pills_escape_their_text() {
        let pills = trigger_pills(&["<script>".to_string(), "derby".to_string()]);
        assert_eq!(
            pills,
            "<span class=\"pill\">&lt;script&gt;</span><span class=\"pill\">derby</span>"
        );
    }

    #[test]
    fn placeholder_card_has_title() {
        let html = outcome_cards(&[OutcomeCard::placeholder()]);
        assert!(html.contains("Possible results"));
        assert!(html.contains("<div>—</div>"));
    }

    #[test]
    fn card_omits_missing_tag_and_reason() {
        let html = outcome_cards(&[OutcomeCard {
            score: "2-1".into(),
            tag: None,
            why: None,
            placeholder: false,
        }]);
        assert!(html.contains("<div class=\"cs\">2-1</div>"));
        assert!(!html.contains("label"));
        assert!(!html.contains("why"));
    }

    #[test]
    fn full_fragment_never_contains_raw_markup_from_payload() {
        let rendered = render_value(&json!({
            "temperature": "<img src=x onerror=alert(1)>",
            "triggers": ["\"quoted\""],
            "tacticalScenario": "a & b",
            "scorelines": [{"score": "1-0", "tag": "<i>", "why": "it's"}],
            "confidenceNote": "<br>"
        }));
        let html = rendered.to_html();
        assert!(!html.contains("<img"));
        assert!(!html.contains("<i>"));
        assert!(!html.contains("<br>"));
        assert!(html.contains("a &amp; b"));
        assert!(html.contains("it&#x27;s"));
        assert!(html.contains("&quot;quoted&quot;"));
        assert!(html.contains("width:0%"));
    }
}
