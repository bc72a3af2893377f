/// Markdown code fence delimiter models like to wrap JSON replies in.
pub const FENCE: &str = "```";

/// Strip a Markdown code fence wrapped around a response.
///
/// Unfenced text comes back trimmed and otherwise untouched. Fenced text loses
/// its first line (the opening fence, with or without a language tag) and, when
/// the last line is a closing fence, that line too.
pub fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with(FENCE) {
        return trimmed.to_string();
    }

    let mut lines: Vec<&str> = trimmed.split('\n').collect();
    lines.remove(0);
    if lines
        .last()
        .is_some_and(|last| last.trim().starts_with(FENCE))
    {
        lines.pop();
    }
    lines.join("\n").trim().to_string()
}
