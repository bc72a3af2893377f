use crate::ui::theme::Theme;
use crate::ui::{App, Status, ToastKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// A footer button with its key and label
struct FooterButton {
    key: &'static str,
    label: &'static str,
    enabled: bool,
}

impl FooterButton {
    fn new(key: &'static str, label: &'static str, enabled: bool) -> Self {
        Self {
            key,
            label,
            enabled,
        }
    }

    fn width(&self) -> usize {
        // " key " + " label " + "  " (spacing between buttons)
        self.key.chars().count() + 2 + self.label.chars().count() + 3
    }

    fn to_spans(&self) -> Vec<Span<'static>> {
        let (key_fg, label_fg) = if self.enabled {
            (Theme::WHITE, Theme::GREY_200)
        } else {
            (Theme::GREY_500, Theme::GREY_600)
        };
        vec![
            Span::styled(
                format!(" {} ", self.key),
                Style::default().fg(key_fg).bg(Theme::GREY_700),
            ),
            Span::styled(format!(" {}  ", self.label), Style::default().fg(label_fg)),
        ]
    }
}

fn toast_color(kind: ToastKind) -> Color {
    match kind {
        ToastKind::Progress => Theme::ACCENT,
        ToastKind::Success => Theme::GREEN,
        ToastKind::Info => Theme::GREY_200,
    }
}

pub(super) fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    if let Some(toast) = &app.toast {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                format!("   {}", toast.message),
                Style::default().fg(toast_color(toast.kind)),
            ))),
            rows[0],
        );
    }

    let has_result = app.controller.last_result().is_some();
    let buttons = [
        FooterButton::new("^S", "Analyze", app.status() == Status::Ready),
        FooterButton::new("F2", "Copy summary", has_result),
        FooterButton::new("F3", "Copy JSON", true),
        FooterButton::new("Tab", "Debug", true),
        FooterButton::new("^L", "Clear", true),
        FooterButton::new("Esc", "Quit", true),
    ];

    // Drop buttons from the right when the terminal is too narrow.
    let mut spans = vec![Span::raw("   ")];
    let mut used = 3;
    for button in &buttons {
        if used + button.width() > area.width as usize {
            break;
        }
        used += button.width();
        spans.extend(button.to_spans());
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), rows[1]);
}
