use crate::ui::theme::Theme;
use crate::ui::{App, Status, SPINNER_FRAMES};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub(super) fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let logo = Line::from(vec![
        Span::styled(
            format!("   {}", Theme::LOGO),
            Style::default()
                .fg(Theme::WHITE)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("   {}", app.endpoint),
            Style::default().fg(Theme::GREY_500),
        ),
    ]);

    let status = match app.status() {
        Status::Ready => Span::styled("Ready   ", Style::default().fg(Theme::GREEN)),
        Status::Submitting => Span::styled(
            format!("{} Sending   ", SPINNER_FRAMES[app.spinner_frame % SPINNER_FRAMES.len()]),
            Style::default().fg(Theme::ACCENT),
        ),
        Status::CoolingDown(secs) => Span::styled(
            format!("Cooldown {}s   ", secs),
            Style::default().fg(Theme::YELLOW),
        ),
    };

    frame.render_widget(
        Paragraph::new(vec![Line::from(""), logo]).style(Style::default().bg(Theme::BG)),
        area,
    );
    frame.render_widget(
        Paragraph::new(vec![Line::from(""), Line::from(status)]).alignment(Alignment::Right),
        area,
    );
}
