use crate::ui::theme::Theme;
use crate::ui::{App, ResultView};
use matchday_core::render::{RenderedResult, NO_OUTCOMES_TITLE};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

const INPUT_PERCENT: u16 = 40;
const GAP_COLS: u16 = 2;
const INPUT_PLACEHOLDER: &str = "Paste team news, form, odds...";
const EMPTY_RESULT: &str = "Paste the match context and press Ctrl+S to analyze.";

fn panel(title: &str, focused: bool) -> Block<'static> {
    let border = if focused {
        Theme::ACCENT
    } else {
        Theme::GREY_600
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(Theme::GREY_200),
        ))
}

pub(super) fn render_main(frame: &mut Frame, area: Rect, app: &App) {
    let padded = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(2), // Left padding
            Constraint::Min(10),   // Content
            Constraint::Length(2), // Right padding
        ])
        .split(area);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(INPUT_PERCENT),
            Constraint::Length(GAP_COLS),
            Constraint::Min(10),
        ])
        .split(padded[1]);

    render_input_panel(frame, panels[0], app);
    match app.view {
        ResultView::Result => render_result_panel(frame, panels[2], app),
        ResultView::Debug => render_debug_panel(frame, panels[2], app),
    }
}

fn render_input_panel(frame: &mut Frame, area: Rect, app: &App) {
    let block = panel("Match context", true);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    if app.input.text().is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                INPUT_PLACEHOLDER,
                Style::default().fg(Theme::GREY_500),
            )),
            inner,
        );
        frame.set_cursor_position((inner.x, inner.y));
        return;
    }

    // Unwrapped text, scrolled so the cursor stays visible.
    let (row, col) = app.input.cursor_position();
    let row = row.min(u16::MAX as usize) as u16;
    let col = col.min(u16::MAX as usize) as u16;
    let scroll_y = row.saturating_sub(inner.height - 1);
    let scroll_x = col.saturating_sub(inner.width - 1);

    frame.render_widget(
        Paragraph::new(app.input.text())
            .style(Style::default().fg(Theme::GREY_100))
            .scroll((scroll_y, scroll_x)),
        inner,
    );
    frame.set_cursor_position((inner.x + col - scroll_x, inner.y + row - scroll_y));
}

fn error_line(app: &App) -> Option<Line<'static>> {
    app.error.as_ref().map(|error| {
        Line::from(Span::styled(
            format!("✕ {}", error),
            Style::default().fg(Theme::RED).add_modifier(Modifier::BOLD),
        ))
    })
}

fn label(text: &str) -> Span<'static> {
    Span::styled(
        format!("{:<12}", text),
        Style::default().fg(Theme::GREY_400),
    )
}

fn trigger_pills(triggers: &[String]) -> Vec<Span<'static>> {
    let mut spans = vec![label("Triggers")];
    for (i, trigger) in triggers.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            format!(" {} ", trigger),
            Style::default().fg(Theme::GREY_100).bg(Theme::GREY_700),
        ));
    }
    spans
}

fn outcome_lines(rendered: &RenderedResult) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for card in &rendered.outcomes {
        if card.placeholder {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{} ", Theme::OUTCOME_BULLET),
                    Style::default().fg(Theme::GREY_600),
                ),
                Span::styled(NO_OUTCOMES_TITLE, Style::default().fg(Theme::GREY_400)),
                Span::styled(
                    format!("  {}", card.score),
                    Style::default().fg(Theme::GREY_500),
                ),
            ]));
            continue;
        }

        let mut head = vec![
            Span::styled(
                format!("{} ", Theme::OUTCOME_BULLET),
                Style::default().fg(Theme::ACCENT),
            ),
            Span::styled(
                card.score.clone(),
                Style::default()
                    .fg(Theme::WHITE)
                    .add_modifier(Modifier::BOLD),
            ),
        ];
        if let Some(tag) = &card.tag {
            head.push(Span::styled(
                format!("  {}", tag),
                Style::default().fg(Theme::YELLOW),
            ));
        }
        lines.push(Line::from(head));
        if let Some(why) = &card.why {
            lines.push(Line::from(Span::styled(
                format!("  {}", why),
                Style::default().fg(Theme::GREY_200),
            )));
        }
    }
    lines
}

fn render_result_panel(frame: &mut Frame, area: Rect, app: &App) {
    let block = panel("Analysis", false);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(last) = app.controller.last_result() else {
        let mut lines: Vec<Line> = error_line(app).into_iter().collect();
        lines.push(Line::from(Span::styled(
            EMPTY_RESULT,
            Style::default().fg(Theme::GREY_500),
        )));
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
        return;
    };
    let rendered = &last.rendered;

    let error = error_line(app);
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(error.is_some() as u16), // Error
            Constraint::Length(1),                      // Temperature
            Constraint::Length(1),                      // Intensity gauge
            Constraint::Min(0),                         // Everything else
        ])
        .split(inner);

    if let Some(error) = error {
        frame.render_widget(Paragraph::new(error), sections[0]);
    }

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            label("Temperature"),
            Span::styled(
                rendered.temperature_text.clone(),
                Style::default()
                    .fg(Theme::WHITE)
                    .add_modifier(Modifier::BOLD),
            ),
        ])),
        sections[1],
    );

    let gauge_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(12), Constraint::Min(1)])
        .split(sections[2]);
    frame.render_widget(Paragraph::new(Line::from(label("Intensity"))), gauge_row[0]);
    frame.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(Theme::ACCENT).bg(Theme::GREY_700))
            .ratio(rendered.fill_ratio.clamp(0.0, 1.0))
            .label(Span::styled(
                rendered.intensity_text.clone(),
                Style::default().fg(Theme::WHITE),
            )),
        gauge_row[1],
    );

    let mut lines = vec![
        Line::from(""),
        Line::from(trigger_pills(&rendered.triggers)),
        Line::from(""),
        Line::from(label("Scenario")),
        Line::from(Span::styled(
            rendered.scenario_text.clone(),
            Style::default().fg(Theme::GREY_100),
        )),
        Line::from(""),
        Line::from(label("Factors")),
        Line::from(Span::styled(
            rendered.factors_text.clone(),
            Style::default().fg(Theme::GREY_100),
        )),
        Line::from(""),
        Line::from(label("Outcomes")),
    ];
    lines.extend(outcome_lines(rendered));
    if !rendered.confidence_text.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            rendered.confidence_text.clone(),
            Style::default()
                .fg(Theme::GREY_400)
                .add_modifier(Modifier::ITALIC),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("received {}", last.received_at.format("%H:%M:%S")),
        Style::default().fg(Theme::GREY_600),
    )));

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((app.result_scroll, 0)),
        sections[3],
    );
}

fn render_debug_panel(frame: &mut Frame, area: Rect, app: &App) {
    let block = panel("Debug", false);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = error_line(app).into_iter().collect();
    match &app.debug_text {
        Some(text) => lines.extend(text.lines().map(|line| {
            Line::from(Span::styled(
                line.to_string(),
                Style::default().fg(Theme::GREY_200),
            ))
        })),
        None => lines.push(Line::from(Span::styled(
            "No debug output yet.",
            Style::default().fg(Theme::GREY_500),
        ))),
    }

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((app.result_scroll, 0)),
        inner,
    );
}
