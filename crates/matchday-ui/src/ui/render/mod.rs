mod footer;
mod header;
mod main;

use crate::ui::theme::Theme;
use crate::ui::App;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Block,
    Frame,
};

use footer::render_footer;
use header::render_header;
use main::render_main;

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    frame.render_widget(Block::default().style(Style::default().bg(Theme::BG)), area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header (logo, status)
            Constraint::Min(8),    // Input and result panels
            Constraint::Length(2), // Notice + key hints
        ])
        .split(area);

    render_header(frame, layout[0], app);
    render_main(frame, layout[1], app);
    render_footer(frame, layout[2], app);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::tests::{test_app, GOOD_BODY};
    use crate::ui::ResultView;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 32)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn empty_app_renders_hints() {
        let app = test_app();
        let screen = draw(&app);
        assert!(screen.contains("Match context"));
        assert!(screen.contains("Analyze"));
        assert!(screen.contains("Ready"));
    }

    #[test]
    fn result_renders_fields() {
        let mut app = test_app();
        app.input.insert_str("Benfica v Porto");
        app.request_analysis();
        app.finish_analysis(Ok(GOOD_BODY.to_string()));

        let screen = draw(&app);
        assert!(screen.contains("Benfica v Porto"));
        assert!(screen.contains("Alta"));
        assert!(screen.contains("8/10"));
        assert!(screen.contains(" x "));
        assert!(screen.contains("2-1"));
        assert!(screen.contains("likely"));
        assert!(screen.contains("Open game"));
        assert!(screen.contains("thin data"));
        assert!(screen.contains("Cooldown"));
    }

    #[test]
    fn debug_view_and_error_render() {
        let mut app = test_app();
        app.input.insert_str("x");
        app.request_analysis();
        app.finish_analysis(Ok(r#"{"error":"Missing OPENAI_API_KEY"}"#.to_string()));
        assert_eq!(app.view, ResultView::Debug);

        let screen = draw(&app);
        assert!(screen.contains("Missing OPENAI_API_KEY"));
        assert!(screen.contains("Debug"));
        assert!(screen.contains("\"error\""));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let app = test_app();
        let mut terminal = Terminal::new(TestBackend::new(10, 4)).unwrap();
        terminal.draw(|f| render(f, &app)).unwrap();
    }
}
