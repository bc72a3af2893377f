//! TUI runtime for Matchday

use crate::app::messages::BackgroundMessage;
use crate::app::{background, input};
use crate::controller::AnalyzeController;
use crate::ui;
use crate::ui::App;
use anyhow::Result;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use matchday_adapters::config::Config;
use matchday_adapters::transport::HttpTransport;
use ratatui::prelude::*;
use std::io;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Run the interactive form against the configured analyze function.
pub async fn run_tui(config: &Config) -> Result<()> {
    let transport = HttpTransport::new(config.endpoint.clone())?;
    let controller = AnalyzeController::new(Arc::new(transport), config.cooldown());
    let mut app = App::new(controller, config.endpoint.clone());
    info!(endpoint = %config.endpoint, cooldown_secs = config.cooldown_secs, "starting TUI");

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel::<BackgroundMessage>();
    let result = run_loop(&mut terminal, &mut app, rx, tx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

/// Main event loop with background message handling
fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<BackgroundMessage>,
    tx: mpsc::Sender<BackgroundMessage>,
) -> Result<()> {
    let spinner_interval = Duration::from_millis(100);
    let mut last_spinner_tick = Instant::now();
    let mut last_status = app.status();

    loop {
        // Advance spinner only while a request runs to avoid idle frame churn.
        if app.controller.is_submitting() && last_spinner_tick.elapsed() >= spinner_interval {
            app.tick_spinner();
            last_spinner_tick = Instant::now();
            app.needs_redraw = true;
        }

        if background::drain_messages(app, &rx) {
            app.needs_redraw = true;
        }
        if app.clear_expired_toast() {
            app.needs_redraw = true;
        }

        // The cooldown countdown changes the header once a second.
        let status = app.status();
        if status != last_status {
            last_status = status;
            app.needs_redraw = true;
        }

        if app.needs_redraw {
            terminal.draw(|f| ui::render(f, app))?;
            app.needs_redraw = false;
        }

        if event::poll(app.poll_interval())? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key_event(app, key, &tx);
                    app.needs_redraw = true;
                }
                Event::Paste(text) => {
                    input::handle_paste(app, &text);
                    app.needs_redraw = true;
                }
                Event::Resize(..) => app.needs_redraw = true,
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
