//! Keyboard and paste handling.

use crate::app::background;
use crate::app::messages::BackgroundMessage;
use crate::ui::App;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::mpsc;

const SCROLL_STEP: i32 = 5;

pub fn handle_key_event(app: &mut App, key: KeyEvent, tx: &mpsc::Sender<BackgroundMessage>) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('c') if ctrl => app.should_quit = true,
        KeyCode::Char('s') if ctrl => analyze(app, tx),
        KeyCode::F(5) => analyze(app, tx),
        KeyCode::F(2) => {
            if let Some(text) = app.copy_summary() {
                background::spawn_copy(tx.clone(), "summary", text);
            }
        }
        KeyCode::F(3) => background::spawn_copy(tx.clone(), "json", app.copy_json()),
        KeyCode::Tab => app.toggle_view(),
        KeyCode::Char('l') if ctrl => app.clear_input(),
        KeyCode::PageUp => app.scroll_result(-SCROLL_STEP),
        KeyCode::PageDown => app.scroll_result(SCROLL_STEP),

        KeyCode::Enter => app.input.insert_char('\n'),
        KeyCode::Backspace => app.input.backspace(),
        KeyCode::Delete => app.input.delete(),
        KeyCode::Left => app.input.move_left(),
        KeyCode::Right => app.input.move_right(),
        KeyCode::Up => app.input.move_up(),
        KeyCode::Down => app.input.move_down(),
        KeyCode::Home => app.input.move_home(),
        KeyCode::End => app.input.move_end(),
        KeyCode::Char(c) if !ctrl && !alt => app.input.insert_char(c),
        _ => {}
    }
}

pub fn handle_paste(app: &mut App, text: &str) {
    app.input.insert_str(text);
}

fn analyze(app: &mut App, tx: &mpsc::Sender<BackgroundMessage>) {
    if let Some(text) = app.request_analysis() {
        background::spawn_analysis(tx.clone(), app.controller.transport(), text);
    }
}
