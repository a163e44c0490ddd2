use crate::tui::app::{App, View};
use crossterm::event::{KeyCode, KeyEvent};
use eventchart_core::Timestamp;

pub fn handle_key(app: &mut App, key: KeyEvent, now: Timestamp) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Esc if app.view == View::Help => app.view = View::Chart,
        KeyCode::Char('r') => app.refresh(now),
        KeyCode::Char(c @ '1'..='6') => {
            let index = c as usize - '1' as usize;
            app.select_preset(index, now);
        }
        _ => {}
    }
}
