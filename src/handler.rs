use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use crate::app::{Action, App};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent, tx: &UnboundedSender<AppEvent>) {
    match event {
        AppEvent::Key(key) => handle_key(app, key, tx),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse, tx),
        AppEvent::Resize(_, _) => app.scroll_chat_to_bottom(),
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Completed(action, result) => app.complete(action, result),
    }
}

/// Send the request on its own task; the result comes back as `AppEvent::Completed`.
pub fn spawn_action(app: &mut App, action: Action, tx: &UnboundedSender<AppEvent>) {
    app.pending += 1;
    app.scroll_chat_to_bottom();

    let client = app.client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = client.send(action.message()).await;
        let _ = tx.send(AppEvent::Completed(action, result));
    });
}

fn handle_key(app: &mut App, key: KeyEvent, tx: &UnboundedSender<AppEvent>) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,

        // Buttons
        KeyCode::F(1) => {
            let action = app.help();
            spawn_action(app, action, tx);
        }
        KeyCode::F(2) => {
            let action = app.toggle_explain();
            spawn_action(app, action, tx);
        }

        KeyCode::Enter => {
            if let Some(action) = app.submit() {
                spawn_action(app, action, tx);
            }
        }

        // Chat log scrolling
        KeyCode::PageUp => app.scroll_chat_up(app.chat_height.max(2) / 2),
        KeyCode::PageDown => app.scroll_chat_down(app.chat_height.max(2) / 2),
        KeyCode::Up => app.scroll_chat_up(1),
        KeyCode::Down => app.scroll_chat_down(1),

        // Input editing
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => app.input_cursor = 0,
        KeyCode::End => app.input_cursor = app.input.chars().count(),
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent, tx: &UnboundedSender<AppEvent>) {
    let (x, y) = (mouse.column, mouse.row);
    let hit = |area: Option<Rect>| area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown if hit(app.chat_area) => app.scroll_chat_down(3),
        MouseEventKind::ScrollUp if hit(app.chat_area) => app.scroll_chat_up(3),
        MouseEventKind::Down(MouseButton::Left) => {
            if hit(app.help_button_area) {
                let action = app.help();
                spawn_action(app, action, tx);
            } else if hit(app.explain_button_area) {
                let action = app.toggle_explain();
                spawn_action(app, action, tx);
            }
        }
        _ => {}
    }
}
