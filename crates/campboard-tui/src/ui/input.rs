//! Keyboard and mouse input handling for the TUI.
//!
//! Translates terminal events into board gestures and application state
//! changes. Completed gestures hand their operation to the app, which runs it
//! in the background.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use tracing::debug;

use crate::app::{App, AppState, Dialog, PoolList, SCROLL_STEP};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.close_overlay();
        }
        return Ok(false);
    }

    if matches!(app.state, AppState::ShowingDialog(_)) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
            app.close_overlay();
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Esc => {
            if app.cancel_drag() {
                debug!("Drag cancelled from keyboard");
            } else {
                app.notice = None;
            }
        }
        KeyCode::Char('q') => {
            app.cancel_drag();
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Char('u') | KeyCode::Char('r') => app.refresh_background(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::PageDown => app.scroll_down(SCROLL_STEP * 4),
        KeyCode::PageUp => app.scroll_up(SCROLL_STEP * 4),
        KeyCode::Char(']') => app.scroll_pool_down(PoolList::Campers, SCROLL_STEP),
        KeyCode::Char('[') => app.scroll_pool_up(PoolList::Campers, SCROLL_STEP),
        KeyCode::Char('}') => app.scroll_pool_down(PoolList::Counselors, SCROLL_STEP),
        KeyCode::Char('{') => app.scroll_pool_up(PoolList::Counselors, SCROLL_STEP),
        KeyCode::Char('x') => {
            let op = app.remove_selected_counselor();
            app.run_operation(op);
        }
        KeyCode::Char('b') => app.open_dialog(Dialog::BunkManager),
        KeyCode::Char('e') => app.open_dialog(Dialog::EventBunks),
        _ => {}
    }
    Ok(false)
}

/// Handle a mouse event. Only the left button drives gestures.
pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let (x, y) = (mouse.column, mouse.row);

    if !matches!(app.state, AppState::Normal) {
        // Any click dismisses an informational overlay
        if matches!(mouse.kind, MouseEventKind::Down(_))
            && matches!(app.state, AppState::ShowingHelp | AppState::ShowingDialog(_))
        {
            app.close_overlay();
        }
        return;
    }

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let op = app.mouse_down(x, y);
            app.run_operation(op);
        }
        MouseEventKind::Drag(MouseButton::Left) => app.mouse_drag(x, y),
        MouseEventKind::Up(MouseButton::Left) => {
            let op = app.mouse_up(x, y);
            app.run_operation(op);
        }
        MouseEventKind::Down(MouseButton::Right) => {
            // Right click aborts a drag in progress
            app.cancel_drag();
        }
        MouseEventKind::ScrollDown => app.scroll_wheel(x, y, true),
        MouseEventKind::ScrollUp => app.scroll_wheel(x, y, false),
        _ => {}
    }
}
