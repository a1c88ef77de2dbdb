use crate::app::App;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub fn handle_quit_confirm_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
            app.ui.quit_confirm_selected = if app.ui.quit_confirm_selected == 0 { 1 } else { 0 };
        }
        KeyCode::Enter => {
            if app.ui.quit_confirm_selected == 0 {
                app.ui.quit();
            }
            app.ui.show_quit_confirm = false;
        }
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.ui.quit();
            app.ui.show_quit_confirm = false;
        }
        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
            app.ui.show_quit_confirm = false;
        }
        // Ctrl+C again closes the dialog
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.ui.show_quit_confirm = false;
        }
        _ => {}
    }
}

/// Thread actions menu: Recover / Storage entries.
pub fn handle_thread_menu_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.ui.move_menu_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.ui.move_menu_selection(1),
        KeyCode::Enter => {
            if let Some(item) = app.ui.selected_menu_item() {
                app.activate_menu_item(item);
            }
        }
        KeyCode::Esc | KeyCode::Char('m') => app.ui.close_thread_menu(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::harness;
    use crate::services::ApiCommand;
    use crate::state::ThreadMenuItem;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn menu_selection_wraps_and_activates() {
        let mut h = harness();
        h.app.ui.open_thread_menu();
        handle_thread_menu_input(press(KeyCode::Up), &mut h.app);
        assert_eq!(h.app.ui.selected_menu_item(), Some(ThreadMenuItem::SaveLocally));
        handle_thread_menu_input(press(KeyCode::Down), &mut h.app);
        assert_eq!(h.app.ui.selected_menu_item(), Some(ThreadMenuItem::RecoverFromArchive));
        handle_thread_menu_input(press(KeyCode::Enter), &mut h.app);
        assert!(!h.app.ui.show_thread_menu);
        assert_eq!(h.commands.try_recv().unwrap(), ApiCommand::RecoverFromArchive { id: 42 });
    }
}
