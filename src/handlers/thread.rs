use crate::app::App;
use crossterm::event::{KeyCode, KeyEvent};

const PAGE_LINES: i32 = 10;

/// Keys while the thread (header, body, replies) has focus
pub fn handle_thread_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.thread.select_next_reply(),
        KeyCode::Up | KeyCode::Char('k') => app.thread.select_previous_reply(),
        KeyCode::PageDown => app.thread.scroll_by(PAGE_LINES),
        KeyCode::PageUp => app.thread.scroll_by(-PAGE_LINES),
        KeyCode::Home => {
            app.thread.selected_reply = None;
            app.thread.scroll = 0;
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(i) = app.thread.selected_reply {
                app.thread.toggle_collapsed(i);
            }
        }
        KeyCode::Char('v') => {
            if let Some(i) = app.thread.selected_reply {
                app.ui.raw_view_reply = Some(i);
            }
        }
        KeyCode::Char('m') => {
            if app.thread.thread().is_some() {
                app.ui.open_thread_menu();
            }
        }
        KeyCode::Char('r') | KeyCode::Tab => {
            if app.thread.thread().is_some() {
                app.focus_composer();
            }
        }
        KeyCode::Char('c') => app.toggle_colorize_replies(),
        KeyCode::F(5) => app.refetch(),
        KeyCode::Char('q') | KeyCode::Esc => {
            app.ui.show_quit_confirm = true;
            app.ui.quit_confirm_selected = 1;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{harness, sample_thread};
    use crate::model::ThreadResponse;
    use crate::state::Focus;
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn space_collapses_selected_reply() {
        let mut h = harness();
        h.app.thread.apply_response(ThreadResponse::Ok(sample_thread()));
        handle_thread_input(press(KeyCode::Down), &mut h.app);
        handle_thread_input(press(KeyCode::Down), &mut h.app);
        handle_thread_input(press(KeyCode::Char(' ')), &mut h.app);
        assert!(h.app.thread.is_collapsed(1));
        assert!(!h.app.thread.is_collapsed(0));
        handle_thread_input(press(KeyCode::Enter), &mut h.app);
        assert!(!h.app.thread.is_collapsed(1));
    }

    #[test]
    fn raw_view_opens_for_selected_reply() {
        let mut h = harness();
        h.app.thread.apply_response(ThreadResponse::Ok(sample_thread()));
        handle_thread_input(press(KeyCode::Char('v')), &mut h.app);
        assert_eq!(h.app.ui.raw_view_reply, None);
        handle_thread_input(press(KeyCode::Down), &mut h.app);
        handle_thread_input(press(KeyCode::Char('v')), &mut h.app);
        assert_eq!(h.app.ui.raw_view_reply, Some(0));
    }

    #[test]
    fn composer_needs_a_loaded_thread() {
        let mut h = harness();
        handle_thread_input(press(KeyCode::Char('r')), &mut h.app);
        assert_eq!(h.app.ui.focus, Focus::Thread);
        h.app.thread.apply_response(ThreadResponse::Ok(sample_thread()));
        handle_thread_input(press(KeyCode::Char('r')), &mut h.app);
        assert_eq!(h.app.ui.focus, Focus::Composer);
    }
}
