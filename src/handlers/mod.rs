pub mod composer;
pub mod popups;
pub mod thread;

use crate::app::App;
use crate::state::Focus;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Main input handler dispatcher
pub fn handle_key_event(key: KeyEvent, app: &mut App) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    // Handle quit confirmation dialog (highest priority)
    if app.ui.show_quit_confirm {
        popups::handle_quit_confirm_input(key, app);
        return;
    }

    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.ui.show_quit_confirm = true;
        app.ui.quit_confirm_selected = 1; // Default to "No"
        return;
    }

    if app.ui.raw_view_reply.is_some() {
        app.ui.raw_view_reply = None;
        return;
    }

    if app.ui.show_thread_menu {
        popups::handle_thread_menu_input(key, app);
        return;
    }

    if app.notifications.current_notification.is_some() && key.code == KeyCode::Esc {
        app.notifications.clear_notification();
        return;
    }

    match app.ui.focus {
        Focus::Thread => thread::handle_thread_input(key, app),
        Focus::Composer => composer::handle_composer_input(key, app),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::harness;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn ctrl_c_asks_before_quitting() {
        let mut h = harness();
        handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), &mut h.app);
        assert!(h.app.ui.show_quit_confirm);
        assert!(!h.app.ui.should_quit);

        // "No" is preselected
        handle_key_event(press(KeyCode::Enter), &mut h.app);
        assert!(!h.app.ui.show_quit_confirm);
        assert!(!h.app.ui.should_quit);

        handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), &mut h.app);
        handle_key_event(press(KeyCode::Left), &mut h.app);
        handle_key_event(press(KeyCode::Enter), &mut h.app);
        assert!(h.app.ui.should_quit);
    }

    #[test]
    fn esc_dismisses_notification_first() {
        let mut h = harness();
        h.app.notify_error("boom");
        h.app.ui.set_focus(Focus::Composer);
        handle_key_event(press(KeyCode::Esc), &mut h.app);
        assert!(h.app.notifications.current_notification.is_none());
        assert_eq!(h.app.ui.focus, Focus::Composer);
    }
}
