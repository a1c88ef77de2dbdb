use crate::app::App;
use crate::state::{ComposerTab, EditorMode, Focus, RichControl};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle reply composer input
pub fn handle_composer_input(key: KeyEvent, app: &mut App) {
    if handle_form_shortcuts(key, app) {
        return;
    }
    if app.composer.has_mention_suggestions() && handle_mention_input(key, app) {
        return;
    }
    if app.composer.tab == ComposerTab::Preview {
        if key.code == KeyCode::Tab {
            app.composer.toggle_tab();
        }
        return;
    }
    if app.composer.mode == EditorMode::Rich {
        if let Some(control) = rich_control_for(key) {
            app.composer.apply_rich_control(control);
            app.update_mention_suggestions();
            return;
        }
    }

    match key.code {
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            app.composer.insert_char(c);
        }
        KeyCode::Enter => app.composer.insert_char('\n'),
        KeyCode::Backspace => app.composer.backspace(),
        KeyCode::Left => app.composer.move_left(),
        KeyCode::Right => app.composer.move_right(),
        KeyCode::Home => app.composer.move_home(),
        KeyCode::End => app.composer.move_end(),
        KeyCode::Tab => {
            app.composer.toggle_tab();
            return;
        }
        _ => return,
    }
    app.update_mention_suggestions();
}

/// Submit, editor switch, tab switch and leaving the form.
fn handle_form_shortcuts(key: KeyEvent, app: &mut App) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('s') if ctrl => app.submit_reply(),
        KeyCode::Char('e') if ctrl => app.toggle_editor_mode(),
        KeyCode::Char('p') if ctrl => app.composer.toggle_tab(),
        KeyCode::Esc if !app.composer.has_mention_suggestions() => {
            app.ui.set_focus(Focus::Thread);
        }
        _ => return false,
    }
    true
}

fn handle_mention_input(key: KeyEvent, app: &mut App) -> bool {
    match key.code {
        KeyCode::Up => app.composer.move_mention_selection(-1),
        KeyCode::Down => app.composer.move_mention_selection(1),
        KeyCode::Tab | KeyCode::Enter => app.apply_selected_mention(),
        KeyCode::Esc => app.composer.dismiss_mentions(),
        _ => return false,
    }
    true
}

/// Toolbar chords of the rich editor.
fn rich_control_for(key: KeyEvent) -> Option<RichControl> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let KeyCode::Char(c) = key.code else {
        return None;
    };
    let control = match (ctrl, alt, c.to_ascii_lowercase()) {
        (true, false, 'b') => RichControl::Bold,
        (true, false, 'i') => RichControl::Italic,
        (true, false, 'u') => RichControl::Underline,
        (true, false, 'l') => RichControl::Clean,
        (false, true, d @ '1'..='6') => RichControl::Heading(d as u8 - b'0'),
        (false, true, 'u') => RichControl::UnorderedList,
        (false, true, 'o') => RichControl::OrderedList,
        (false, true, 'k') => RichControl::Link,
        (false, true, 'v') => RichControl::Video,
        (false, true, 'i') => RichControl::Image,
        (false, true, 'q') => RichControl::Blockquote,
        (false, true, 'c') => RichControl::Code,
        (false, true, 'p') => RichControl::CodeBlock,
        (false, true, '.') => RichControl::Sup,
        (false, true, ',') => RichControl::Sub,
        _ => return None,
    };
    Some(control)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{harness, sample_thread};
    use crate::model::ThreadResponse;
    use crate::services::ApiCommand;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_composer_input(press(KeyCode::Char(c)), app);
        }
    }

    #[test]
    fn typing_and_submitting() {
        let mut h = harness();
        h.app.ui.set_focus(Focus::Composer);
        type_str(&mut h.app, "hello");
        handle_composer_input(press(KeyCode::Enter), &mut h.app);
        type_str(&mut h.app, "world");
        handle_composer_input(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL), &mut h.app);
        assert_eq!(
            h.commands.try_recv().unwrap(),
            ApiCommand::PostReply { id: 42, text: "hello\nworld".into() }
        );
        // read-only while the post is in flight
        type_str(&mut h.app, "x");
        assert_eq!(h.app.composer.buffer(), "hello\nworld");
    }

    #[test]
    fn mention_popup_takes_enter() {
        let mut h = harness();
        h.app.thread.apply_response(ThreadResponse::Ok(sample_thread()));
        type_str(&mut h.app, "@al");
        assert_eq!(h.app.composer.mentions.suggestions, vec!["Alice"]);
        handle_composer_input(press(KeyCode::Enter), &mut h.app);
        assert_eq!(h.app.composer.buffer(), "@Alice ");
        // with the popup closed, Enter is a newline again
        handle_composer_input(press(KeyCode::Enter), &mut h.app);
        assert_eq!(h.app.composer.buffer(), "@Alice \n");
    }

    #[test]
    fn esc_closes_mentions_before_leaving() {
        let mut h = harness();
        h.app.ui.set_focus(Focus::Composer);
        h.app.thread.apply_response(ThreadResponse::Ok(sample_thread()));
        type_str(&mut h.app, "@");
        assert_eq!(h.app.composer.mentions.suggestions, vec!["Bob", "Alice"]);
        handle_composer_input(press(KeyCode::Esc), &mut h.app);
        assert!(!h.app.composer.has_mention_suggestions());
        assert_eq!(h.app.ui.focus, Focus::Composer);
        handle_composer_input(press(KeyCode::Esc), &mut h.app);
        assert_eq!(h.app.ui.focus, Focus::Thread);
    }

    #[test]
    fn rich_chords_insert_markup() {
        let mut h = harness();
        h.app.composer = crate::state::ComposerState::new(EditorMode::Rich);
        handle_composer_input(KeyEvent::new(KeyCode::Char('2'), KeyModifiers::ALT), &mut h.app);
        type_str(&mut h.app, "Hi");
        assert_eq!(h.app.composer.buffer(), "<h2>Hi</h2>");
        assert_eq!(h.app.composer.content(), "<h2>Hi</h2>");
    }

    #[test]
    fn preview_tab_ignores_typing() {
        let mut h = harness();
        handle_composer_input(press(KeyCode::Tab), &mut h.app);
        assert_eq!(h.app.composer.tab, ComposerTab::Preview);
        type_str(&mut h.app, "abc");
        assert_eq!(h.app.composer.buffer(), "");
        handle_composer_input(press(KeyCode::Tab), &mut h.app);
        assert_eq!(h.app.composer.tab, ComposerTab::Editor);
    }
}
