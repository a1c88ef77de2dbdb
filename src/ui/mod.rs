//! Main UI module. Re-exports submodules and provides the main entry point.

pub mod colorize;
pub mod composer;
pub mod content;
pub mod popups;
pub mod thread;
pub mod time_format;

use crate::app::App;
use crate::model::ThreadResponse;
use crate::state::Focus;
use crate::ui::composer::draw_composer;
use crate::ui::popups::{
    draw_mention_popup, draw_notification_popup, draw_quit_confirm_popup, draw_raw_content_popup,
    draw_thread_menu_popup,
};
use crate::ui::thread::{alert_height, draw_alerts, draw_header, draw_thread_view};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
};

pub fn ui(f: &mut Frame, app: &mut App) {
    let size = f.area();
    let show_composer = matches!(app.thread.data, Some(ThreadResponse::Ok(_)));
    let chunks = Layout::default()
        .constraints([
            Constraint::Length(3),                                       // Header
            Constraint::Length(alert_height(app)),                       // Alerts
            Constraint::Min(0),                                          // Thread
            Constraint::Length(if show_composer { 10 } else { 0 }),     // Reply form
            Constraint::Length(3),                                       // Footer
        ])
        .split(size);

    draw_header(f, app, chunks[0]);
    draw_alerts(f, app, chunks[1]);
    draw_thread_view(f, app, chunks[2]);
    let cursor = if show_composer { draw_composer(f, app, chunks[3]) } else { None };

    let help_text = match app.ui.focus {
        Focus::Thread => "[↑↓/jk] Select reply | [Space] Collapse | [v] Raw | [m] Menu\n[r] Reply | [c] Colors | [PgUp/PgDn] Scroll | [F5] Reload | [q] Quit",
        Focus::Composer => "[^S] Submit | [^E] Switch editor | [^P/Tab] Preview\n[@] Mention | [Esc] Back to thread",
    };
    let status_text = match app.thread.thread() {
        Some(thread) => format!(
            "Thread #{} | {} replies | {} pinned",
            app.thread_id,
            thread.replies.len(),
            app.pins.pins().len()
        ),
        None if app.thread.in_flight => format!("Thread #{} | loading...", app.thread_id),
        None => format!("Thread #{}", app.thread_id),
    };

    // Split footer into two sections: help text and status
    let footer_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(status_text.len() as u16 + 4)])
        .split(chunks[4]);
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL ^ Borders::RIGHT));
    let status = Paragraph::new(status_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, footer_chunks[0]);
    f.render_widget(status, footer_chunks[1]);

    if let Some(position) = cursor {
        f.set_cursor_position(position);
        if app.composer.has_mention_suggestions() {
            draw_mention_popup(f, app, position);
        }
    }
    if app.ui.show_thread_menu {
        draw_thread_menu_popup(f, app);
    }
    if let Some(index) = app.ui.raw_view_reply {
        draw_raw_content_popup(f, app, index);
    }
    if let Some(notification) = &app.notifications.current_notification {
        draw_notification_popup(f, notification);
    }
    if app.ui.show_quit_confirm {
        draw_quit_confirm_popup(f, app);
    }
}
