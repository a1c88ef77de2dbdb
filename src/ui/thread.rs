//! Thread header, alerts and the scrollable body with reply cards.

use crate::app::App;
use crate::global_prefs::global_prefs;
use crate::model::{Reply, Thread, ThreadResponse};
use crate::state::{Focus, ThreadState};
use crate::ui::colorize::colorize_string;
use crate::ui::content::render_content;
use crate::ui::time_format::{format_date_delimiter, format_relative};
use chrono::{DateTime, Utc};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
};
use std::collections::HashSet;

pub const FETCH_ERROR_TEXT: &str = "There was a problem fetching data, trying again...";
pub const NO_REPLIES_TEXT: &str = "No replies. Be first to reply!";

/// Height of the alert strip for the current state; zero when there is none.
pub fn alert_height(app: &App) -> u16 {
    let mut height = 0;
    if app.thread.fetch_error.is_some() {
        height += 3;
    }
    if let Some(ThreadResponse::Err(_)) = &app.thread.data {
        height += 4;
    }
    height
}

pub fn draw_alerts(f: &mut Frame, app: &App, mut area: Rect) {
    let red = Style::default().fg(Color::Red);
    if app.thread.fetch_error.is_some() {
        let rect = Rect { height: 3.min(area.height), ..area };
        let alert = Paragraph::new(FETCH_ERROR_TEXT)
            .style(red)
            .block(Block::default().borders(Borders::ALL).border_style(red));
        f.render_widget(alert, rect);
        area.y += rect.height;
        area.height -= rect.height;
    }
    if let Some(ThreadResponse::Err(message)) = &app.thread.data {
        let alert = Paragraph::new(message.as_str())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(Span::styled("Error", red.add_modifier(Modifier::BOLD)))
                    .borders(Borders::ALL)
                    .border_style(red),
            );
        f.render_widget(alert, area);
    }
}

pub fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).border_type(BorderType::Rounded);
    let Some(thread) = app.thread.thread() else {
        let title = if app.thread.is_loading() { "Loading thread..." } else { "" };
        let p = Paragraph::new(Span::styled(title, Style::default().fg(Color::DarkGray))).block(block);
        f.render_widget(p, area);
        return;
    };
    let mut spans = vec![
        Span::styled(thread.title.as_str(), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(
            format!(" {} ", thread.hash),
            Style::default().fg(Color::Black).bg(Color::Gray),
        ),
        Span::styled(
            format!("  {}", format_date_delimiter(&thread.created)),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if app.last_visit.as_deref().is_some_and(|seen| seen != thread.modified) {
        spans.push(Span::styled("  [updated since last visit]", Style::default().fg(Color::Yellow)));
    }
    if app.ui.is_pinned {
        spans.push(Span::styled("  [pinned]", Style::default().fg(Color::LightGreen)));
    }
    let p = Paragraph::new(Line::from(spans)).block(block.title_bottom(
        Line::from(Span::styled(" [m] actions ", Style::default().fg(Color::DarkGray))).right_aligned(),
    ));
    f.render_widget(p, area);
}

/// Draws the thread body and replies, and records where each reply starts.
pub fn draw_thread_view(f: &mut Frame, app: &mut App, area: Rect) {
    let border_style = if app.ui.focus == Focus::Thread {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default().borders(Borders::ALL).border_style(border_style);
    let inner_width = block.inner(area).width;

    let (lines, offsets) = match app.thread.thread() {
        Some(thread) => {
            let view = ThreadView {
                thread,
                mentions: app.known_authors(),
                state: &app.thread,
                colorize: global_prefs().colorize_replies,
                now: Utc::now(),
            };
            view.build(inner_width)
        }
        None if app.thread.is_loading() => (skeleton_lines(), Vec::new()),
        None => (Vec::new(), Vec::new()),
    };
    app.thread.reply_offsets = offsets;

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((app.thread.scroll, 0))
        .block(block);
    f.render_widget(p, area);
}

fn skeleton_lines() -> Vec<Line<'static>> {
    let gray = Style::default().fg(Color::DarkGray);
    [40, 60, 55, 0, 20, 50, 45, 0, 20, 35]
        .iter()
        .map(|w| Line::from(Span::styled("░".repeat(*w), gray)))
        .collect()
}

struct ThreadView<'a> {
    thread: &'a Thread,
    mentions: HashSet<String>,
    state: &'a ThreadState,
    colorize: bool,
    now: DateTime<Utc>,
}

impl ThreadView<'_> {
    /// Returns the lines and, per reply, the wrapped row its header lands on.
    fn build(&self, width: u16) -> (Vec<Line<'static>>, Vec<u16>) {
        let mut lines = render_content(&self.thread.text, &self.mentions);
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("── Replies ({}) ──", self.thread.replies.len()),
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::default());

        if self.thread.replies.is_empty() {
            lines.push(Line::from(Span::styled(NO_REPLIES_TEXT, Style::default().fg(Color::Gray))));
            return (lines, Vec::new());
        }

        let mut offsets = Vec::with_capacity(self.thread.replies.len());
        let mut row = wrapped_rows(&lines, width);
        for (i, reply) in self.thread.replies.iter().enumerate() {
            offsets.push(row);
            let card = self.reply_card(i, reply);
            row = row.saturating_add(wrapped_rows(&card, width));
            lines.extend(card);
        }
        (lines, offsets)
    }

    fn reply_card(&self, index: usize, reply: &Reply) -> Vec<Line<'static>> {
        let selected = self.state.selected_reply == Some(index);
        let collapsed = self.state.is_collapsed(index);
        let gutter = if selected {
            Span::styled("▌ ", Style::default().fg(Color::Cyan))
        } else {
            Span::raw("  ")
        };

        let hash_style = if self.colorize {
            Style::default().fg(colorize_string(&reply.hash, global_prefs().color_scheme))
        } else {
            Style::default()
        };
        let mut header = vec![
            gutter.clone(),
            Span::styled(if collapsed { "▸ " } else { "▾ " }, Style::default().fg(Color::Gray)),
            Span::styled(reply.hash.clone(), hash_style.add_modifier(Modifier::BOLD)),
        ];
        if let Some(created) = &reply.created {
            header.push(Span::styled(
                format!(" · {}", format_relative(created, self.now)),
                Style::default().fg(Color::DarkGray),
            ));
            if selected {
                header.push(Span::styled(format!("  ({created})"), Style::default().fg(Color::DarkGray)));
            }
        }
        let mut card = vec![Line::from(header)];
        if !collapsed {
            for line in render_content(&reply.text, &self.mentions) {
                let mut spans = vec![gutter.clone(), Span::raw("  ")];
                spans.extend(line.spans);
                card.push(Line::from(spans));
            }
        }
        card.push(Line::default());
        card
    }
}

fn wrapped_rows(lines: &[Line<'static>], width: u16) -> u16 {
    if width == 0 {
        return 0;
    }
    let count = Paragraph::new(lines.to_vec()).wrap(Wrap { trim: false }).line_count(width);
    count.min(u16::MAX as usize) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::{harness, sample_thread};
    use ratatui::{Terminal, backend::TestBackend};

    fn screen(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| {
                let area = f.area();
                draw_thread_view(f, app, area);
            })
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render(draw: impl FnOnce(&mut Frame)) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        terminal.draw(draw).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn header_marks_threads_changed_since_last_visit() {
        let mut h = harness();
        h.app.thread.apply_response(ThreadResponse::Ok(sample_thread()));
        h.app.last_visit = Some("2024-01-01T00:00:00Z".into());
        let out = render(|f| draw_header(f, &h.app, Rect::new(0, 0, 80, 3)));
        assert!(out.contains("Rust TUI"));
        assert!(out.contains("[updated since last visit]"));

        h.app.last_visit = Some("2024-01-02T00:00:00Z".into());
        let out = render(|f| draw_header(f, &h.app, Rect::new(0, 0, 80, 3)));
        assert!(!out.contains("[updated since last visit]"));

        h.app.last_visit = None;
        let out = render(|f| draw_header(f, &h.app, Rect::new(0, 0, 80, 3)));
        assert!(!out.contains("[updated since last visit]"));
    }

    #[test]
    fn fetch_failure_shows_retry_alert() {
        let mut h = harness();
        h.app.thread.fetch_error = Some("connection refused".into());
        assert_eq!(alert_height(&h.app), 3);
        let out = render(|f| draw_alerts(f, &h.app, Rect::new(0, 0, 80, 3)));
        assert!(out.contains(FETCH_ERROR_TEXT));
    }

    #[test]
    fn server_error_shows_error_alert() {
        let mut h = harness();
        h.app.thread.apply_response(ThreadResponse::Err("Thread not found".into()));
        assert_eq!(alert_height(&h.app), 4);
        let out = render(|f| draw_alerts(f, &h.app, Rect::new(0, 0, 80, 4)));
        assert!(out.contains("Error"));
        assert!(out.contains("Thread not found"));
        assert!(!out.contains(FETCH_ERROR_TEXT));
    }

    #[test]
    fn empty_thread_invites_a_reply() {
        let mut h = harness();
        let mut thread = sample_thread();
        thread.replies.clear();
        h.app.thread.apply_response(ThreadResponse::Ok(thread));
        let out = screen(&mut h.app, 50, 12);
        assert!(out.contains(NO_REPLIES_TEXT));
        assert!(h.app.thread.reply_offsets.is_empty());
    }

    #[test]
    fn collapsed_reply_hides_body() {
        let mut h = harness();
        h.app.thread.apply_response(ThreadResponse::Ok(sample_thread()));
        let out = screen(&mut h.app, 50, 20);
        assert!(out.contains("▾ Alice"));
        assert!(out.contains("first"));

        h.app.thread.toggle_collapsed(0);
        let out = screen(&mut h.app, 50, 20);
        assert!(out.contains("▸ Alice"));
        assert!(!out.contains("first"));
        assert!(out.contains("second"));
    }

    #[test]
    fn reply_offsets_follow_wrapping() {
        let mut h = harness();
        h.app.thread.apply_response(ThreadResponse::Ok(sample_thread()));
        screen(&mut h.app, 50, 20);
        // body, blank, separator, blank
        assert_eq!(h.app.thread.reply_offsets, vec![4, 7]);
    }

    #[test]
    fn selected_reply_shows_raw_timestamp() {
        let mut h = harness();
        h.app.thread.apply_response(ThreadResponse::Ok(sample_thread()));
        h.app.thread.selected_reply = Some(0);
        let out = screen(&mut h.app, 80, 20);
        assert!(out.contains("(2024-01-01T01:00:00Z)"));
    }

    #[test]
    fn skeleton_while_loading() {
        let mut h = harness();
        let out = screen(&mut h.app, 50, 12);
        assert!(out.contains("░░░"));
    }
}
