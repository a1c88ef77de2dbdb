//! Popups: notifications, thread actions menu, raw reply view, mentions, quit.

use crate::app::App;
use crate::state::ThreadMenuItem;
use crate::state::notification::Notification;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

pub fn draw_centered_rect(r: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let popup_layout = Layout::default().direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2), Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ]).split(r);
    Layout::default().direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2), Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ]).split(popup_layout[1])[1]
}

/// A `width` x `height` rect centered in `r`, shrunk to fit.
fn centered_fixed(r: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect::new(r.x + (r.width - width) / 2, r.y + (r.height - height) / 2, width, height)
}

fn selected_style() -> Style {
    Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD)
}

pub fn draw_notification_popup(f: &mut Frame, notification: &Notification) {
    let area = draw_centered_rect(f.area(), 50, 20);
    let color = if notification.is_error { Color::Red } else { Color::Green };
    let block = Block::default()
        .title(Span::styled(
            notification.title.as_str(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(color));
    let popup_height = area.height.saturating_sub(2);
    let lines: Vec<&str> = notification.message.lines().collect();
    let text_lines = lines.len() as u16;
    let pad_top = (popup_height.saturating_sub(text_lines)) / 2;
    let mut content = Vec::new();
    for _ in 0..pad_top { content.push(Line::raw("")); }
    for l in lines.iter() { content.push(Line::from(*l)); }
    let p = Paragraph::new(content).wrap(Wrap { trim: true }).block(block).alignment(Alignment::Center);
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}

/// Thread actions, grouped by section: Recover, then Storage.
pub fn draw_thread_menu_popup(f: &mut Frame, app: &App) {
    let selected = app.ui.thread_menu_state.selected();
    let mut lines = vec![];
    let mut section = "";
    for (i, item) in ThreadMenuItem::ALL.iter().enumerate() {
        if item.section() != section {
            section = item.section();
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled(section, Style::default().fg(Color::DarkGray))));
        }
        let style = if selected == Some(i) {
            selected_style()
        } else if *item == ThreadMenuItem::TogglePin || *item == ThreadMenuItem::SaveLocally {
            Style::default().fg(Color::LightGreen)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(format!(" {} ", item.label(app.ui.is_pinned)), style)));
    }
    let width = lines.iter().map(|l| l.width() as u16).max().unwrap_or(0) + 2;
    let area = centered_fixed(f.area(), width.max(24), lines.len() as u16 + 2);
    let block = Block::default()
        .title(Span::styled("Thread", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL);
    let para = Paragraph::new(lines).block(block).alignment(Alignment::Left);
    f.render_widget(Clear, area);
    f.render_widget(para, area);
}

/// "View Raw Content": the unrendered body of a reply.
pub fn draw_raw_content_popup(f: &mut Frame, app: &App, index: usize) {
    let Some(reply) = app.thread.thread().and_then(|t| t.replies.get(index)) else {
        return;
    };
    let area = draw_centered_rect(f.area(), 70, 60);
    let block = Block::default()
        .title(Line::from(vec![
            Span::raw("Raw content of "),
            Span::styled(reply.hash.as_str(), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        ]))
        .title_bottom(Line::from(" any key to close ").alignment(Alignment::Right))
        .borders(Borders::ALL)
        .border_type(BorderType::Double);
    let p = Paragraph::new(reply.text.as_str()).wrap(Wrap { trim: false }).block(block);
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}

/// Mention suggestions, opened just above the composer cursor when it fits.
pub fn draw_mention_popup(f: &mut Frame, app: &App, cursor: Position) {
    let popup = &app.composer.mentions;
    if popup.suggestions.is_empty() {
        return;
    }
    let screen = f.area();
    let height = (popup.suggestions.len() as u16 + 2).min(screen.height);
    let width = popup
        .suggestions
        .iter()
        .map(|s| s.chars().count() as u16 + 4)
        .max()
        .unwrap_or(0)
        .clamp(12, screen.width);
    let y = if cursor.y >= height { cursor.y - height } else { cursor.y + 1 };
    let x = cursor.x.min(screen.width.saturating_sub(width));
    let area = Rect::new(x, y, width, height).intersection(screen);

    let lines: Vec<Line> = popup
        .suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let style = if i == popup.selected { selected_style() } else { Style::default() };
            Line::from(Span::styled(format!(" {s} "), style))
        })
        .collect();
    let block = Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan));
    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

pub fn draw_quit_confirm_popup(f: &mut Frame, app: &App) {
    // Grow the popup until the message and buttons fit
    let mut percent_y = 18u16;
    let percent_x = 40u16;
    let content_lines = 5;
    let mut area = draw_centered_rect(f.area(), percent_x, percent_y);
    let mut popup_height = area.height.saturating_sub(2);
    while popup_height < content_lines && percent_y < 60 {
        percent_y += 5;
        area = draw_centered_rect(f.area(), percent_x, percent_y);
        popup_height = area.height.saturating_sub(2);
    }
    let block = Block::default()
        .title("Are you sure?")
        .borders(Borders::ALL)
        .border_type(BorderType::Double);
    let pad_top = popup_height.saturating_sub(content_lines) / 2;
    let mut lines = Vec::new();
    for _ in 0..pad_top + 1 { lines.push(Line::from("")); }
    lines.push(Line::from(Span::styled(
        "Do you really want to quit?",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    if !app.composer.buffer().trim().is_empty() {
        lines.push(Line::from(Span::styled("Your unsent reply will be lost.", Style::default().fg(Color::Yellow))));
    } else {
        lines.push(Line::from(""));
    }
    let yes_style = if app.ui.quit_confirm_selected == 0 {
        Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green)
    };
    let no_style = if app.ui.quit_confirm_selected == 1 {
        Style::default().fg(Color::Black).bg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Red)
    };
    lines.push(Line::from(vec![
        Span::styled("[ Yes ]", yes_style),
        Span::raw("  "),
        Span::styled("[ No ]", no_style),
    ]));
    let para = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, area);
    f.render_widget(para, area);
}
