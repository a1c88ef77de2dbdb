//! Reply form: editor/preview tabs, submit and editor-switch buttons.

use crate::app::App;
use crate::state::{ComposerTab, EditorMode, Focus};
use crate::ui::content::render_content;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
};

const RICH_HINT: &str = "^B ^I ^U bold/italic/underline  ^L clean  Alt+1-6 heading  Alt+U/O list  Alt+K link  Alt+I image  Alt+V video  Alt+Q quote  Alt+C/P code";

/// Draws the form and returns where the text cursor sits, if visible.
pub fn draw_composer(f: &mut Frame, app: &App, area: Rect) -> Option<Position> {
    let composer = &app.composer;
    let focused = app.ui.focus == Focus::Composer;
    let border_style = if focused { Style::default().fg(Color::Cyan) } else { Style::default() };
    let title = Line::from(vec![
        Span::raw(format!(" {} ", composer.mode.field_label())),
        Span::styled("* ", Style::default().fg(Color::Red)),
    ]);
    let block = Block::default().title(title).borders(Borders::ALL).border_style(border_style);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let show_hint = composer.mode == EditorMode::Rich && composer.tab == ComposerTab::Editor;
    let [tabs_area, body_area, hint_area, buttons_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(if show_hint { 1 } else { 0 }),
        Constraint::Length(1),
    ])
    .areas(inner);

    let selected_tab = match composer.tab {
        ComposerTab::Editor => 0,
        ComposerTab::Preview => 1,
    };
    let tabs = Tabs::new(vec!["Editor", "Preview"])
        .select(selected_tab)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .divider("|");
    f.render_widget(tabs, tabs_area);

    let cursor = match composer.tab {
        ComposerTab::Editor => draw_editor(f, app, body_area),
        ComposerTab::Preview => {
            let lines = render_content(&composer.content(), &app.known_authors());
            f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), body_area);
            None
        }
    };

    if show_hint {
        f.render_widget(
            Paragraph::new(Span::styled(RICH_HINT, Style::default().fg(Color::DarkGray))),
            hint_area,
        );
    }
    draw_buttons(f, app, buttons_area);

    if focused { cursor } else { None }
}

fn draw_editor(f: &mut Frame, app: &App, area: Rect) -> Option<Position> {
    let composer = &app.composer;
    let before = composer.text_before_cursor();
    let row = before.matches('\n').count() as u16;
    let col = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) as u16;

    // Keep the cursor row on screen
    let scroll = row.saturating_sub(area.height.saturating_sub(1));
    let style = if composer.is_read_only() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    let text = if composer.buffer().is_empty() {
        Paragraph::new(Span::styled("Write a reply... (@ to mention)", Style::default().fg(Color::DarkGray)))
    } else {
        Paragraph::new(composer.buffer()).style(style).scroll((scroll, 0))
    };
    f.render_widget(text, area);

    if composer.is_read_only() || area.width == 0 || area.height == 0 {
        return None;
    }
    let x = area.x + col.min(area.width - 1);
    let y = area.y + row - scroll;
    Some(Position::new(x, y))
}

fn draw_buttons(f: &mut Frame, app: &App, area: Rect) {
    let composer = &app.composer;
    let submit = if composer.loading {
        Span::styled(" Submitting... ", Style::default().fg(Color::Black).bg(Color::DarkGray))
    } else {
        Span::styled(
            " Submit [^S] ",
            Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD),
        )
    };
    let line = Line::from(vec![
        submit,
        Span::raw("  "),
        Span::styled(
            format!(" {} [^E] ", composer.mode.switch_label()),
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        ),
        Span::raw("  "),
        Span::styled("[^P] preview", Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}
