//! Renders thread and reply bodies (markdown or HTML) into styled lines.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use scraper::{ElementRef, Html};
use std::collections::HashSet;

/// Bodies starting with a tag are treated as HTML from the rich editor.
pub fn looks_like_html(body: &str) -> bool {
    body.trim_start().starts_with('<')
}

pub fn render_content(body: &str, mentions: &HashSet<String>) -> Vec<Line<'static>> {
    let renderer = ContentRenderer::new(mentions);
    if body.trim().is_empty() {
        Vec::new()
    } else if looks_like_html(body) {
        renderer.render_html(body)
    } else {
        renderer.render_markdown(body)
    }
}

fn heading_style(level: usize) -> Style {
    let style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    if level <= 2 {
        style.add_modifier(Modifier::UNDERLINED)
    } else {
        style
    }
}

fn link_style() -> Style {
    Style::new().fg(Color::Blue).add_modifier(Modifier::UNDERLINED)
}

fn code_style() -> Style {
    Style::new().fg(Color::Yellow)
}

fn mention_style() -> Style {
    Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

fn dim_style() -> Style {
    Style::new().fg(Color::DarkGray)
}

struct PendingLink {
    href: String,
    text: String,
}

struct PendingImage {
    src: String,
    alt: String,
}

struct ContentRenderer<'m> {
    mentions: &'m HashSet<String>,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    quote_depth: usize,
    /// `None` for bullet lists, `Some(next number)` for ordered ones.
    lists: Vec<Option<u64>>,
    item_marker: Option<String>,
    in_pre: bool,
    links: Vec<PendingLink>,
    image: Option<PendingImage>,
}

impl<'m> ContentRenderer<'m> {
    fn new(mentions: &'m HashSet<String>) -> Self {
        Self {
            mentions,
            lines: Vec::new(),
            current: Vec::new(),
            styles: Vec::new(),
            quote_depth: 0,
            lists: Vec::new(),
            item_marker: None,
            in_pre: false,
            links: Vec::new(),
            image: None,
        }
    }

    // --- markdown ---

    fn render_markdown(mut self, body: &str) -> Vec<Line<'static>> {
        let parser = Parser::new_ext(body, Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES);
        for event in parser {
            match event {
                Event::Start(tag) => self.start_md_tag(tag),
                Event::End(tag) => self.end_md_tag(tag),
                Event::Text(text) => self.text(&text),
                Event::Code(text) => self.push_span(text.to_string(), self.style().patch(code_style())),
                Event::SoftBreak => self.text(" "),
                Event::HardBreak => self.line_break(),
                Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
                Event::Rule => {
                    self.end_block();
                    self.push_span("────────".to_string(), dim_style());
                    self.end_block();
                }
                _ => {}
            }
        }
        self.finish()
    }

    fn start_md_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                self.styles.push(heading_style(heading_number(level)));
            }
            Tag::BlockQuote { .. } => {
                self.flush();
                self.quote_depth += 1;
            }
            Tag::CodeBlock { .. } => {
                self.flush();
                self.in_pre = true;
                self.styles.push(code_style());
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => self.begin_item(),
            Tag::Emphasis => self.styles.push(Style::new().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.styles.push(Style::new().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => self.styles.push(Style::new().add_modifier(Modifier::CROSSED_OUT)),
            Tag::Link { dest_url, .. } => {
                self.styles.push(link_style());
                self.links.push(PendingLink { href: dest_url.to_string(), text: String::new() });
            }
            Tag::Image { dest_url, .. } => {
                self.image = Some(PendingImage { src: dest_url.to_string(), alt: String::new() });
            }
            _ => {}
        }
    }

    fn end_md_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.end_block(),
            TagEnd::Heading { .. } => {
                self.styles.pop();
                self.end_block();
            }
            TagEnd::BlockQuote { .. } => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.end_block();
            }
            TagEnd::CodeBlock => {
                self.styles.pop();
                self.in_pre = false;
                self.end_block();
            }
            TagEnd::List { .. } => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.end_block();
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            TagEnd::Link => self.end_link(),
            TagEnd::Image => {
                if let Some(image) = self.image.take() {
                    self.push_image(&image.alt, &image.src);
                }
            }
            _ => {}
        }
    }

    // --- html ---

    fn render_html(mut self, body: &str) -> Vec<Line<'static>> {
        let fragment = Html::parse_fragment(body);
        self.walk(fragment.root_element());
        self.finish()
    }

    fn walk(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            if let Some(text) = child.value().as_text() {
                self.html_text(text);
            } else if let Some(child) = ElementRef::wrap(child) {
                self.html_element(child);
            }
        }
    }

    fn html_text(&mut self, text: &str) {
        if self.in_pre {
            self.text(text);
            return;
        }
        let words = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let mut collapsed = String::new();
        if text.starts_with(char::is_whitespace) && !self.current.is_empty() {
            collapsed.push(' ');
        }
        collapsed.push_str(&words);
        if text.ends_with(char::is_whitespace) && !words.is_empty() {
            collapsed.push(' ');
        }
        if !collapsed.is_empty() {
            self.text(&collapsed);
        }
    }

    fn html_element(&mut self, el: ElementRef<'_>) {
        let name = el.value().name();
        match name {
            "p" | "div" => {
                self.walk(el);
                self.end_block();
            }
            "br" => self.line_break(),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse().unwrap_or(1);
                self.flush();
                self.with_style(heading_style(level), el);
                self.end_block();
            }
            "strong" | "b" => self.with_style(Style::new().add_modifier(Modifier::BOLD), el),
            "em" | "i" => self.with_style(Style::new().add_modifier(Modifier::ITALIC), el),
            "u" => self.with_style(Style::new().add_modifier(Modifier::UNDERLINED), el),
            "s" | "strike" | "del" => {
                self.with_style(Style::new().add_modifier(Modifier::CROSSED_OUT), el)
            }
            "code" => self.with_style(code_style(), el),
            "pre" => {
                self.flush();
                self.in_pre = true;
                self.with_style(code_style(), el);
                self.in_pre = false;
                self.end_block();
            }
            "blockquote" => {
                self.flush();
                self.quote_depth += 1;
                self.walk(el);
                self.flush();
                self.quote_depth -= 1;
                self.end_block();
            }
            "ul" | "ol" => {
                self.flush();
                let start = el.value().attr("start").and_then(|s| s.parse().ok()).unwrap_or(1);
                self.lists.push((name == "ol").then_some(start));
                self.walk(el);
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.end_block();
                }
            }
            "li" => {
                self.begin_item();
                self.walk(el);
                self.flush();
            }
            "a" => {
                let href = el.value().attr("href").unwrap_or_default().to_string();
                self.styles.push(link_style());
                self.links.push(PendingLink { href, text: String::new() });
                self.walk(el);
                self.end_link();
            }
            "img" => {
                let alt = el.value().attr("alt").unwrap_or_default();
                let src = el.value().attr("src").unwrap_or_default();
                self.push_image(alt, src);
            }
            "iframe" => {
                let src = el.value().attr("src").unwrap_or_default();
                self.flush();
                self.push_span(format!("[video: {src}]"), link_style());
                self.end_block();
            }
            "sup" => {
                self.push_span("^".to_string(), self.style());
                self.walk(el);
            }
            "sub" => {
                self.push_span("_".to_string(), self.style());
                self.walk(el);
            }
            "span" if el.value().classes().any(|c| c == "mention") => {
                match el.value().attr("data-value") {
                    Some(value) => self.push_span(format!("@{value}"), mention_style()),
                    None => self.walk(el),
                }
            }
            "script" | "style" => {}
            _ => self.walk(el),
        }
    }

    fn with_style(&mut self, style: Style, el: ElementRef<'_>) {
        self.styles.push(style);
        self.walk(el);
        self.styles.pop();
    }

    // --- shared line building ---

    fn style(&self) -> Style {
        self.styles.iter().fold(Style::new(), |acc, s| acc.patch(*s))
    }

    fn begin_item(&mut self) {
        self.flush();
        let marker = match self.lists.last_mut() {
            Some(Some(n)) => {
                let marker = format!("{n}. ");
                *n += 1;
                marker
            }
            _ => "• ".to_string(),
        };
        self.item_marker = Some(marker);
    }

    fn start_line(&mut self) {
        if self.quote_depth > 0 {
            self.current.push(Span::styled("│ ".repeat(self.quote_depth), dim_style()));
        }
        let indent = self.lists.len().saturating_sub(1);
        if indent > 0 {
            self.current.push(Span::raw("  ".repeat(indent)));
        }
        if let Some(marker) = self.item_marker.take() {
            self.current.push(Span::styled(marker, Style::new().fg(Color::Gray)));
        }
    }

    fn push_span(&mut self, content: String, style: Style) {
        if content.is_empty() {
            return;
        }
        if let Some(link) = self.links.last_mut() {
            link.text.push_str(&content);
        }
        if self.current.is_empty() {
            self.start_line();
        }
        self.current.push(Span::styled(content, style));
    }

    fn text(&mut self, text: &str) {
        if let Some(image) = &mut self.image {
            image.alt.push_str(text);
            return;
        }
        if self.in_pre {
            for (i, part) in text.split('\n').enumerate() {
                if i > 0 {
                    self.line_break();
                }
                self.push_span(part.to_string(), self.style());
            }
            return;
        }
        let style = self.style();
        for (part, is_mention) in split_mentions(text, self.mentions) {
            let style = if is_mention { style.patch(mention_style()) } else { style };
            self.push_span(part.to_string(), style);
        }
    }

    fn end_link(&mut self) {
        self.styles.pop();
        if let Some(link) = self.links.pop() {
            if !link.href.is_empty() && link.text.trim() != link.href {
                self.push_span(format!(" ({})", link.href), dim_style());
            }
        }
    }

    fn push_image(&mut self, alt: &str, src: &str) {
        let label = if alt.trim().is_empty() { src } else { alt };
        self.push_span(format!("[image: {label}]"), link_style());
    }

    /// Ends the current line, keeping it even when empty.
    fn line_break(&mut self) {
        if self.current.is_empty() {
            self.start_line();
        }
        self.lines.push(Line::from(std::mem::take(&mut self.current)));
    }

    /// Ends the current line if it has content.
    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
        }
    }

    /// Ends a block: flushes and separates it from the next one.
    fn end_block(&mut self) {
        self.flush();
        if self.lists.is_empty() && self.lines.last().is_some_and(|l| !l.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

fn heading_number(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Splits `text` around `@hash` tokens naming a known author.
fn split_mentions<'t>(text: &'t str, known: &HashSet<String>) -> Vec<(&'t str, bool)> {
    let mut parts = Vec::new();
    let mut last = 0;
    for (idx, _) in text.match_indices('@') {
        if idx < last {
            continue;
        }
        let rest = &text[idx + 1..];
        let hit = known
            .iter()
            .filter(|h| {
                !h.is_empty()
                    && rest.starts_with(h.as_str())
                    && !rest[h.len()..].starts_with(|c: char| c.is_alphanumeric() || c == '_')
            })
            .map(String::len)
            .max();
        if let Some(len) = hit {
            if idx > last {
                parts.push((&text[last..idx], false));
            }
            parts.push((&text[idx..idx + 1 + len], true));
            last = idx + 1 + len;
        }
    }
    if last < text.len() {
        parts.push((&text[last..], false));
    }
    parts
}
