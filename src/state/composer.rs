use crate::services::mention::MentionQuery;
use crate::services::reply::{self, EMPTY_RICH_CONTENT};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    Plain,
    #[default]
    Rich,
}

impl EditorMode {
    pub fn toggled(self) -> Self {
        match self {
            EditorMode::Plain => EditorMode::Rich,
            EditorMode::Rich => EditorMode::Plain,
        }
    }

    pub fn field_label(self) -> &'static str {
        match self {
            EditorMode::Rich => "Content",
            EditorMode::Plain => "Content (markdown is supported)",
        }
    }

    /// Label of the button that switches away from this mode.
    pub fn switch_label(self) -> &'static str {
        match self {
            EditorMode::Plain => "Use Rich Editor",
            EditorMode::Rich => "Use Simple Editor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerTab {
    Editor,
    Preview,
}

/// Rich editor toolbar controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RichControl {
    Bold,
    Italic,
    Underline,
    Clean,
    Heading(u8),
    UnorderedList,
    OrderedList,
    Link,
    Video,
    Image,
    Blockquote,
    Code,
    CodeBlock,
    Sup,
    Sub,
}

impl RichControl {
    /// Opening and closing markup; the cursor lands between them.
    pub fn markup(self) -> Option<(String, &'static str)> {
        let pair = match self {
            RichControl::Bold => ("<strong>".to_string(), "</strong>"),
            RichControl::Italic => ("<em>".to_string(), "</em>"),
            RichControl::Underline => ("<u>".to_string(), "</u>"),
            RichControl::Heading(level) => {
                let level = level.clamp(1, 6);
                let close = ["</h1>", "</h2>", "</h3>", "</h4>", "</h5>", "</h6>"];
                (format!("<h{level}>"), close[level as usize - 1])
            }
            RichControl::UnorderedList => ("<ul><li>".to_string(), "</li></ul>"),
            RichControl::OrderedList => ("<ol><li>".to_string(), "</li></ol>"),
            RichControl::Link => ("<a href=\"".to_string(), "\"></a>"),
            RichControl::Video => ("<iframe src=\"".to_string(), "\"></iframe>"),
            RichControl::Image => ("<img src=\"".to_string(), "\">"),
            RichControl::Blockquote => ("<blockquote>".to_string(), "</blockquote>"),
            RichControl::Code => ("<code>".to_string(), "</code>"),
            RichControl::CodeBlock => ("<pre>".to_string(), "</pre>"),
            RichControl::Sup => ("<sup>".to_string(), "</sup>"),
            RichControl::Sub => ("<sub>".to_string(), "</sub>"),
            RichControl::Clean => return None,
        };
        Some(pair)
    }
}

/// Mention popup state while an `@` query is active.
#[derive(Debug, Clone, Default)]
pub struct MentionPopup {
    pub query: Option<MentionQuery>,
    pub suggestions: Vec<String>,
    pub selected: usize,
}

/// Reply form: text buffer with a byte cursor, editor mode and submit flag.
pub struct ComposerState {
    buffer: String,
    cursor: usize,
    pub mode: EditorMode,
    pub tab: ComposerTab,
    pub loading: bool,
    pub mentions: MentionPopup,
}

impl ComposerState {
    pub fn new(mode: EditorMode) -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            mode,
            tab: ComposerTab::Editor,
            loading: false,
            mentions: MentionPopup::default(),
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn text_before_cursor(&self) -> &str {
        &self.buffer[..self.cursor]
    }

    /// The value submitted to the server for the current mode.
    pub fn content(&self) -> String {
        match self.mode {
            EditorMode::Plain => self.buffer.clone(),
            EditorMode::Rich => reply::to_rich_html(&self.buffer),
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.loading
    }

    pub fn insert_char(&mut self, c: char) {
        if self.is_read_only() {
            return;
        }
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        if self.is_read_only() {
            return;
        }
        self.buffer.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    pub fn backspace(&mut self) {
        if self.is_read_only() || self.cursor == 0 {
            return;
        }
        let prev = self.prev_boundary();
        self.buffer.replace_range(prev..self.cursor, "");
        self.cursor = prev;
    }

    pub fn move_left(&mut self) {
        self.cursor = self.prev_boundary();
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.buffer[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = self.text_before_cursor().rfind('\n').map_or(0, |i| i + 1);
    }

    pub fn move_end(&mut self) {
        self.cursor = self.buffer[self.cursor..]
            .find('\n')
            .map_or(self.buffer.len(), |i| self.cursor + i);
    }

    fn prev_boundary(&self) -> usize {
        self.text_before_cursor()
            .char_indices()
            .next_back()
            .map_or(0, |(i, _)| i)
    }

    /// Replaces `start..cursor` with `replacement`.
    pub fn replace_before_cursor(&mut self, start: usize, replacement: &str) {
        if self.is_read_only() || start > self.cursor {
            return;
        }
        self.buffer.replace_range(start..self.cursor, replacement);
        self.cursor = start + replacement.len();
    }

    pub fn apply_rich_control(&mut self, control: RichControl) {
        if self.is_read_only() || self.mode != EditorMode::Rich {
            return;
        }
        match control.markup() {
            Some((open, close)) => {
                self.insert_str(&open);
                let cursor = self.cursor;
                self.insert_str(close);
                self.cursor = cursor;
            }
            None => {
                self.buffer = reply::strip_tags(&self.buffer);
                self.cursor = self.buffer.len();
            }
        }
    }

    /// Switches editor mode. Leaving the rich editor with nothing typed
    /// clears the form instead of carrying the empty placeholder over.
    /// Does nothing while a submission is in flight.
    pub fn toggle_mode(&mut self) -> EditorMode {
        if self.is_read_only() {
            return self.mode;
        }
        if self.mode == EditorMode::Rich {
            let content = self.content();
            if content == EMPTY_RICH_CONTENT {
                self.buffer.clear();
            } else {
                self.buffer = content;
            }
            self.cursor = self.buffer.len();
        }
        self.mode = self.mode.toggled();
        self.mentions = MentionPopup::default();
        self.mode
    }

    pub fn toggle_tab(&mut self) {
        self.tab = match self.tab {
            ComposerTab::Editor => ComposerTab::Preview,
            ComposerTab::Preview => ComposerTab::Editor,
        };
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
        self.tab = ComposerTab::Editor;
        self.mentions = MentionPopup::default();
    }

    pub fn has_mention_suggestions(&self) -> bool {
        !self.mentions.suggestions.is_empty()
    }

    pub fn move_mention_selection(&mut self, delta: isize) {
        let len = self.mentions.suggestions.len() as isize;
        if len == 0 {
            return;
        }
        let next = (self.mentions.selected as isize + delta).rem_euclid(len);
        self.mentions.selected = next as usize;
    }

    pub fn dismiss_mentions(&mut self) {
        self.mentions = MentionPopup::default();
    }
}
