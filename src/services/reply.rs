use crate::state::AppError;
use once_cell::sync::Lazy;
use regex::Regex;

/// What the rich editor holds when nothing has been typed.
pub const EMPTY_RICH_CONTENT: &str = "<p><br></p>";

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static MEDIA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<(img|iframe)\b").unwrap());

const BLOCK_TAGS: [&str; 11] = [
    "<p", "<h1", "<h2", "<h3", "<h4", "<h5", "<h6", "<ul", "<ol", "<blockquote", "<pre",
];

/// Turns the rich editor buffer into the HTML value sent to the server.
/// Lines that already open a block element pass through; other lines
/// become paragraphs.
pub fn to_rich_html(buffer: &str) -> String {
    if buffer.trim().is_empty() {
        return EMPTY_RICH_CONTENT.to_string();
    }
    buffer
        .split('\n')
        .map(|line| {
            let trimmed = line.trim_start();
            if trimmed.is_empty() {
                EMPTY_RICH_CONTENT.to_string()
            } else if is_block(trimmed) {
                line.to_string()
            } else {
                format!("<p>{line}</p>")
            }
        })
        .collect()
}

fn is_block(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    BLOCK_TAGS.iter().any(|tag| {
        lower.starts_with(tag)
            && lower[tag.len()..]
                .chars()
                .next()
                .is_some_and(|c| c == '>' || c.is_whitespace())
    }) || lower.starts_with("<iframe")
}

pub fn strip_tags(text: &str) -> String {
    TAG_RE.replace_all(text, "").into_owned()
}

/// Service for reply validation
pub struct ReplyService;

impl ReplyService {
    /// Rejects empty replies; length limits are left to the server.
    pub fn validate(content: &str) -> Result<(), AppError> {
        let has_text = !strip_tags(content).trim().is_empty();
        if content == EMPTY_RICH_CONTENT || (!has_text && !MEDIA_RE.is_match(content)) {
            return Err(AppError::Validation("Content is required".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_become_paragraphs() {
        assert_eq!(to_rich_html("a\n\nb"), "<p>a</p><p><br></p><p>b</p>");
    }

    #[test]
    fn block_lines_pass_through() {
        assert_eq!(
            to_rich_html("<h2>Title</h2>\n<ul><li>x</li></ul>\n<pre>code</pre>"),
            "<h2>Title</h2><ul><li>x</li></ul><pre>code</pre>"
        );
        // `<pre` prefix alone is not enough
        assert_eq!(to_rich_html("<preview>"), "<p><preview></p>");
    }

    #[test]
    fn empty_buffer_is_the_rich_placeholder() {
        assert_eq!(to_rich_html("   "), EMPTY_RICH_CONTENT);
    }

    #[test]
    fn validation_requires_content() {
        assert!(ReplyService::validate("").is_err());
        assert!(ReplyService::validate("  \n").is_err());
        assert!(ReplyService::validate(EMPTY_RICH_CONTENT).is_err());
        assert!(ReplyService::validate("<p><strong></strong></p>").is_err());
        assert!(ReplyService::validate("<p><img src=\"x.png\"></p>").is_ok());
        assert!(ReplyService::validate("hi").is_ok());
    }

    #[test]
    fn long_replies_are_left_to_the_server() {
        let long = "a".repeat(50_000);
        assert!(ReplyService::validate(&long).is_ok());
    }
}
