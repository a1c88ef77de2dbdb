use crate::model::Thread;
use once_cell::sync::Lazy;
use regex::Regex;

/// Longest search term that still opens the suggestion list.
pub const MAX_QUERY_CHARS: usize = 31;
pub const DENOTATION_CHAR: char = '@';

static ALLOWED_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z\sÅÄÖåäö]*$").unwrap());

/// An active `@` query: where the `@` sits and what follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionQuery {
    pub start: usize,
    pub term: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionCandidate {
    pub id: usize,
    pub value: String,
}

/// Business logic for "@" autocomplete over reply authors
pub struct MentionService;

impl MentionService {
    /// Reply authors, most recent first, numbered from 1.
    pub fn candidates(thread: &Thread) -> Vec<MentionCandidate> {
        thread
            .recent_authors()
            .into_iter()
            .enumerate()
            .map(|(i, hash)| MentionCandidate { id: i + 1, value: hash.to_string() })
            .collect()
    }

    pub fn find_query(text_before_cursor: &str) -> Option<MentionQuery> {
        let start = text_before_cursor.rfind(DENOTATION_CHAR)?;
        let term = &text_before_cursor[start + DENOTATION_CHAR.len_utf8()..];
        if term.chars().count() > MAX_QUERY_CHARS || !ALLOWED_CHARS.is_match(term) {
            return None;
        }
        Some(MentionQuery { start, term: term.to_string() })
    }

    pub fn filter(candidates: Vec<MentionCandidate>, term: &str) -> Vec<MentionCandidate> {
        let term = term.to_lowercase();
        candidates
            .into_iter()
            .filter(|c| c.value.to_lowercase().contains(&term))
            .collect()
    }

    pub fn get_mention_suggestions(
        thread: &Thread,
        text_before_cursor: &str,
    ) -> Option<(MentionQuery, Vec<String>)> {
        let query = Self::find_query(text_before_cursor)?;
        let suggestions: Vec<String> = Self::filter(Self::candidates(thread), &query.term)
            .into_iter()
            .map(|c| c.value)
            .collect();
        Some((query, suggestions))
    }

    pub fn completion(hash: &str) -> String {
        format!("{DENOTATION_CHAR}{hash} ")
    }
}
