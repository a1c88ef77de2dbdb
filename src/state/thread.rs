use crate::model::{Thread, ThreadResponse};
use std::collections::HashSet;

/// Remote thread data plus the view state layered on top of it.
#[derive(Default)]
pub struct ThreadState {
    /// Last response from the server. Kept while a refetch fails.
    pub data: Option<ThreadResponse>,
    /// Transport error of the most recent fetch, if it failed.
    pub fetch_error: Option<String>,
    pub in_flight: bool,
    /// Sequence number of the newest fetch sent; older answers are dropped.
    pub latest_seq: u64,
    pub retry_at_tick: Option<u64>,
    pub refresh_at_tick: Option<u64>,

    // Reply list view state
    pub selected_reply: Option<usize>,
    pub collapsed: HashSet<usize>,
    pub scroll: u16,
    /// Line offset of each reply header, filled in by the renderer.
    pub reply_offsets: Vec<u16>,
}

impl ThreadState {
    pub fn thread(&self) -> Option<&Thread> {
        self.data.as_ref().and_then(ThreadResponse::thread)
    }

    pub fn is_loading(&self) -> bool {
        self.data.is_none()
    }

    /// Allocates the sequence number for a new fetch.
    pub fn begin_fetch(&mut self) -> u64 {
        self.latest_seq += 1;
        self.in_flight = true;
        self.retry_at_tick = None;
        self.latest_seq
    }

    /// Returns false when `seq` was superseded by a newer fetch.
    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.latest_seq
    }

    pub fn apply_response(&mut self, response: ThreadResponse) {
        self.in_flight = false;
        self.fetch_error = None;
        let replaced = match (self.thread(), response.thread()) {
            (Some(old), Some(new)) => old.title != new.title || old.created != new.created,
            _ => true,
        };
        if replaced {
            self.collapsed.clear();
            self.selected_reply = None;
            self.scroll = 0;
        }
        let reply_count = response.thread().map_or(0, |t| t.replies.len());
        self.collapsed.retain(|i| *i < reply_count);
        if self.selected_reply.is_some_and(|i| i >= reply_count) {
            self.selected_reply = reply_count.checked_sub(1);
        }
        self.data = Some(response);
    }

    pub fn apply_failure(&mut self, message: String, retry_at_tick: u64) {
        self.in_flight = false;
        self.fetch_error = Some(message);
        self.retry_at_tick = Some(retry_at_tick);
    }

    pub fn reply_count(&self) -> usize {
        self.thread().map_or(0, |t| t.replies.len())
    }

    pub fn toggle_collapsed(&mut self, index: usize) {
        if !self.collapsed.remove(&index) {
            self.collapsed.insert(index);
        }
    }

    pub fn is_collapsed(&self, index: usize) -> bool {
        self.collapsed.contains(&index)
    }

    pub fn select_next_reply(&mut self) {
        let count = self.reply_count();
        if count == 0 {
            return;
        }
        self.selected_reply = Some(match self.selected_reply {
            Some(i) => (i + 1).min(count - 1),
            None => 0,
        });
        self.scroll_to_selected();
    }

    pub fn select_previous_reply(&mut self) {
        if let Some(i) = self.selected_reply {
            self.selected_reply = if i == 0 { None } else { Some(i - 1) };
        }
        self.scroll_to_selected();
    }

    fn scroll_to_selected(&mut self) {
        match self.selected_reply {
            Some(i) => {
                if let Some(offset) = self.reply_offsets.get(i) {
                    self.scroll = *offset;
                }
            }
            None => self.scroll = 0,
        }
    }

    pub fn scroll_by(&mut self, delta: i32) {
        self.scroll = (self.scroll as i32 + delta).clamp(0, u16::MAX as i32) as u16;
    }
}
