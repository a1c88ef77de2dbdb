use crate::global_prefs::{global_prefs, global_prefs_mut};
use crate::model::{Pin, PostResponse, ThreadResponse};
use crate::services::api::ApiError;
use crate::services::{ApiCommand, ApiEvent, MentionService, ReplyService, SnapshotService};
use crate::state::{
    AppConfig, ComposerState, Focus, NotificationState, PinStore, ThreadMenuItem,
    ThreadState, ThreadVisits, UiState, TICK_MS,
};
use std::collections::HashSet;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub struct App {
    pub config: AppConfig,
    pub thread_id: u64,
    pub thread: ThreadState,
    pub composer: ComposerState,
    pub pins: PinStore,
    pub visits: ThreadVisits,
    pub notifications: NotificationState,
    pub ui: UiState,
    /// `modified` date recorded on the previous run, if any.
    pub last_visit: Option<String>,
    data_dir: PathBuf,
    to_api: mpsc::UnboundedSender<ApiCommand>,
}

impl App {
    pub fn new(
        thread_id: u64,
        config: AppConfig,
        to_api: mpsc::UnboundedSender<ApiCommand>,
        data_dir: PathBuf,
    ) -> App {
        let mut unreadable = Vec::new();
        let pins_path = data_dir.join("pins.json");
        let pins = PinStore::load(pins_path.clone()).unwrap_or_else(|e| {
            warn!(path = %pins_path.display(), error = %e, "ignoring unreadable pins");
            unreadable.push("pins");
            PinStore::empty(pins_path)
        });
        let visits_path = data_dir.join("visits.json");
        let visits = ThreadVisits::load(visits_path.clone()).unwrap_or_else(|e| {
            warn!(path = %visits_path.display(), error = %e, "ignoring unreadable visits");
            unreadable.push("visits");
            ThreadVisits::empty(visits_path)
        });
        let editor = global_prefs().editor;
        let ui = UiState { is_pinned: pins.has(thread_id), ..UiState::default() };
        let last_visit = visits.last_seen(thread_id).map(str::to_string);
        let mut app = App {
            config,
            thread_id,
            thread: ThreadState::default(),
            composer: ComposerState::new(editor),
            pins,
            visits,
            notifications: NotificationState::default(),
            ui,
            last_visit,
            data_dir,
            to_api,
        };
        if !unreadable.is_empty() {
            app.notify_error(format!("Could not read saved {}; starting empty", unreadable.join(" and ")));
        }
        app
    }

    pub fn set_notification(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
        ms: Option<u64>,
        is_error: bool,
    ) {
        let ticks = ms.map(|ms| (ms / TICK_MS).max(1));
        self.notifications
            .set_notification(title, message, ticks, is_error, self.ui.tick_count);
    }

    pub fn notify_error(&mut self, message: impl Into<String>) {
        let timeout = self.config.notification_timeout_ms;
        self.set_notification("Error", message, Some(timeout), true);
    }

    fn send_to_api(&mut self, command: ApiCommand) -> bool {
        if let Err(e) = self.to_api.send(command) {
            error!(error = %e, "api worker is gone");
            self.notify_error(format!("Connection Error: {}", e));
            return false;
        }
        true
    }

    /// Starts a fetch of the thread. Answers to earlier fetches are ignored
    /// once this one is sent.
    pub fn request_fetch(&mut self) {
        let seq = self.thread.begin_fetch();
        debug!(id = self.thread_id, seq, "fetching thread");
        if !self.send_to_api(ApiCommand::FetchThread { id: self.thread_id, seq }) {
            self.thread.in_flight = false;
        }
    }

    /// Revalidates after the local user changed the thread.
    pub fn refetch(&mut self) {
        self.request_fetch();
    }

    pub fn handle_api_event(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::ThreadLoaded { seq, response } => {
                if !self.thread.is_current(seq) {
                    debug!(seq, "dropping stale thread response");
                    return;
                }
                self.on_thread_loaded(response);
            }
            ApiEvent::ThreadFetchFailed { seq, error } => {
                if !self.thread.is_current(seq) {
                    return;
                }
                self.on_fetch_failed(error);
            }
            ApiEvent::ReplyPosted(PostResponse::Ok) => {
                info!(id = self.thread_id, "reply posted");
                self.composer.reset();
                self.composer.loading = false;
                self.refetch();
            }
            ApiEvent::ReplyPosted(PostResponse::Err(message)) => {
                self.composer.loading = false;
                self.notify_error(message);
            }
            ApiEvent::ReplyFailed(error) => {
                self.composer.loading = false;
                self.notify_error(error.user_message());
            }
            ApiEvent::ArchiveRecovered(ThreadResponse::Ok(thread)) => {
                info!(id = self.thread_id, "thread recovered from the Internet Archive");
                self.thread.apply_response(ThreadResponse::Ok(thread));
                self.set_notification("Recovered", "Showing the Internet Archive copy", Some(3000), false);
            }
            ApiEvent::ArchiveRecovered(ThreadResponse::Err(message)) => {
                self.notify_error(format!("Archived copy is an error page: {message}"));
            }
            ApiEvent::ArchiveFailed(error) => {
                self.notify_error(format!("Internet Archive: {}", error.user_message()));
            }
        }
    }

    fn on_thread_loaded(&mut self, response: ThreadResponse) {
        if let ThreadResponse::Ok(thread) = &response {
            if let Err(e) = self.visits.visit(self.thread_id, &thread.modified) {
                warn!(error = %e, "could not record thread visit");
            }
        }
        self.thread.apply_response(response);
        self.thread.refresh_at_tick = self
            .config
            .refresh_interval
            .map(|interval| self.ui.tick_count + AppConfig::ticks(interval));
        self.update_mention_suggestions();
    }

    fn on_fetch_failed(&mut self, error: ApiError) {
        let retry_at = self.ui.tick_count + AppConfig::ticks(self.config.retry_interval);
        self.thread.apply_failure(error.user_message(), retry_at);
        if self.thread.data.is_none() {
            match SnapshotService::load(&self.data_dir, self.thread_id) {
                Ok(Some(thread)) => {
                    info!(id = self.thread_id, "showing locally saved copy");
                    self.thread.data = Some(ThreadResponse::Ok(thread));
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "could not read local copy"),
            }
        }
    }

    pub fn on_tick(&mut self) {
        self.ui.tick();
        let tick = self.ui.tick_count;
        if self.notifications.should_close_notification(tick) {
            self.notifications.clear_notification();
        }
        if self.thread.in_flight {
            return;
        }
        let retry_due = self.thread.retry_at_tick.is_some_and(|at| tick >= at);
        let refresh_due = self.thread.refresh_at_tick.is_some_and(|at| tick >= at);
        if retry_due || refresh_due {
            self.thread.refresh_at_tick = None;
            self.request_fetch();
        }
    }

    pub fn submit_reply(&mut self) {
        if self.composer.loading {
            return;
        }
        let content = self.composer.content();
        if let Err(e) = ReplyService::validate(&content) {
            self.notify_error(e.to_string());
            return;
        }
        self.composer.loading = true;
        self.composer.dismiss_mentions();
        let id = self.thread_id;
        if !self.send_to_api(ApiCommand::PostReply { id, text: content }) {
            self.composer.loading = false;
        }
    }

    pub fn toggle_editor_mode(&mut self) {
        if self.composer.is_read_only() {
            return;
        }
        let mode = self.composer.toggle_mode();
        if let Err(e) = global_prefs_mut().set_editor(mode) {
            warn!(error = %e, "could not save preferences");
        }
    }

    pub fn toggle_colorize_replies(&mut self) {
        let mut prefs = global_prefs_mut();
        prefs.colorize_replies = !prefs.colorize_replies;
        if let Err(e) = prefs.save() {
            warn!(error = %e, "could not save preferences");
        }
    }

    pub fn toggle_pin(&mut self) {
        let Some(thread) = self.thread.thread() else {
            return;
        };
        let pin = Pin::from_thread(self.thread_id, thread);
        let (pinned, result) = self.pins.toggle(pin);
        self.ui.is_pinned = pinned;
        if let Err(e) = result {
            error!(error = %e, "could not save pins");
            self.notify_error(format!("Could not save pins: {e}"));
        }
    }

    pub fn save_locally(&mut self) {
        let Some(thread) = self.thread.thread() else {
            return;
        };
        match SnapshotService::save(&self.data_dir, self.thread_id, thread) {
            Ok(path) => {
                self.set_notification("Saved", format!("Saved to {}", path.display()), Some(3000), false)
            }
            Err(e) => self.notify_error(format!("Could not save thread: {e}")),
        }
    }

    pub fn recover_from_archive(&mut self) {
        self.set_notification("Recover", "Asking the Internet Archive...", Some(1500), false);
        let id = self.thread_id;
        self.send_to_api(ApiCommand::RecoverFromArchive { id });
    }

    pub fn activate_menu_item(&mut self, item: ThreadMenuItem) {
        self.ui.close_thread_menu();
        match item {
            ThreadMenuItem::RecoverFromArchive => self.recover_from_archive(),
            ThreadMenuItem::TogglePin => self.toggle_pin(),
            ThreadMenuItem::SaveLocally => self.save_locally(),
        }
    }

    pub fn focus_composer(&mut self) {
        self.ui.set_focus(Focus::Composer);
    }

    /// Recomputes the "@" suggestion list from the text before the cursor.
    pub fn update_mention_suggestions(&mut self) {
        let found = self.thread.thread().and_then(|thread| {
            MentionService::get_mention_suggestions(thread, self.composer.text_before_cursor())
        });
        let popup = &mut self.composer.mentions;
        match found {
            Some((query, suggestions)) if !suggestions.is_empty() => {
                if popup.query.as_ref().map(|q| q.start) != Some(query.start) {
                    popup.selected = 0;
                }
                popup.selected = popup.selected.min(suggestions.len() - 1);
                popup.query = Some(query);
                popup.suggestions = suggestions;
            }
            _ => self.composer.dismiss_mentions(),
        }
    }

    pub fn apply_selected_mention(&mut self) {
        let popup = &self.composer.mentions;
        let (Some(query), Some(hash)) = (popup.query.clone(), popup.suggestions.get(popup.selected))
        else {
            return;
        };
        let completion = MentionService::completion(hash);
        self.composer.replace_before_cursor(query.start, &completion);
        self.composer.dismiss_mentions();
    }

    /// Every author hash in the thread, for mention highlighting.
    pub fn known_authors(&self) -> HashSet<String> {
        self.thread
            .thread()
            .map(|t| {
                std::iter::once(t.hash.clone())
                    .chain(t.replies.iter().map(|r| r.hash.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}
