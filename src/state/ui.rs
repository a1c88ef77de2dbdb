use ratatui::widgets::ListState;

/// Which pane receives key input.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum Focus {
    Thread,
    Composer,
}

/// Entries of the thread actions menu, grouped under "Recover" and "Storage".
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum ThreadMenuItem {
    RecoverFromArchive,
    TogglePin,
    SaveLocally,
}

impl ThreadMenuItem {
    pub const ALL: [ThreadMenuItem; 3] = [
        ThreadMenuItem::RecoverFromArchive,
        ThreadMenuItem::TogglePin,
        ThreadMenuItem::SaveLocally,
    ];

    pub fn section(self) -> &'static str {
        match self {
            ThreadMenuItem::RecoverFromArchive => "Recover",
            ThreadMenuItem::TogglePin | ThreadMenuItem::SaveLocally => "Storage",
        }
    }

    pub fn label(self, pinned: bool) -> &'static str {
        match self {
            ThreadMenuItem::RecoverFromArchive => "Recover from Internet Archive",
            ThreadMenuItem::TogglePin if pinned => "Unpin",
            ThreadMenuItem::TogglePin => "Pin",
            ThreadMenuItem::SaveLocally => "Save locally",
        }
    }
}

/// State management for UI-specific state
pub struct UiState {
    pub focus: Focus,
    pub should_quit: bool,
    pub tick_count: u64,

    // Thread actions menu
    pub show_thread_menu: bool,
    pub thread_menu_state: ListState,

    // "View Raw Content" popup; index of the reply shown
    pub raw_view_reply: Option<usize>,

    // Quit confirmation
    pub show_quit_confirm: bool,
    pub quit_confirm_selected: usize,

    /// Pinned state as shown in the menu; flipped before the store is written.
    pub is_pinned: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            focus: Focus::Thread,
            should_quit: false,
            tick_count: 0,
            show_thread_menu: false,
            thread_menu_state: ListState::default(),
            raw_view_reply: None,
            show_quit_confirm: false,
            quit_confirm_selected: 0,
            is_pinned: false,
        }
    }
}

impl UiState {
    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn tick(&mut self) {
        self.tick_count += 1;
    }

    pub fn open_thread_menu(&mut self) {
        self.show_thread_menu = true;
        self.thread_menu_state.select(Some(0));
    }

    pub fn close_thread_menu(&mut self) {
        self.show_thread_menu = false;
    }

    pub fn selected_menu_item(&self) -> Option<ThreadMenuItem> {
        self.thread_menu_state
            .selected()
            .and_then(|i| ThreadMenuItem::ALL.get(i).copied())
    }

    pub fn move_menu_selection(&mut self, delta: isize) {
        let len = ThreadMenuItem::ALL.len() as isize;
        let current = self.thread_menu_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len);
        self.thread_menu_state.select(Some(next as usize));
    }
}
