/// A transient popup message.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub is_error: bool,
    close_tick: Option<u64>,
}

/// State management for notifications
#[derive(Default)]
pub struct NotificationState {
    pub current_notification: Option<Notification>,
}

impl NotificationState {
    pub fn set_notification(
        &mut self,
        title: impl Into<String>,
        message: impl Into<String>,
        close_after_ticks: Option<u64>,
        is_error: bool,
        tick_count: u64,
    ) {
        self.current_notification = Some(Notification {
            title: title.into(),
            message: message.into(),
            is_error,
            close_tick: close_after_ticks.map(|ticks| tick_count + ticks),
        });
    }

    pub fn clear_notification(&mut self) {
        self.current_notification = None;
    }

    pub fn should_close_notification(&self, tick_count: u64) -> bool {
        matches!(
            &self.current_notification,
            Some(Notification { close_tick: Some(close_tick), .. }) if tick_count >= *close_tick
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closes_after_its_tick() {
        let mut state = NotificationState::default();
        state.set_notification("Error", "boom", Some(10), true, 100);
        assert!(!state.should_close_notification(109));
        assert!(state.should_close_notification(110));
    }

    #[test]
    fn sticky_notification_never_expires() {
        let mut state = NotificationState::default();
        state.set_notification("Error", "boom", None, true, 0);
        assert!(!state.should_close_notification(u64::MAX));
    }
}
