pub mod composer;
pub mod notification;
pub mod pins;
pub mod store;
pub mod thread;
pub mod ui;
pub mod visits;

pub use composer::{ComposerState, ComposerTab, EditorMode, RichControl};
pub use notification::NotificationState;
pub use pins::PinStore;
pub use thread::ThreadState;
pub use ui::{Focus, ThreadMenuItem, UiState};
pub use visits::ThreadVisits;

use std::time::Duration;
use thiserror::Error;

/// Milliseconds between two `AppEvent::Tick`s.
pub const TICK_MS: u64 = 50;

/// Configuration constants for the application
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base: String,
    pub retry_interval: Duration,
    /// Periodic refetch; `None` disables it.
    pub refresh_interval: Option<Duration>,
    pub notification_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: crate::services::api::DEFAULT_API_BASE.to_string(),
            retry_interval: Duration::from_secs(5),
            refresh_interval: None,
            notification_timeout_ms: 4000,
        }
    }
}

impl AppConfig {
    pub fn ticks(duration: Duration) -> u64 {
        (duration.as_millis() as u64 / TICK_MS).max(1)
    }
}

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Api(#[from] crate::services::api::ApiError),
    #[error("{0}")]
    Validation(String),
}

pub type AppResult<T> = Result<T, AppError>;
