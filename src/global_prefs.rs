// Global preferences for the app (not thread-specific)
use crate::state::{store, AppResult, EditorMode};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::warn;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Light,
    #[default]
    Dark,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GlobalPrefs {
    pub editor: EditorMode,
    pub colorize_replies: bool,
    pub color_scheme: ColorScheme,
    /// Where the prefs live; `None` keeps them in memory only.
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Default for GlobalPrefs {
    fn default() -> Self {
        Self {
            editor: EditorMode::Rich,
            colorize_replies: false,
            color_scheme: ColorScheme::Dark,
            path: None,
        }
    }
}

impl GlobalPrefs {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("forum-thread").join("prefs.json"))
    }

    pub fn load(path: Option<PathBuf>) -> Self {
        let mut prefs = match &path {
            Some(path) => store::read_json(path).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "ignoring unreadable preferences");
                Self::default()
            }),
            None => Self::default(),
        };
        prefs.path = path;
        prefs
    }

    pub fn set_editor(&mut self, editor: EditorMode) -> AppResult<()> {
        if self.editor == editor {
            return Ok(());
        }
        self.editor = editor;
        self.save()
    }

    pub fn save(&self) -> AppResult<()> {
        match &self.path {
            Some(path) => store::write_json(path, self),
            None => Ok(()),
        }
    }
}

static GLOBAL_PREFS: OnceCell<RwLock<GlobalPrefs>> = OnceCell::new();

pub fn init_global_prefs(path: Option<PathBuf>) {
    let prefs = GlobalPrefs::load(path);
    GLOBAL_PREFS.set(RwLock::new(prefs)).ok();
}

fn cell() -> &'static RwLock<GlobalPrefs> {
    GLOBAL_PREFS.get_or_init(|| RwLock::new(GlobalPrefs::default()))
}

pub fn global_prefs() -> RwLockReadGuard<'static, GlobalPrefs> {
    cell().read().unwrap_or_else(|e| e.into_inner())
}

pub fn global_prefs_mut() -> RwLockWriteGuard<'static, GlobalPrefs> {
    cell().write().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let prefs: GlobalPrefs = serde_json::from_str(r#"{"editor":"plain"}"#).unwrap();
        assert_eq!(prefs.editor, EditorMode::Plain);
        assert!(!prefs.colorize_replies);
        assert_eq!(prefs.color_scheme, ColorScheme::Dark);
    }

    #[test]
    fn saved_prefs_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let mut prefs = GlobalPrefs::load(Some(path.clone()));
        assert_eq!(prefs.editor, EditorMode::Rich);
        prefs.colorize_replies = true;
        prefs.save().unwrap();
        assert!(GlobalPrefs::load(Some(path)).colorize_replies);
    }

    #[test]
    fn editor_choice_is_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let mut prefs = GlobalPrefs::load(Some(path.clone()));
        prefs.set_editor(EditorMode::Plain).unwrap();
        assert_eq!(GlobalPrefs::load(Some(path)).editor, EditorMode::Plain);
    }

    #[test]
    fn in_memory_prefs_do_not_write() {
        GlobalPrefs::default().save().unwrap();
    }
}
