use crate::model::Thread;
use crate::state::{store, AppResult};
use std::path::{Path, PathBuf};
use tracing::info;

/// Saves fetched threads as JSON files under `<data_dir>/threads`.
pub struct SnapshotService;

impl SnapshotService {
    pub fn snapshot_path(data_dir: &Path, id: u64) -> PathBuf {
        data_dir.join("threads").join(format!("{id}.json"))
    }

    pub fn save(data_dir: &Path, id: u64, thread: &Thread) -> AppResult<PathBuf> {
        let path = Self::snapshot_path(data_dir, id);
        store::write_json(&path, thread)?;
        info!(id, path = %path.display(), "thread saved locally");
        Ok(path)
    }

    pub fn load(data_dir: &Path, id: u64) -> AppResult<Option<Thread>> {
        let path = Self::snapshot_path(data_dir, id);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&std::fs::read_to_string(path)?)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Reply;

    #[test]
    fn saved_thread_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let thread = Thread {
            title: "Saved".into(),
            text: "body".into(),
            hash: "op".into(),
            created: "c".into(),
            modified: "m".into(),
            replies: vec![Reply { hash: "a".into(), text: "r".into(), created: None }],
        };
        let path = SnapshotService::save(dir.path(), 3, &thread).unwrap();
        assert!(path.ends_with("threads/3.json"));
        assert_eq!(SnapshotService::load(dir.path(), 3).unwrap(), Some(thread));
        assert_eq!(SnapshotService::load(dir.path(), 4).unwrap(), None);
    }
}
