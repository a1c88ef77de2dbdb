use super::{store, AppResult};
use std::collections::HashMap;
use std::path::PathBuf;

/// Last seen `modified` timestamp per thread id.
pub struct ThreadVisits {
    path: PathBuf,
    seen: HashMap<u64, String>,
}

impl ThreadVisits {
    pub fn load(path: PathBuf) -> AppResult<Self> {
        let seen = store::read_json(&path)?;
        Ok(Self { path, seen })
    }

    pub fn empty(path: PathBuf) -> Self {
        Self { path, seen: HashMap::new() }
    }

    pub fn has_updates(&self, id: u64, modified: &str) -> bool {
        self.seen.get(&id).map_or(true, |m| m != modified)
    }

    /// Records a visit; only writes when the date actually changed.
    pub fn visit(&mut self, id: u64, modified: &str) -> AppResult<()> {
        if !self.has_updates(id, modified) {
            return Ok(());
        }
        self.seen.insert(id, modified.to_string());
        store::write_json(&self.path, &self.seen)
    }

    pub fn last_seen(&self, id: u64) -> Option<&str> {
        self.seen.get(&id).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visit_records_modified_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("visits.json");
        let mut visits = ThreadVisits::load(path.clone()).unwrap();
        assert!(visits.has_updates(5, "2024-01-01T00:00:00Z"));

        visits.visit(5, "2024-01-01T00:00:00Z").unwrap();
        assert!(!visits.has_updates(5, "2024-01-01T00:00:00Z"));
        assert!(visits.has_updates(5, "2024-01-03T00:00:00Z"));

        let reloaded = ThreadVisits::load(path).unwrap();
        assert_eq!(reloaded.last_seen(5), Some("2024-01-01T00:00:00Z"));
    }
}
