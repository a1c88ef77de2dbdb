use super::{store, AppResult};
use crate::model::Pin;
use std::path::PathBuf;
use tracing::debug;

/// Locally bookmarked threads, persisted as a JSON list.
pub struct PinStore {
    path: PathBuf,
    pins: Vec<Pin>,
}

impl PinStore {
    pub fn load(path: PathBuf) -> AppResult<Self> {
        let pins: Vec<Pin> = store::read_json(&path)?;
        debug!(count = pins.len(), path = %path.display(), "loaded pins");
        Ok(Self { path, pins })
    }

    /// A store with no pins that writes to `path` on the first change.
    pub fn empty(path: PathBuf) -> Self {
        Self { path, pins: Vec::new() }
    }

    pub fn has(&self, id: u64) -> bool {
        self.pins.iter().any(|p| p.id == id)
    }

    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn add(&mut self, pin: Pin) -> AppResult<()> {
        if self.has(pin.id) {
            return Ok(());
        }
        self.pins.push(pin);
        self.save()
    }

    pub fn remove(&mut self, id: u64) -> AppResult<()> {
        self.pins.retain(|p| p.id != id);
        self.save()
    }

    /// Flips the pin for `pin.id`. The in-memory state changes even if the
    /// write fails; the returned bool is the new pinned state.
    pub fn toggle(&mut self, pin: Pin) -> (bool, AppResult<()>) {
        if self.has(pin.id) {
            let result = self.remove(pin.id);
            (false, result)
        } else {
            let result = self.add(pin);
            (true, result)
        }
    }

    fn save(&self) -> AppResult<()> {
        store::write_json(&self.path, &self.pins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin(id: u64) -> Pin {
        Pin {
            id,
            created: "2024-01-01T00:00:00Z".into(),
            title: format!("thread {id}"),
            hash: "abc".into(),
        }
    }

    #[test]
    fn toggle_adds_then_removes_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pins.json");
        let mut pins = PinStore::load(path.clone()).unwrap();

        let (pinned, result) = pins.toggle(pin(7));
        assert!(pinned);
        result.unwrap();
        assert!(PinStore::load(path.clone()).unwrap().has(7));

        let (pinned, result) = pins.toggle(pin(7));
        assert!(!pinned);
        result.unwrap();
        assert!(!PinStore::load(path).unwrap().has(7));
    }

    #[test]
    fn adding_twice_keeps_one_entry() {
        let dir = tempfile::tempdir().unwrap();
        let mut pins = PinStore::load(dir.path().join("pins.json")).unwrap();
        pins.add(pin(1)).unwrap();
        pins.add(pin(1)).unwrap();
        pins.add(pin(2)).unwrap();
        assert_eq!(pins.pins().len(), 2);
    }

    #[test]
    fn failed_write_still_flips_state() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the write fail.
        let path = dir.path().join("pins.json");
        std::fs::create_dir(&path).unwrap();
        let mut pins = PinStore { path, pins: Vec::new() };
        let (pinned, result) = pins.toggle(pin(3));
        assert!(pinned);
        assert!(result.is_err());
        assert!(pins.has(3));
    }
}
