//! Incremental sync watermarks.
//!
//! Tracks, per source, the newest post URL seen by the last sync pass so
//! the next pass can stop at already-ingested content. Persisted as a
//! small JSON file; writes go through a temp file so a crash mid-write
//! never truncates the previous state.

use crate::error::Result;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
struct StateFile {
    #[serde(default)]
    watermarks: HashMap<String, String>,
}

/// Per-source watermark store. The orchestrator owns one instance and
/// shares it behind its own `Arc`.
pub struct SyncState {
    path: PathBuf,
    inner: Mutex<StateFile>,
}

impl SyncState {
    /// Load existing state, or start empty when the file is missing or
    /// unreadable (a corrupt watermark file only costs one full re-sync).
    pub fn load(path: &Path) -> Self {
        let inner = match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                debug!("Discarding undecodable sync state: {e}");
                StateFile::default()
            }),
            Err(_) => StateFile::default(),
        };
        Self {
            path: path.to_path_buf(),
            inner: Mutex::new(inner),
        }
    }

    /// The newest post URL recorded for `source`, if any.
    pub fn watermark(&self, source: &str) -> Option<String> {
        self.inner.lock().watermarks.get(source).cloned()
    }

    /// Record `url` as the newest post seen for `source` and persist.
    pub fn advance(&self, source: &str, url: &str) -> Result<()> {
        let snapshot = {
            let mut guard = self.inner.lock();
            guard.watermarks.insert(source.to_string(), url.to_string());
            serde_json::to_string_pretty(&*guard)?
        };
        self.persist(&snapshot)
    }

    fn persist(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn advance_persists_across_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sync_state.json");

        let state = SyncState::load(&path);
        assert!(state.watermark("skystream").is_none());
        state
            .advance("skystream", "https://skystream.example/post/42")
            .unwrap();

        let reloaded = SyncState::load(&path);
        assert_eq!(
            reloaded.watermark("skystream").as_deref(),
            Some("https://skystream.example/post/42")
        );
        assert!(reloaded.watermark("hdvault").is_none());
    }

    #[test]
    fn corrupt_state_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sync_state.json");
        std::fs::write(&path, "{not json").unwrap();

        let state = SyncState::load(&path);
        assert!(state.watermark("skystream").is_none());
    }
}
