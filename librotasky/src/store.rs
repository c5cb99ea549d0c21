//! File-backed state storage
//!
//! Two small stores hold everything the bot remembers between runs: the
//! date-anchored post collection and the recency history for the rotation
//! pool. Loads never fail the run; a missing or corrupt file degrades to an
//! empty collection with a warning, matching the behavior a memoryless
//! scheduler job needs. Saves rewrite the whole document atomically.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::types::{ScheduledPost, RECENT_HISTORY_CAP};

/// Access to the two post sources: date-anchored entries and the rotation
/// pool. Backed by files in production, by [`memory`] fakes in tests.
pub trait PostStore {
    fn load_scheduled(&self) -> Vec<ScheduledPost>;
    fn save_scheduled(&self, posts: &[ScheduledPost]) -> Result<(), StorageError>;
    fn load_pool(&self) -> Vec<String>;
}

/// Access to the bounded history of recently used rotation posts.
pub trait RecencyStore {
    fn load_history(&self) -> Vec<String>;
    fn save_history(&self, history: &[String]) -> Result<(), StorageError>;
}

/// On-disk shape of the recency state document
#[derive(Serialize, Deserialize)]
struct StateDoc {
    recent_posts: Vec<String>,
}

/// Overwrite `path` atomically: write a sibling temp file, then rename it
/// into place so a crash mid-write never leaves a truncated document.
fn write_atomic(path: &Path, content: &str) -> Result<(), StorageError> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

pub struct FilePostStore {
    scheduled_path: PathBuf,
    pool_path: PathBuf,
}

impl FilePostStore {
    pub fn new(scheduled_path: impl Into<PathBuf>, pool_path: impl Into<PathBuf>) -> Self {
        Self {
            scheduled_path: scheduled_path.into(),
            pool_path: pool_path.into(),
        }
    }
}

impl PostStore for FilePostStore {
    fn load_scheduled(&self) -> Vec<ScheduledPost> {
        let content = match std::fs::read_to_string(&self.scheduled_path) {
            Ok(content) => content,
            Err(e) => {
                debug!(
                    "No scheduled posts at {}: {}",
                    self.scheduled_path.display(),
                    e
                );
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<ScheduledPost>>(&content) {
            Ok(posts) => {
                debug!("Loaded {} scheduled posts", posts.len());
                posts
            }
            Err(e) => {
                warn!(
                    "Could not parse {}: {}. Treating as empty.",
                    self.scheduled_path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    fn save_scheduled(&self, posts: &[ScheduledPost]) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(posts)?;
        write_atomic(&self.scheduled_path, &json)
    }

    fn load_pool(&self) -> Vec<String> {
        let content = match std::fs::read_to_string(&self.pool_path) {
            Ok(content) => content,
            Err(e) => {
                warn!("No rotation pool at {}: {}", self.pool_path.display(), e);
                return Vec::new();
            }
        };

        let posts: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        debug!("Loaded {} rotation posts", posts.len());
        posts
    }
}

pub struct FileRecencyStore {
    path: PathBuf,
}

impl FileRecencyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RecencyStore for FileRecencyStore {
    fn load_history(&self) -> Vec<String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                debug!("No state file at {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<StateDoc>(&content) {
            Ok(doc) => doc.recent_posts,
            Err(e) => {
                warn!(
                    "Could not parse {}: {}. Starting with empty history.",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    fn save_history(&self, history: &[String]) -> Result<(), StorageError> {
        // Only the most recent entries survive a save
        let start = history.len().saturating_sub(RECENT_HISTORY_CAP);
        let doc = StateDoc {
            recent_posts: history[start..].to_vec(),
        };
        let json = serde_json::to_string_pretty(&doc)?;
        write_atomic(&self.path, &json)
    }
}

/// In-memory store fakes.
///
/// Compiled into the library (not just `#[cfg(test)]`) so the integration
/// tests can drive the runner without touching the filesystem.
pub mod memory {
    use std::sync::{Arc, Mutex};

    use super::{PostStore, RecencyStore};
    use crate::error::StorageError;
    use crate::types::{ScheduledPost, RECENT_HISTORY_CAP};

    /// In-memory [`PostStore`]. Clones share state, so a test can keep a
    /// handle while the runner owns another.
    #[derive(Clone, Default)]
    pub struct MemoryPostStore {
        scheduled: Arc<Mutex<Vec<ScheduledPost>>>,
        pool: Arc<Mutex<Vec<String>>>,
        save_count: Arc<Mutex<usize>>,
    }

    impl MemoryPostStore {
        pub fn new(scheduled: Vec<ScheduledPost>, pool: Vec<String>) -> Self {
            Self {
                scheduled: Arc::new(Mutex::new(scheduled)),
                pool: Arc::new(Mutex::new(pool)),
                save_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn scheduled(&self) -> Vec<ScheduledPost> {
            self.scheduled.lock().unwrap().clone()
        }

        pub fn save_count(&self) -> usize {
            *self.save_count.lock().unwrap()
        }
    }

    impl PostStore for MemoryPostStore {
        fn load_scheduled(&self) -> Vec<ScheduledPost> {
            self.scheduled.lock().unwrap().clone()
        }

        fn save_scheduled(&self, posts: &[ScheduledPost]) -> Result<(), StorageError> {
            *self.scheduled.lock().unwrap() = posts.to_vec();
            *self.save_count.lock().unwrap() += 1;
            Ok(())
        }

        fn load_pool(&self) -> Vec<String> {
            self.pool.lock().unwrap().clone()
        }
    }

    /// In-memory [`RecencyStore`] with the same shared-clone behavior.
    #[derive(Clone, Default)]
    pub struct MemoryRecencyStore {
        history: Arc<Mutex<Vec<String>>>,
        save_count: Arc<Mutex<usize>>,
    }

    impl MemoryRecencyStore {
        pub fn new(history: Vec<String>) -> Self {
            Self {
                history: Arc::new(Mutex::new(history)),
                save_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn history(&self) -> Vec<String> {
            self.history.lock().unwrap().clone()
        }

        pub fn save_count(&self) -> usize {
            *self.save_count.lock().unwrap()
        }
    }

    impl RecencyStore for MemoryRecencyStore {
        fn load_history(&self) -> Vec<String> {
            self.history.lock().unwrap().clone()
        }

        fn save_history(&self, history: &[String]) -> Result<(), StorageError> {
            let start = history.len().saturating_sub(RECENT_HISTORY_CAP);
            *self.history.lock().unwrap() = history[start..].to_vec();
            *self.save_count.lock().unwrap() += 1;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn file_stores(dir: &TempDir) -> (FilePostStore, FileRecencyStore) {
        let posts = FilePostStore::new(
            dir.path().join("scheduled_posts.json"),
            dir.path().join("posts.txt"),
        );
        let state = FileRecencyStore::new(dir.path().join("bot_state.json"));
        (posts, state)
    }

    #[test]
    fn test_load_scheduled_absent_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let (posts, _) = file_stores(&dir);
        assert!(posts.load_scheduled().is_empty());
    }

    #[test]
    fn test_load_scheduled_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let (posts, _) = file_stores(&dir);
        std::fs::write(dir.path().join("scheduled_posts.json"), "{not json").unwrap();
        assert!(posts.load_scheduled().is_empty());
    }

    #[test]
    fn test_scheduled_roundtrip_preserves_all_fields() {
        let dir = TempDir::new().unwrap();
        let (store, _) = file_stores(&dir);

        let mut sent = ScheduledPost::new("2023-12-25", "Merry Xmas");
        sent.mark_posted("2023-12-25T08:00:00+00:00".to_string());
        let pending = ScheduledPost::new("2024-07-04", "fireworks");

        store.save_scheduled(&[sent.clone(), pending.clone()]).unwrap();
        let loaded = store.load_scheduled();

        assert_eq!(loaded, vec![sent, pending]);
    }

    #[test]
    fn test_save_scheduled_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let (store, _) = file_stores(&dir);

        store
            .save_scheduled(&[ScheduledPost::new("2024-01-15", "hello")])
            .unwrap();

        assert!(dir.path().join("scheduled_posts.json").exists());
        assert!(!dir.path().join("scheduled_posts.tmp").exists());
    }

    #[test]
    fn test_load_pool_skips_blank_lines() {
        let dir = TempDir::new().unwrap();
        let (store, _) = file_stores(&dir);
        std::fs::write(
            dir.path().join("posts.txt"),
            "first post\n\n   \nsecond post\n\tthird post\t\n",
        )
        .unwrap();

        assert_eq!(
            store.load_pool(),
            vec!["first post", "second post", "third post"]
        );
    }

    #[test]
    fn test_load_pool_absent_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let (store, _) = file_stores(&dir);
        assert!(store.load_pool().is_empty());
    }

    #[test]
    fn test_history_roundtrip() {
        let dir = TempDir::new().unwrap();
        let (_, store) = file_stores(&dir);

        store
            .save_history(&["a".to_string(), "b".to_string()])
            .unwrap();
        assert_eq!(store.load_history(), vec!["a", "b"]);
    }

    #[test]
    fn test_history_absent_or_corrupt_is_empty() {
        let dir = TempDir::new().unwrap();
        let (_, store) = file_stores(&dir);
        assert!(store.load_history().is_empty());

        std::fs::write(dir.path().join("bot_state.json"), "][").unwrap();
        assert!(store.load_history().is_empty());
    }

    #[test]
    fn test_history_save_enforces_cap() {
        let dir = TempDir::new().unwrap();
        let (_, store) = file_stores(&dir);

        let long: Vec<String> = (0..300).map(|i| format!("post-{}", i)).collect();
        store.save_history(&long).unwrap();

        let loaded = store.load_history();
        assert_eq!(loaded.len(), RECENT_HISTORY_CAP);
        // Most-recent-last ordering survives, oldest entries are dropped
        assert_eq!(loaded.first().unwrap(), "post-80");
        assert_eq!(loaded.last().unwrap(), "post-299");
    }

    #[test]
    fn test_history_document_shape() {
        let dir = TempDir::new().unwrap();
        let (_, store) = file_stores(&dir);

        store.save_history(&["only one".to_string()]).unwrap();
        let raw = std::fs::read_to_string(dir.path().join("bot_state.json")).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(doc["recent_posts"][0], "only one");
    }

    #[test]
    fn test_memory_store_clones_share_state() {
        let store = memory::MemoryPostStore::new(vec![], vec!["a".to_string()]);
        let handle = store.clone();

        store
            .save_scheduled(&[ScheduledPost::new("2024-02-02", "x")])
            .unwrap();

        assert_eq!(handle.scheduled().len(), 1);
        assert_eq!(handle.save_count(), 1);
        assert_eq!(handle.load_pool(), vec!["a"]);
    }

    #[test]
    fn test_memory_recency_store_caps_like_the_file_store() {
        let store = memory::MemoryRecencyStore::default();
        let long: Vec<String> = (0..250).map(|i| i.to_string()).collect();
        store.save_history(&long).unwrap();
        assert_eq!(store.history().len(), RECENT_HISTORY_CAP);
    }
}
