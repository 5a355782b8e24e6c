use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::warn;

use crate::platform::MentionId;

/// File-backed store for the id of the last processed mention.
///
/// The background poll loop and the manual `/trigger` endpoint can both
/// touch this; the interior mutex keeps load/save pairs serialized.
pub struct CheckpointStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CheckpointStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Last processed mention id, or `None` on first run or when the file
    /// is unreadable or corrupt. A bad store means "process all available
    /// history", never a startup failure.
    pub async fn load(&self) -> Option<MentionId> {
        let _guard = self.lock.lock().await;
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return None,
        };
        match content.trim().parse::<MentionId>() {
            Ok(id) => Some(id),
            Err(_) => {
                warn!(
                    "Checkpoint file {} is corrupt, starting from scratch",
                    self.path.display()
                );
                None
            }
        }
    }

    /// Persist `id`, flushed to disk before returning so a restart observes
    /// it. Written once per mention, not batched.
    pub async fn save(&self, id: MentionId) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut file = std::fs::File::create(&self.path)
            .with_context(|| format!("Failed to create checkpoint file: {}", self.path.display()))?;
        file.write_all(id.to_string().as_bytes())
            .context("Failed to write checkpoint")?;
        file.sync_all().context("Failed to flush checkpoint")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> CheckpointStore {
        CheckpointStore::new(dir.path().join("last_mention_id.txt"))
    }

    #[tokio::test]
    async fn test_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store_in(&dir).load().await, None);
    }

    #[tokio::test]
    async fn test_save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(1234567890).await.unwrap();
        assert_eq!(store.load().await, Some(1234567890));

        store.save(1234567999).await.unwrap();
        assert_eq!(store.load().await, Some(1234567999));
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_mention_id.txt");
        std::fs::write(&path, "not a number").unwrap();

        let store = CheckpointStore::new(path);
        assert_eq!(store.load().await, None);
    }

    #[tokio::test]
    async fn test_whitespace_around_id_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_mention_id.txt");
        std::fs::write(&path, "42\n").unwrap();

        let store = CheckpointStore::new(path);
        assert_eq!(store.load().await, Some(42));
    }
}
