use std::path::PathBuf;

use async_trait::async_trait;
use moai_manifest::atomic::write_atomic;

use crate::error::Error;
use crate::types::LoopState;

#[async_trait]
pub trait LoopStorage: Send + Sync {
    async fn save(&self, state: &LoopState) -> Result<(), Error>;
    async fn load(&self, spec_id: &str) -> Result<Option<LoopState>, Error>;
    async fn delete(&self, spec_id: &str) -> Result<(), Error>;
}

/// Persists each spec's loop state as its own JSON file under
/// `<root>/.moai/state/loop/<spec_id>.json`, written through the same
/// temp-sibling-then-rename helper the manifest and spec linker use.
pub struct JsonFileLoopStorage {
    dir: PathBuf,
}

impl JsonFileLoopStorage {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self { dir: project_root.into().join(".moai").join("state").join("loop") }
    }

    fn path_for(&self, spec_id: &str) -> PathBuf {
        self.dir.join(format!("{spec_id}.json"))
    }
}

#[async_trait]
impl LoopStorage for JsonFileLoopStorage {
    async fn save(&self, state: &LoopState) -> Result<(), Error> {
        std::fs::create_dir_all(&self.dir)?;
        let mut json = serde_json::to_string_pretty(state)?;
        json.push('\n');
        write_atomic(&self.path_for(&state.spec_id), json.as_bytes())?;
        Ok(())
    }

    async fn load(&self, spec_id: &str) -> Result<Option<LoopState>, Error> {
        let path = self.path_for(spec_id);
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let state = serde_json::from_slice(&bytes)?;
        Ok(Some(state))
    }

    async fn delete(&self, spec_id: &str) -> Result<(), Error> {
        let path = self.path_for(spec_id);
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LoopState;

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileLoopStorage::new(dir.path());
        let state = LoopState::new("spec-1", 5);
        storage.save(&state).await.unwrap();
        let loaded = storage.load("spec-1").await.unwrap().unwrap();
        assert_eq!(loaded.spec_id, "spec-1");
    }

    #[tokio::test]
    async fn load_missing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileLoopStorage::new(dir.path());
        assert!(storage.load("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileLoopStorage::new(dir.path());
        let state = LoopState::new("spec-1", 5);
        storage.save(&state).await.unwrap();
        storage.delete("spec-1").await.unwrap();
        storage.delete("spec-1").await.unwrap();
        assert!(storage.load("spec-1").await.unwrap().is_none());
    }
}
