use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Error;

const REGISTRY_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Open,
    InReview,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecLink {
    pub issue_number: i64,
    pub spec_id: String,
    pub status: LinkStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecLinkRegistry {
    pub version: u32,
    pub mappings: Vec<SpecLink>,
}

impl SpecLinkRegistry {
    fn empty() -> Self {
        Self { version: REGISTRY_VERSION, mappings: Vec::new() }
    }

    fn find_by_issue(&self, issue_number: i64) -> Option<&SpecLink> {
        self.mappings.iter().find(|m| m.issue_number == issue_number)
    }

    fn find_by_spec(&self, spec_id: &str) -> Option<&SpecLink> {
        self.mappings.iter().find(|m| m.spec_id == spec_id)
    }
}

/// File-backed registry mapping GitHub issues to spec ids, stored at
/// `<root>/.moai/spec-links.json`.
pub struct SpecLinker {
    path: PathBuf,
}

impl SpecLinker {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { path: root.as_ref().join(".moai").join("spec-links.json") }
    }

    async fn load(&self) -> Result<SpecLinkRegistry, Error> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(SpecLinkRegistry::empty()),
            Err(e) => return Err(Error::Io(e)),
        };
        match serde_json::from_slice::<SpecLinkRegistry>(&bytes) {
            Ok(registry) => Ok(registry),
            Err(e) => {
                let corrupt_path = self.path.with_extension("json.corrupt");
                warn!(path = %self.path.display(), error = %e, "spec-links.json is corrupt, quarantining and starting fresh");
                let _ = std::fs::rename(&self.path, &corrupt_path);
                Ok(SpecLinkRegistry::empty())
            }
        }
    }

    async fn save(&self, registry: &SpecLinkRegistry) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut body = serde_json::to_string_pretty(registry)?;
        body.push('\n');
        moai_manifest::atomic::write_atomic(&self.path, body.as_bytes())?;
        Ok(())
    }

    pub async fn link(&self, issue_number: i64, spec_id: &str) -> Result<(), Error> {
        let mut registry = self.load().await?;
        if registry.find_by_issue(issue_number).is_some() {
            return Err(Error::MappingExists(issue_number));
        }
        registry.mappings.push(SpecLink { issue_number, spec_id: spec_id.to_string(), status: LinkStatus::Open });
        self.save(&registry).await
    }

    pub async fn set_status(&self, issue_number: i64, status: LinkStatus) -> Result<(), Error> {
        let mut registry = self.load().await?;
        let found = registry.mappings.iter_mut().find(|m| m.issue_number == issue_number);
        match found {
            Some(m) => {
                m.status = status;
                self.save(&registry).await
            }
            None => Err(Error::MappingNotFound(issue_number.to_string())),
        }
    }

    pub async fn lookup_by_issue(&self, issue_number: i64) -> Result<SpecLink, Error> {
        let registry = self.load().await?;
        registry
            .find_by_issue(issue_number)
            .cloned()
            .ok_or_else(|| Error::MappingNotFound(issue_number.to_string()))
    }

    pub async fn lookup_by_spec(&self, spec_id: &str) -> Result<SpecLink, Error> {
        let registry = self.load().await?;
        registry.find_by_spec(spec_id).cloned().ok_or_else(|| Error::MappingNotFound(spec_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn link_then_lookup_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let linker = SpecLinker::new(dir.path());
        linker.link(42, "spec-001").await.unwrap();
        let found = linker.lookup_by_issue(42).await.unwrap();
        assert_eq!(found.spec_id, "spec-001");
        assert_eq!(found.status, LinkStatus::Open);
    }

    #[tokio::test]
    async fn linking_same_issue_twice_fails() {
        let dir = tempfile::tempdir().unwrap();
        let linker = SpecLinker::new(dir.path());
        linker.link(42, "spec-001").await.unwrap();
        let err = linker.link(42, "spec-002").await.unwrap_err();
        assert!(matches!(err, Error::MappingExists(42)));
    }

    #[tokio::test]
    async fn lookup_missing_mapping_fails() {
        let dir = tempfile::tempdir().unwrap();
        let linker = SpecLinker::new(dir.path());
        let err = linker.lookup_by_issue(99).await.unwrap_err();
        assert!(matches!(err, Error::MappingNotFound(_)));
    }

    #[tokio::test]
    async fn set_status_updates_existing_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let linker = SpecLinker::new(dir.path());
        linker.link(7, "spec-007").await.unwrap();
        linker.set_status(7, LinkStatus::Closed).await.unwrap();
        let found = linker.lookup_by_issue(7).await.unwrap();
        assert_eq!(found.status, LinkStatus::Closed);
    }

    #[tokio::test]
    async fn corrupted_registry_is_quarantined_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let moai_dir = dir.path().join(".moai");
        tokio::fs::create_dir_all(&moai_dir).await.unwrap();
        tokio::fs::write(moai_dir.join("spec-links.json"), b"not json").await.unwrap();

        let linker = SpecLinker::new(dir.path());
        let registry = linker.load().await.unwrap();
        assert!(registry.mappings.is_empty());
        assert!(moai_dir.join("spec-links.json.corrupt").exists());
    }
}
