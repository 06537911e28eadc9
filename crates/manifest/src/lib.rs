//! Provenance-guarded deployment manifest.
//!
//! The manifest is the single source of truth for whether a file on disk
//! was placed by the template engine, mutated by a human afterward, or
//! created outside the engine entirely. [`Deployer`](https://docs.rs/moai-template)
//! consults it before every write; nothing else in the workspace is allowed
//! to decide that question on its own.

pub mod atomic;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub const MANIFEST_VERSION: &str = "1";

#[derive(Debug, Error)]
pub enum Error {
    #[error("manifest at {path} is not valid JSON: {source}")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("manifest at {0} is corrupted and cannot be recovered")]
    CorruptedState(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    TemplateManaged,
    UserModified,
    UserCreated,
}

impl Provenance {
    /// Files in either of these states are never overwritten by deployment.
    pub fn is_user_owned(self) -> bool {
        matches!(self, Provenance::UserModified | Provenance::UserCreated)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub provenance: Provenance,
    pub template_hash: String,
    pub deployed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ManifestDocument {
    version: String,
    deployed_at: DateTime<Utc>,
    files: BTreeMap<String, FileEntry>,
}

impl Default for ManifestDocument {
    fn default() -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            deployed_at: Utc::now(),
            files: BTreeMap::new(),
        }
    }
}

/// In-memory manifest, backed by `<project_root>/.moai/manifest.json`.
///
/// `Load` adopts an absent file as a fresh manifest; a present-but-corrupt
/// file is a hard error so the caller can decide whether to rename-and-
/// recover (see [`Manifest::load_or_recover`]).
pub struct Manifest {
    path: PathBuf,
    doc: ManifestDocument,
}

impl Manifest {
    pub fn manifest_path(project_root: &Path) -> PathBuf {
        project_root.join(".moai").join("manifest.json")
    }

    /// Loads the manifest for `project_root`. Returns a fresh, empty manifest
    /// when no file exists yet. Fails if the file exists and does not parse.
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = Self::manifest_path(project_root);
        if !path.exists() {
            return Ok(Self {
                path,
                doc: ManifestDocument::default(),
            });
        }
        let content = std::fs::read_to_string(&path)?;
        let doc: ManifestDocument =
            serde_json::from_str(&content).map_err(|source| Error::InvalidJson {
                path: path.clone(),
                source,
            })?;
        Ok(Self { path, doc })
    }

    /// Loads the manifest, recovering from a corrupt file by renaming it
    /// `<name>.corrupt` and starting fresh — the same recovery shape the
    /// spec-linker registry uses (see `moai-remote`).
    pub fn load_or_recover(project_root: &Path) -> Result<Self> {
        match Self::load(project_root) {
            Ok(manifest) => Ok(manifest),
            Err(Error::InvalidJson { path, .. }) => {
                let corrupt = path.with_extension("json.corrupt");
                std::fs::rename(&path, &corrupt)?;
                tracing::warn!(
                    original = %path.display(),
                    recovered = %corrupt.display(),
                    "manifest was corrupted; renamed and starting fresh"
                );
                Ok(Self {
                    path,
                    doc: ManifestDocument::default(),
                })
            }
            Err(other) => Err(other),
        }
    }

    /// Whole-entry upsert. Always refreshes `deployed_at`.
    pub fn track(&mut self, path: impl Into<String>, provenance: Provenance, template_hash: impl Into<String>) {
        let entry = FileEntry {
            provenance,
            template_hash: template_hash.into(),
            deployed_at: Utc::now(),
        };
        self.doc.files.insert(normalize(&path.into()), entry);
    }

    pub fn get_entry(&self, path: &str) -> Option<&FileEntry> {
        self.doc.files.get(&normalize(path))
    }

    pub fn iter_entries(&self) -> impl Iterator<Item = (&String, &FileEntry)> {
        self.doc.files.iter()
    }

    pub fn len(&self) -> usize {
        self.doc.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc.files.is_empty()
    }

    /// Sets the top-level `version`/`deployed_at` stamp without touching any
    /// file entry — the initializer's finalize step.
    pub fn finalize(&mut self, version: impl Into<String>) {
        self.doc.version = version.into();
        self.doc.deployed_at = Utc::now();
    }

    /// Merges `other`'s entries into self, `other` winning on conflicts.
    /// Used to recombine a manifest that was reloaded from disk with the
    /// in-memory entries accumulated during deployment, so a reload at
    /// finalize time can never discard in-flight `track` calls.
    pub fn merge_from(&mut self, other: &Manifest) {
        for (path, entry) in &other.doc.files {
            self.doc.files.insert(path.clone(), entry.clone());
        }
    }

    /// Serializes and atomically writes the manifest to disk. The file
    /// always ends with a trailing newline.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut bytes = serde_json::to_vec_pretty(&self.doc)?;
        bytes.push(b'\n');
        atomic::write_atomic(&self.path, &bytes)?;
        Ok(())
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Error::InvalidJson {
            path: PathBuf::new(),
            source,
        }
    }
}

/// POSIX-normalizes a path (forward slashes, regardless of platform).
fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

/// Lowercase hex SHA-256 of `data`.
pub fn hash_bytes(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_then_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = Manifest::load(dir.path()).unwrap();
        manifest.track("AGENTS.md", Provenance::TemplateManaged, hash_bytes(b"hello"));
        manifest.track(".moai/config/sections/user.yaml", Provenance::UserModified, hash_bytes(b"x"));
        manifest.save().unwrap();

        let content = std::fs::read_to_string(Manifest::manifest_path(dir.path())).unwrap();
        assert!(content.ends_with('\n'));
        let _: serde_json::Value = serde_json::from_str(&content).unwrap();

        let reloaded = Manifest::load(dir.path()).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(
            reloaded.get_entry("AGENTS.md").unwrap().provenance,
            Provenance::TemplateManaged
        );
    }

    #[test]
    fn survives_reload_merge_at_finalize() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = Manifest::load(dir.path()).unwrap();
        for i in 0..20 {
            manifest.track(format!("file-{i}.txt"), Provenance::TemplateManaged, hash_bytes(b"a"));
        }
        manifest.save().unwrap();

        // Simulate a second process reloading mid-deployment and merging,
        // rather than replacing, the in-memory set.
        let mut reloaded = Manifest::load(dir.path()).unwrap();
        reloaded.merge_from(&manifest);
        reloaded.finalize(MANIFEST_VERSION);
        reloaded.save().unwrap();

        let final_manifest = Manifest::load(dir.path()).unwrap();
        assert_eq!(final_manifest.len(), 20);
    }

    #[test]
    fn missing_file_loads_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = Manifest::load(dir.path()).unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn corrupt_file_is_rejected_by_load_but_recovered_by_load_or_recover() {
        let dir = tempfile::tempdir().unwrap();
        let path = Manifest::manifest_path(dir.path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"{ not json").unwrap();

        assert!(Manifest::load(dir.path()).is_err());

        let recovered = Manifest::load_or_recover(dir.path()).unwrap();
        assert!(recovered.is_empty());
        assert!(path.with_extension("json.corrupt").exists());
    }

    #[test]
    fn paths_are_stored_with_forward_slashes() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = Manifest::load(dir.path()).unwrap();
        manifest.track("a\\b\\c.txt", Provenance::TemplateManaged, hash_bytes(b"x"));
        assert!(manifest.get_entry("a/b/c.txt").is_some());
    }

    #[test]
    fn user_owned_provenance_is_protected() {
        assert!(Provenance::UserModified.is_user_owned());
        assert!(Provenance::UserCreated.is_user_owned());
        assert!(!Provenance::TemplateManaged.is_user_owned());
    }
}
