//! Project detection (C4) and methodology advisor (C5): walks a project
//! tree, censuses languages and frameworks, classifies its structural shape,
//! and recommends a development mode.

pub mod framework;
pub mod language;
pub mod methodology;
pub mod project_type;
pub mod walk;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use framework::Framework;
pub use language::Language;
pub use methodology::{Alternative, DevelopmentMode, MethodologyRecommendation, ProjectMaturity};
pub use project_type::ProjectType;
pub use walk::WalkedFile;

#[derive(Debug, Error)]
pub enum Error {
    #[error("project root does not exist or is not a directory: {0}")]
    InvalidRoot(PathBuf),
    #[error("no language could be detected under {0}")]
    NoLanguageFound(PathBuf),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectReport {
    pub root: PathBuf,
    pub languages: Vec<Language>,
    pub primary_language: Option<String>,
    pub frameworks: Vec<Framework>,
    pub project_type: ProjectType,
    pub methodology: MethodologyRecommendation,
    pub file_count: usize,
}

/// Runs the full detection pipeline: walk, language census, framework scan,
/// structural classification, methodology recommendation.
pub fn detect_project(root: &Path) -> Result<ProjectReport, Error> {
    if !root.is_dir() {
        return Err(Error::InvalidRoot(root.to_path_buf()));
    }

    let files = walk::walk_project(root);
    let languages = language::detect_languages(root, &files);
    let primary_language = languages.first().map(|l| l.name.clone());

    if languages.is_empty() {
        return Err(Error::NoLanguageFound(root.to_path_buf()));
    }

    let frameworks = framework::detect_frameworks(root);
    let project_type = project_type::classify_project_type(root);
    let methodology = methodology::recommend(root, primary_language.as_deref());

    Ok(ProjectReport {
        root: root.to_path_buf(),
        languages,
        primary_language,
        frameworks,
        project_type,
        methodology,
        file_count: files.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_directory_yields_no_language_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = detect_project(dir.path()).unwrap_err();
        assert!(matches!(err, Error::NoLanguageFound(_)));
    }

    #[test]
    fn missing_root_is_invalid() {
        let err = detect_project(Path::new("/nonexistent/does/not/exist")).unwrap_err();
        assert!(matches!(err, Error::InvalidRoot(_)));
    }

    #[test]
    fn full_pipeline_on_a_small_rust_cli_project() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("cmd")).unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "axum = \"0.7\"\n").unwrap();
        std::fs::write(dir.path().join("main.rs"), "fn main() {}").unwrap();

        let report = detect_project(dir.path()).unwrap();
        assert_eq!(report.primary_language.as_deref(), Some("Rust"));
        assert_eq!(report.project_type, ProjectType::Cli);
        assert!(report.frameworks.iter().any(|f| f.name == "Axum"));
        assert_eq!(report.methodology.project_type, ProjectMaturity::Greenfield);
    }
}
