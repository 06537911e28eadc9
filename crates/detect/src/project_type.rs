//! Structural classification: first match wins, per spec.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Cli,
    WebApp,
    Api,
    Library,
}

pub fn classify_project_type(root: &Path) -> ProjectType {
    if root.join("cmd").is_dir() || root.join("main.go").is_file() {
        return ProjectType::Cli;
    }
    if root.join("public").is_dir() || root.join("src/pages").is_dir() {
        return ProjectType::WebApp;
    }
    if root.join("api").is_dir() || root.join("routes").is_dir() {
        return ProjectType::Api;
    }
    ProjectType::Library
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmd_dir_wins_as_cli() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("cmd")).unwrap();
        std::fs::create_dir_all(dir.path().join("public")).unwrap();
        assert_eq!(classify_project_type(dir.path()), ProjectType::Cli);
    }

    #[test]
    fn public_dir_is_web_app() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("public")).unwrap();
        assert_eq!(classify_project_type(dir.path()), ProjectType::WebApp);
    }

    #[test]
    fn routes_dir_is_api() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("routes")).unwrap();
        assert_eq!(classify_project_type(dir.path()), ProjectType::Api);
    }

    #[test]
    fn nothing_matching_is_library() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(classify_project_type(dir.path()), ProjectType::Library);
    }
}
