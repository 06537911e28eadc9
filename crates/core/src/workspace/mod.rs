//! Resolves the project a `moai` invocation applies to, before any command
//! acts on it: finds the project root, detects its project type, reads the
//! current git branch, and loads any agent rules file.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct WorkspaceContext {
    pub project_root: PathBuf,
    pub project_type: Option<ProjectType>,
    pub git_branch: Option<String>,
    pub has_moai_config: bool,
    pub rules: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectType {
    Rust,
    Node,
    Python,
    Go,
    Unknown,
}

impl ProjectType {
    pub fn name(&self) -> &'static str {
        match self {
            ProjectType::Rust => "rust",
            ProjectType::Node => "node",
            ProjectType::Python => "python",
            ProjectType::Go => "go",
            ProjectType::Unknown => "unknown",
        }
    }
}

pub fn detect_workspace(cwd: &Path) -> WorkspaceContext {
    let project_root = find_project_root(cwd);
    let project_type = detect_project_type(&project_root);
    let git_branch = detect_git_branch(&project_root);
    let has_moai_config = project_root.join(".moai").join("config.toml").exists();
    let rules = load_rules(&project_root);

    WorkspaceContext { project_root, project_type, git_branch, has_moai_config, rules }
}

fn find_project_root(start: &Path) -> PathBuf {
    let mut current = start.to_path_buf();
    loop {
        if current.join(".moai").is_dir() {
            return current;
        }
        if current.join(".git").exists() {
            return current;
        }
        if !current.pop() {
            return start.to_path_buf();
        }
    }
}

fn detect_project_type(root: &Path) -> Option<ProjectType> {
    if root.join("Cargo.toml").exists() {
        Some(ProjectType::Rust)
    } else if root.join("package.json").exists() {
        Some(ProjectType::Node)
    } else if root.join("pyproject.toml").exists()
        || root.join("setup.py").exists()
        || root.join("requirements.txt").exists()
    {
        Some(ProjectType::Python)
    } else if root.join("go.mod").exists() {
        Some(ProjectType::Go)
    } else {
        None
    }
}

fn detect_git_branch(root: &Path) -> Option<String> {
    let head_path = root.join(".git").join("HEAD");
    let content = std::fs::read_to_string(head_path).ok()?;
    let content = content.trim();
    if let Some(branch) = content.strip_prefix("ref: refs/heads/") {
        Some(branch.to_string())
    } else if content.len() >= 8 {
        Some(content[..8].to_string())
    } else {
        None
    }
}

pub fn load_rules(root: &Path) -> Option<String> {
    let candidates = [root.join("AGENTS.md"), root.join(".moai").join("rules.md")];

    for path in &candidates {
        if let Ok(content) = std::fs::read_to_string(path) {
            if !content.trim().is_empty() {
                return Some(content);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_rust_project_type_from_cargo_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "[package]\n").unwrap();
        let ctx = detect_workspace(dir.path());
        assert_eq!(ctx.project_type, Some(ProjectType::Rust));
    }

    #[test]
    fn falls_back_to_start_dir_when_nothing_found() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = detect_workspace(dir.path());
        assert_eq!(ctx.project_root, dir.path());
        assert!(!ctx.has_moai_config);
    }
}
