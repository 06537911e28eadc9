//! Shared directory-walk policy for the detector and the methodology
//! advisor: recursive `read_dir`, skip dot-directories and a fixed
//! exclusion set, ignore single-entry errors and keep walking.

use std::path::{Path, PathBuf};

pub const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".moai",
    ".claude",
    "node_modules",
    "vendor",
    ".venv",
    "__pycache__",
    "target",
    "build",
    "dist",
    ".next",
];

#[derive(Debug, Clone)]
pub struct WalkedFile {
    pub rel_path: String,
    pub abs_path: PathBuf,
}

/// Walks `root`, yielding every regular file. The root itself is never
/// excluded even though its name might otherwise match the dotfile rule.
pub fn walk_project(root: &Path) -> Vec<WalkedFile> {
    let mut out = Vec::new();
    walk_dir(root, root, &mut out);
    out.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    out
}

fn walk_dir(root: &Path, dir: &Path, out: &mut Vec<WalkedFile>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let name = entry.file_name();
        let name_str = name.to_string_lossy();

        if path.is_dir() {
            if should_skip_dir(&name_str) {
                continue;
            }
            walk_dir(root, &path, out);
        } else if path.is_file() {
            let rel = match path.strip_prefix(root) {
                Ok(r) => r.to_string_lossy().replace('\\', "/"),
                Err(_) => continue,
            };
            out.push(WalkedFile { rel_path: rel, abs_path: path });
        }
    }
}

fn should_skip_dir(name: &str) -> bool {
    name.starts_with('.') || EXCLUDED_DIRS.contains(&name)
}
