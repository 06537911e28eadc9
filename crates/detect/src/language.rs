//! Language detection: extension census plus sentinel-file presence.
//!
//! The extension table is a declarative `const` slice rather than a closed
//! match arm, since the sentinel-file table is open-ended and growing it
//! should never touch match arms.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::walk::WalkedFile;

pub const EXTENSION_LANGUAGES: &[(&str, &str)] = &[
    ("rs", "Rust"),
    ("go", "Go"),
    ("py", "Python"),
    ("ts", "TypeScript"),
    ("tsx", "TypeScript"),
    ("js", "JavaScript"),
    ("jsx", "JavaScript"),
    ("java", "Java"),
    ("kt", "Kotlin"),
    ("kts", "Kotlin"),
    ("rb", "Ruby"),
    ("php", "PHP"),
    ("swift", "Swift"),
    ("dart", "Dart"),
    ("ex", "Elixir"),
    ("exs", "Elixir"),
    ("scala", "Scala"),
    ("hs", "Haskell"),
    ("zig", "Zig"),
    ("cs", "C#"),
    ("c", "C"),
    ("h", "C"),
    ("cpp", "C++"),
    ("cc", "C++"),
    ("hpp", "C++"),
];

pub const SENTINEL_FILES: &[(&str, &str)] = &[
    ("package.json", "JavaScript"),
    ("go.mod", "Go"),
    ("pyproject.toml", "Python"),
    ("requirements.txt", "Python"),
    ("Cargo.toml", "Rust"),
    ("pom.xml", "Java"),
    ("build.gradle", "Java"),
    ("build.gradle.kts", "Kotlin"),
    ("Gemfile", "Ruby"),
    ("composer.json", "PHP"),
    ("Package.swift", "Swift"),
    ("pubspec.yaml", "Dart"),
    ("mix.exs", "Elixir"),
    ("build.sbt", "Scala"),
    ("stack.yaml", "Haskell"),
    ("build.zig", "Zig"),
];

/// TypeScript-configuration sentinels: when present alongside a JavaScript
/// presence, every JavaScript count is reassigned to TypeScript.
const TS_CONFIG_FILES: &[&str] = &["tsconfig.json"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    pub confidence: f64,
    pub file_count: usize,
}

fn extension_language(path: &str) -> Option<&'static str> {
    let ext = Path::new(path).extension()?.to_str()?;
    EXTENSION_LANGUAGES
        .iter()
        .find(|(e, _)| e.eq_ignore_ascii_case(ext))
        .map(|(_, name)| *name)
}

/// Detects languages present under `root` from `files` (already walked).
/// Confidence is `count / total`; ties are broken lexicographically by name.
pub fn detect_languages(root: &Path, files: &[WalkedFile]) -> Vec<Language> {
    let mut counts: HashMap<&'static str, usize> = HashMap::new();

    for file in files {
        if let Some(lang) = extension_language(&file.rel_path) {
            *counts.entry(lang).or_insert(0) += 1;
        }
    }

    for (sentinel, lang) in SENTINEL_FILES {
        if root.join(sentinel).exists() {
            let count = counts.entry(lang).or_insert(0);
            if *count == 0 {
                *count = 1;
            }
        }
    }

    let has_ts_config = TS_CONFIG_FILES.iter().any(|f| root.join(f).exists());
    if has_ts_config && counts.contains_key("JavaScript") {
        let js_count = counts.remove("JavaScript").unwrap_or(0);
        *counts.entry("TypeScript").or_insert(0) += js_count;
    }

    let total: usize = counts.values().sum();
    let mut languages: Vec<Language> = counts
        .into_iter()
        .map(|(name, file_count)| Language {
            name: name.to_string(),
            confidence: if total > 0 { file_count as f64 / total as f64 } else { 0.0 },
            file_count,
        })
        .collect();

    languages.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    languages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walk::walk_project;

    #[test]
    fn sorted_by_confidence_desc_then_name_asc() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "").unwrap();
        std::fs::write(dir.path().join("b.rs"), "").unwrap();
        std::fs::write(dir.path().join("c.go"), "").unwrap();
        let files = walk_project(dir.path());
        let langs = detect_languages(dir.path(), &files);
        assert_eq!(langs[0].name, "Rust");
        assert_eq!(langs[0].file_count, 2);
        assert_eq!(langs[1].name, "Go");
    }

    #[test]
    fn typescript_config_reassigns_javascript_counts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tsconfig.json"), "{}").unwrap();
        std::fs::write(dir.path().join("index.js"), "").unwrap();
        std::fs::write(dir.path().join("app.ts"), "").unwrap();
        let files = walk_project(dir.path());
        let langs = detect_languages(dir.path(), &files);
        assert!(langs.iter().all(|l| l.name != "JavaScript"));
        let ts = langs.iter().find(|l| l.name == "TypeScript").unwrap();
        assert_eq!(ts.file_count, 2);
    }

    #[test]
    fn sentinel_file_guarantees_nonzero_count() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("go.mod"), "module x").unwrap();
        let files = walk_project(dir.path());
        let langs = detect_languages(dir.path(), &files);
        let go = langs.iter().find(|l| l.name == "Go").unwrap();
        assert!(go.file_count >= 1);
    }
}
