//! Framework detection by scanning well-known config files for dependency
//! strings against a declarative dependency→framework table.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Framework {
    pub name: String,
    pub version: Option<String>,
    pub config_file: String,
}

struct ConfigSource {
    file: &'static str,
    deps: &'static [(&'static str, &'static str)],
}

const SOURCES: &[ConfigSource] = &[
    ConfigSource {
        file: "package.json",
        deps: &[("react", "React"), ("next", "Next.js"), ("vue", "Vue"), ("express", "Express")],
    },
    ConfigSource {
        file: "go.mod",
        deps: &[("gin-gonic/gin", "Gin"), ("labstack/echo", "Echo")],
    },
    ConfigSource {
        file: "pyproject.toml",
        deps: &[("fastapi", "FastAPI"), ("django", "Django"), ("flask", "Flask")],
    },
    ConfigSource {
        file: "requirements.txt",
        deps: &[("fastapi", "FastAPI"), ("django", "Django"), ("flask", "Flask")],
    },
    ConfigSource {
        file: "Cargo.toml",
        deps: &[("axum", "Axum"), ("actix-web", "Actix Web"), ("rocket", "Rocket")],
    },
];

pub fn detect_frameworks(root: &Path) -> Vec<Framework> {
    let mut frameworks = Vec::new();
    for source in SOURCES {
        let path = root.join(source.file);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(_) => continue,
        };
        for (needle, name) in source.deps {
            if content.contains(needle) {
                frameworks.push(Framework {
                    name: name.to_string(),
                    version: extract_version(&content, needle),
                    config_file: source.file.to_string(),
                });
            }
        }
    }
    frameworks
}

/// Best-effort version extraction: looks for `"<needle>": "<version>"` or
/// `<needle> = "<version>"` on the same line as the dependency name.
fn extract_version(content: &str, needle: &str) -> Option<String> {
    for line in content.lines() {
        if !line.contains(needle) {
            continue;
        }
        let mut parts = line.splitn(2, ':').skip(1);
        let candidate = parts
            .next()
            .or_else(|| line.splitn(2, '=').nth(1))?;
        let version: String = candidate
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || c.is_ascii_alphabetic())
            .collect();
        if !version.is_empty() {
            return Some(version);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_react_from_package_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("package.json"),
            r#"{"dependencies": {"react": "18.2.0"}}"#,
        )
        .unwrap();
        let frameworks = detect_frameworks(dir.path());
        assert!(frameworks.iter().any(|f| f.name == "React"));
    }

    #[test]
    fn detects_axum_from_cargo_toml() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "axum = \"0.7\"\n").unwrap();
        let frameworks = detect_frameworks(dir.path());
        assert!(frameworks.iter().any(|f| f.name == "Axum"));
    }

    #[test]
    fn no_config_file_yields_no_frameworks() {
        let dir = tempfile::tempdir().unwrap();
        assert!(detect_frameworks(dir.path()).is_empty());
    }
}
