//! TDD/DDD methodology advisor (C5): scans test/code file counts against a
//! per-language classification table and recommends a development mode with
//! a confidence and rationale.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::walk::{walk_project, WalkedFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevelopmentMode {
    Tdd,
    Ddd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectMaturity {
    Greenfield,
    Brownfield,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alternative {
    pub mode: DevelopmentMode,
    pub reason: String,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodologyRecommendation {
    pub recommended: DevelopmentMode,
    pub confidence: f64,
    pub rationale: String,
    pub project_type: ProjectMaturity,
    pub test_file_count: usize,
    pub code_file_count: usize,
    pub coverage_estimate: f64,
    pub alternatives: Vec<Alternative>,
}

struct TestCodeRule {
    language: &'static str,
    is_test: fn(&str) -> bool,
    is_code: fn(&str) -> bool,
}

fn is_code_ext(rel: &str, exts: &[&str]) -> bool {
    Path::new(rel)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| exts.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

const RULES: &[TestCodeRule] = &[
    TestCodeRule {
        language: "Go",
        is_test: |p| p.ends_with("_test.go"),
        is_code: |p| p.ends_with(".go") && !p.ends_with("_test.go"),
    },
    TestCodeRule {
        language: "Python",
        is_test: |p| {
            let name = p.rsplit('/').next().unwrap_or(p);
            name.starts_with("test_") || name.ends_with("_test.py")
        },
        is_code: |p| is_code_ext(p, &["py"]) && {
            let name = p.rsplit('/').next().unwrap_or(p);
            !(name.starts_with("test_") || name.ends_with("_test.py"))
        },
    },
    TestCodeRule {
        language: "TypeScript",
        is_test: |p| {
            (p.ends_with(".test.ts") || p.ends_with(".spec.ts") || p.ends_with(".test.tsx") || p.ends_with(".spec.tsx"))
                && !p.ends_with(".d.ts")
        },
        is_code: |p| {
            is_code_ext(p, &["ts", "tsx"])
                && !p.ends_with(".d.ts")
                && !(p.ends_with(".test.ts") || p.ends_with(".spec.ts") || p.ends_with(".test.tsx") || p.ends_with(".spec.tsx"))
        },
    },
    TestCodeRule {
        language: "Java",
        is_test: |p| {
            let stem = p.trim_end_matches(".java").trim_end_matches(".kt");
            stem.ends_with("Test") || stem.ends_with("Tests")
        },
        is_code: |p| is_code_ext(p, &["java"]) && {
            let stem = p.trim_end_matches(".java");
            !(stem.ends_with("Test") || stem.ends_with("Tests"))
        },
    },
    TestCodeRule {
        language: "Kotlin",
        is_test: |p| {
            let stem = p.trim_end_matches(".kt");
            stem.ends_with("Test") || stem.ends_with("Tests")
        },
        is_code: |p| is_code_ext(p, &["kt"]) && {
            let stem = p.trim_end_matches(".kt");
            !(stem.ends_with("Test") || stem.ends_with("Tests"))
        },
    },
    TestCodeRule {
        language: "C#",
        is_test: |p| {
            let stem = p.trim_end_matches(".cs");
            stem.ends_with("Test") || stem.ends_with("Tests")
        },
        is_code: |p| is_code_ext(p, &["cs"]) && {
            let stem = p.trim_end_matches(".cs");
            !(stem.ends_with("Test") || stem.ends_with("Tests"))
        },
    },
    TestCodeRule {
        language: "Rust",
        is_test: |p| p.to_lowercase().contains("test"),
        is_code: |p| is_code_ext(p, &["rs"]),
    },
];

fn rules_for(language: Option<&str>) -> Vec<&'static TestCodeRule> {
    match language.and_then(|lang| RULES.iter().find(|r| r.language == lang)) {
        Some(rule) => vec![rule],
        None => RULES.iter().collect(),
    }
}

fn count_test_and_code(files: &[WalkedFile], language: Option<&str>) -> (usize, usize) {
    let rules = rules_for(language);
    let mut test_files = 0usize;
    let mut code_files = 0usize;
    for file in files {
        let is_test = rules.iter().any(|r| (r.is_test)(&file.rel_path));
        let is_code = !is_test && rules.iter().any(|r| (r.is_code)(&file.rel_path));
        if is_test {
            test_files += 1;
        } else if is_code {
            code_files += 1;
        }
    }
    (test_files, code_files)
}

/// `min(100, 100 * 0.2 * t / c)`, `0` when `c == 0`.
pub fn coverage_estimate(test_files: usize, code_files: usize) -> f64 {
    if code_files == 0 {
        return 0.0;
    }
    (100.0 * 0.2 * test_files as f64 / code_files as f64).min(100.0)
}

pub fn recommend(root: &Path, primary_language: Option<&str>) -> MethodologyRecommendation {
    let files = walk_project(root);
    let (test_file_count, code_file_count) = count_test_and_code(&files, primary_language);

    if code_file_count == 0 {
        return MethodologyRecommendation {
            recommended: DevelopmentMode::Tdd,
            confidence: 0.85,
            rationale: "no existing code; test-first development has no legacy behavior to characterize".to_string(),
            project_type: ProjectMaturity::Greenfield,
            test_file_count,
            code_file_count,
            coverage_estimate: 0.0,
            alternatives: vec![],
        };
    }

    let coverage = coverage_estimate(test_file_count, code_file_count);

    let (recommended, confidence, rationale, alternatives) = if coverage >= 50.0 {
        (
            DevelopmentMode::Tdd,
            0.85,
            "existing test coverage is strong enough to extend test-first".to_string(),
            vec![],
        )
    } else if coverage >= 10.0 {
        (
            DevelopmentMode::Tdd,
            0.75,
            "moderate existing coverage supports test-first development".to_string(),
            vec![],
        )
    } else {
        let needed = code_file_count * 5;
        (
            DevelopmentMode::Ddd,
            0.9,
            "low existing coverage; characterize current behavior before refactoring".to_string(),
            vec![Alternative {
                mode: DevelopmentMode::Tdd,
                reason: "test-first is possible but requires substantial new test coverage first".to_string(),
                warning: Some(format!("estimated {needed} tests required to reach test-first coverage")),
            }],
        )
    };

    MethodologyRecommendation {
        recommended,
        confidence,
        rationale,
        project_type: ProjectMaturity::Brownfield,
        test_file_count,
        code_file_count,
        coverage_estimate: coverage,
        alternatives,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch_many(root: &Path, prefix: &str, n: usize, ext: &str) {
        for i in 0..n {
            std::fs::write(root.join(format!("{prefix}{i}.{ext}")), "").unwrap();
        }
    }

    #[test]
    fn zero_code_files_recommends_tdd_greenfield() {
        let dir = tempfile::tempdir().unwrap();
        let rec = recommend(dir.path(), Some("Go"));
        assert_eq!(rec.recommended, DevelopmentMode::Tdd);
        assert_eq!(rec.project_type, ProjectMaturity::Greenfield);
        assert!(rec.confidence >= 0.7);
    }

    #[test]
    fn six_code_zero_tests_recommends_ddd_brownfield() {
        let dir = tempfile::tempdir().unwrap();
        touch_many(dir.path(), "file", 6, "go");
        let rec = recommend(dir.path(), Some("Go"));
        assert_eq!(rec.recommended, DevelopmentMode::Ddd);
        assert_eq!(rec.project_type, ProjectMaturity::Brownfield);
        assert!(rec.coverage_estimate < 10.0);
        assert!(rec.alternatives.iter().any(|a| a.warning.is_some()));
    }

    #[test]
    fn four_code_ten_tests_is_fifty_percent_coverage_tdd() {
        let dir = tempfile::tempdir().unwrap();
        touch_many(dir.path(), "file", 4, "go");
        touch_many(dir.path(), "thing_test", 10, "go");
        let rec = recommend(dir.path(), Some("Go"));
        assert_eq!(rec.coverage_estimate, 50.0);
        assert_eq!(rec.recommended, DevelopmentMode::Tdd);
        assert!(rec.confidence >= 0.8);
    }

    #[test]
    fn twenty_code_twelve_tests_is_moderate_coverage_tdd() {
        let dir = tempfile::tempdir().unwrap();
        touch_many(dir.path(), "file", 20, "go");
        touch_many(dir.path(), "thing_test", 12, "go");
        let rec = recommend(dir.path(), Some("Go"));
        assert!(rec.coverage_estimate >= 10.0 && rec.coverage_estimate < 50.0);
        assert_eq!(rec.recommended, DevelopmentMode::Tdd);
    }

    #[test]
    fn coverage_formula_matches_spec() {
        assert_eq!(coverage_estimate(10, 4), 50.0);
        assert_eq!(coverage_estimate(5, 0), 0.0);
    }

    #[test]
    fn unknown_language_falls_back_to_scanning_all_rules() {
        let dir = tempfile::tempdir().unwrap();
        touch_many(dir.path(), "file", 2, "rs");
        let rec = recommend(dir.path(), Some("COBOL"));
        assert_eq!(rec.code_file_count, 2);
    }
}
