use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::context::GateContext;
use crate::types::{Issue, Principle, PrincipleResult, Severity};
use crate::validator::PrincipleValidator;

pub struct TestedValidator;

#[async_trait]
impl PrincipleValidator for TestedValidator {
    fn name(&self) -> Principle {
        Principle::Tested
    }

    async fn validate(&self, ctx: &GateContext) -> PrincipleResult {
        let score = (ctx.coverage_percent / 100.0).clamp(0.0, 1.0);
        let mut issues = Vec::new();
        if ctx.type_error_count > 0 {
            issues.push(Issue {
                file: String::new(),
                line: 0,
                severity: Severity::Error,
                message: format!("{} type error(s) detected", ctx.type_error_count),
                rule: "type-error".to_string(),
            });
        }
        PrincipleResult { name: self.name(), passed: issues.is_empty() && score >= 0.7, score, issues }
    }
}

pub struct ReadableValidator;

#[async_trait]
impl PrincipleValidator for ReadableValidator {
    fn name(&self) -> Principle {
        Principle::Readable
    }

    async fn validate(&self, ctx: &GateContext) -> PrincipleResult {
        let score = (1.0 - (ctx.lint_error_count as f64 / 10.0)).clamp(0.0, 1.0);
        let mut issues = Vec::new();
        if ctx.lint_error_count > 0 {
            issues.push(Issue {
                file: String::new(),
                line: 0,
                severity: Severity::Warning,
                message: format!("{} lint error(s) found", ctx.lint_error_count),
                rule: "lint-density".to_string(),
            });
        }
        PrincipleResult { name: self.name(), passed: score >= 0.7, score, issues }
    }
}

pub struct UnderstandableValidator;

#[async_trait]
impl PrincipleValidator for UnderstandableValidator {
    fn name(&self) -> Principle {
        Principle::Understandable
    }

    async fn validate(&self, ctx: &GateContext) -> PrincipleResult {
        if ctx.complexity_sample.is_empty() {
            return PrincipleResult { name: self.name(), passed: true, score: 1.0, issues: Vec::new() };
        }
        let avg = ctx.complexity_sample.iter().sum::<u32>() as f64 / ctx.complexity_sample.len() as f64;
        let score = (1.0 - (avg / 20.0)).clamp(0.0, 1.0);
        let mut issues = Vec::new();
        if avg > 10.0 {
            issues.push(Issue {
                file: String::new(),
                line: 0,
                severity: Severity::Warning,
                message: format!("average cyclomatic complexity {avg:.1} exceeds 10"),
                rule: "complexity".to_string(),
            });
        }
        PrincipleResult { name: self.name(), passed: score >= 0.7, score, issues }
    }
}

pub struct SecuredValidator;

#[async_trait]
impl PrincipleValidator for SecuredValidator {
    fn name(&self) -> Principle {
        Principle::Secured
    }

    async fn validate(&self, ctx: &GateContext) -> PrincipleResult {
        let count = ctx.security_diagnostic_count
            + ctx.current.as_ref().map(|s| s.security_warnings).unwrap_or(0);
        let issues: Vec<Issue> = (0..count)
            .map(|i| Issue {
                file: String::new(),
                line: 0,
                severity: Severity::Error,
                message: format!("security diagnostic #{}", i + 1),
                rule: "security".to_string(),
            })
            .collect();
        let passed = issues.is_empty();
        PrincipleResult { name: self.name(), passed, score: if passed { 1.0 } else { 0.0 }, issues }
    }
}

static CONVENTIONAL_COMMIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(feat|fix|build|chore|ci|docs|style|refactor|perf|test)(\([\w./-]+\))?!?: .+$").unwrap()
});

pub struct TrackableValidator;

#[async_trait]
impl PrincipleValidator for TrackableValidator {
    fn name(&self) -> Principle {
        Principle::Trackable
    }

    async fn validate(&self, ctx: &GateContext) -> PrincipleResult {
        let matches = CONVENTIONAL_COMMIT.is_match(ctx.last_commit_message.trim());
        let mut issues = Vec::new();
        if !matches {
            issues.push(Issue {
                file: String::new(),
                line: 0,
                severity: Severity::Warning,
                message: format!("commit message does not follow Conventional Commits: {:?}", ctx.last_commit_message),
                rule: "conventional-commits".to_string(),
            });
        }
        PrincipleResult { name: self.name(), passed: matches, score: if matches { 1.0 } else { 0.0 }, issues }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trackable_accepts_conventional_commit() {
        let mut ctx = GateContext::default();
        ctx.last_commit_message = "feat(cli): add init command".to_string();
        let result = TrackableValidator.validate(&ctx).await;
        assert!(result.passed);
        assert!(result.issues.is_empty());
    }

    #[tokio::test]
    async fn trackable_rejects_non_conventional_commit() {
        let mut ctx = GateContext::default();
        ctx.last_commit_message = "did stuff".to_string();
        let result = TrackableValidator.validate(&ctx).await;
        assert!(!result.passed);
        assert_eq!(result.issues.len(), 1);
    }

    #[tokio::test]
    async fn secured_emits_an_issue_per_diagnostic() {
        let mut ctx = GateContext::default();
        ctx.security_diagnostic_count = 3;
        let result = SecuredValidator.validate(&ctx).await;
        assert_eq!(result.issues.len(), 3);
        assert!(!result.passed);
    }

    #[tokio::test]
    async fn tested_scores_from_coverage_percent() {
        let mut ctx = GateContext::default();
        ctx.coverage_percent = 85.0;
        let result = TestedValidator.validate(&ctx).await;
        assert_eq!(result.score, 0.85);
        assert!(result.passed);
    }
}
