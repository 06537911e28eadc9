use std::path::PathBuf;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use tokio::process::Command;

use crate::classify::classify_gh_stderr;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMethod {
    Merge,
    Squash,
    Rebase,
}

impl MergeMethod {
    fn flag(self) -> &'static str {
        match self {
            MergeMethod::Merge => "--merge",
            MergeMethod::Squash => "--squash",
            MergeMethod::Rebase => "--rebase",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiConclusion {
    Pass,
    Pending,
    Fail,
}

/// Derives the overall CI conclusion from each check's reported conclusion
/// (empty string means still running): any failure wins, then any pending,
/// else pass.
pub fn derive_ci_conclusion(conclusions: &[&str]) -> CiConclusion {
    if conclusions.iter().any(|c| matches!(*c, "failure" | "cancelled" | "timed_out")) {
        return CiConclusion::Fail;
    }
    if conclusions.iter().any(|c| c.is_empty()) {
        return CiConclusion::Pending;
    }
    CiConclusion::Pass
}

/// Extracts the PR number from a `gh pr create` URL: the path segment right
/// after a literal `/pull/` segment.
pub fn pr_number_from_url(url: &str) -> Option<u64> {
    let (_, rest) = url.split_once("/pull/")?;
    let segment = rest.split('/').next()?;
    segment.parse().ok()
}

/// Everything the issue-closer and PR-lifecycle commands need from a GitHub
/// host. Kept as a trait, not inherent methods on [`GhClient`] directly, so
/// call sites can be driven by a fake in tests instead of shelling out.
#[async_trait]
pub trait GhOps: Send + Sync {
    async fn is_authenticated(&self) -> Result<bool, Error>;
    async fn pr_create(&self, title: &str, body: &str, base: &str) -> Result<u64, Error>;
    async fn pr_view(&self, number: u64) -> Result<String, Error>;
    async fn pr_merge(&self, number: u64, method: MergeMethod, delete_branch: bool) -> Result<(), Error>;
    async fn pr_checks(&self, number: u64) -> Result<CiConclusion, Error>;
    async fn push(&self) -> Result<(), Error>;
    async fn comment_issue(&self, number: u64, body: &str) -> Result<(), Error>;
    async fn label_issue(&self, number: u64, label: &str) -> Result<(), Error>;
    async fn close_issue(&self, number: u64) -> Result<(), Error>;
}

/// Thin wrapper over the `gh` subprocess. The binary path is resolved once
/// and cached; every call shells out fresh (no persistent process).
pub struct GhClient {
    binary: OnceCell<PathBuf>,
}

impl GhClient {
    pub fn new() -> Self {
        Self { binary: OnceCell::new() }
    }

    fn resolve_binary(&self) -> Result<&PathBuf, Error> {
        self.binary.get_or_try_init(|| which::which("gh").map_err(|_| Error::GhNotFound))
    }

    async fn run(&self, args: &[&str]) -> Result<String, Error> {
        let binary = self.resolve_binary()?.clone();
        let output = Command::new(binary).args(args).output().await?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        Err(classify_gh_stderr(&stderr).unwrap_or(Error::GhExec(stderr)))
    }
}

impl Default for GhClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GhOps for GhClient {
    async fn is_authenticated(&self) -> Result<bool, Error> {
        match self.run(&["auth", "status"]).await {
            Ok(_) => Ok(true),
            Err(Error::GhExec(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn pr_create(&self, title: &str, body: &str, base: &str) -> Result<u64, Error> {
        self.push().await?;
        let url = self.run(&["pr", "create", "--title", title, "--body", body, "--base", base]).await?;
        pr_number_from_url(&url).ok_or_else(|| Error::GhExec(format!("could not parse PR number from {url:?}")))
    }

    async fn pr_view(&self, number: u64) -> Result<String, Error> {
        self.run(&["pr", "view", &number.to_string(), "--json", "state,title,url"]).await
    }

    async fn pr_merge(&self, number: u64, method: MergeMethod, delete_branch: bool) -> Result<(), Error> {
        let number_str = number.to_string();
        let mut args = vec!["pr", "merge", number_str.as_str(), method.flag()];
        if delete_branch {
            args.push("--delete-branch");
        }
        self.run(&args).await.map(|_| ())
    }

    async fn pr_checks(&self, number: u64) -> Result<CiConclusion, Error> {
        let output = self.run(&["pr", "checks", &number.to_string(), "--json", "conclusion"]).await?;
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&output).unwrap_or_default();
        let conclusions: Vec<&str> = parsed.iter().filter_map(|v| v.get("conclusion")?.as_str()).collect();
        Ok(derive_ci_conclusion(&conclusions))
    }

    async fn push(&self) -> Result<(), Error> {
        let output = Command::new("git").args(["push"]).output().await?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        Err(classify_gh_stderr(&stderr).unwrap_or(Error::GhExec(stderr)))
    }

    async fn comment_issue(&self, number: u64, body: &str) -> Result<(), Error> {
        self.run(&["issue", "comment", &number.to_string(), "--body", body]).await.map(|_| ())
    }

    async fn label_issue(&self, number: u64, label: &str) -> Result<(), Error> {
        self.run(&["issue", "edit", &number.to_string(), "--add-label", label]).await.map(|_| ())
    }

    async fn close_issue(&self, number: u64) -> Result<(), Error> {
        self.run(&["issue", "close", &number.to_string()]).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pr_number_extracted_from_pull_url() {
        assert_eq!(pr_number_from_url("https://github.com/org/repo/pull/42"), Some(42));
    }

    #[test]
    fn pr_number_missing_pull_segment_is_none() {
        assert_eq!(pr_number_from_url("https://github.com/org/repo"), None);
    }

    #[test]
    fn ci_conclusion_fails_on_any_failure() {
        assert_eq!(derive_ci_conclusion(&["success", "failure"]), CiConclusion::Fail);
    }

    #[test]
    fn ci_conclusion_pending_on_incomplete_status() {
        assert_eq!(derive_ci_conclusion(&["success", ""]), CiConclusion::Pending);
    }

    #[test]
    fn ci_conclusion_passes_when_all_succeed() {
        assert_eq!(derive_ci_conclusion(&["success", "success"]), CiConclusion::Pass);
    }
}
