use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("gh CLI not found on PATH")]
    GhNotFound,
    #[error("gh CLI is not authenticated")]
    GhNotAuthenticated,
    #[error("pull request already exists")]
    PrAlreadyExists,
    #[error("pull request not found")]
    PrNotFound,
    #[error("merge conflict")]
    MergeConflict,
    #[error("gh exec failed: {0}")]
    GhExec(String),
    #[error("max retries exceeded: {0}")]
    MaxRetriesExceeded(String),
    #[error("issue #{0} is already linked to a spec")]
    MappingExists(i64),
    #[error("no mapping found for {0}")]
    MappingNotFound(String),
    #[error("gh client was never configured")]
    NilGhClient,
    #[error("invalid issue number: {0}")]
    InvalidIssueNumber(i64),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
