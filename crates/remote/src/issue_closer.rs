use tracing::warn;

use crate::error::Error;
use crate::gh_client::GhOps;
use crate::retry::{retry_with_backoff, RetrySettings};

/// Outcome of closing an issue: comment and close are mandatory (retried,
/// fail the whole operation on exhaustion); the label is best-effort.
#[derive(Debug, Clone, Default)]
pub struct CloseResult {
    pub commented: bool,
    pub labelled: bool,
    pub closed: bool,
}

pub async fn close_issue_with_comment(
    client: &dyn GhOps,
    settings: &RetrySettings,
    number: i64,
    comment: &str,
    label: Option<&str>,
) -> Result<CloseResult, Error> {
    if number <= 0 {
        return Err(Error::InvalidIssueNumber(number));
    }
    let number = number as u64;
    let mut result = CloseResult::default();

    retry_with_backoff(settings, || client.comment_issue(number, comment))
        .await
        .map_err(|e| Error::MaxRetriesExceeded(e.to_string()))?;
    result.commented = true;

    if let Some(label) = label {
        match retry_with_backoff(settings, || client.label_issue(number, label)).await {
            Ok(()) => result.labelled = true,
            Err(e) => warn!(issue = number, label, error = %e, "failed to label issue after retries, continuing"),
        }
    }

    retry_with_backoff(settings, || client.close_issue(number))
        .await
        .map_err(|e| Error::MaxRetriesExceeded(e.to_string()))?;
    result.closed = true;

    Ok(result)
}
