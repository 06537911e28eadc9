use crate::error::Error;

/// Substring-matches `gh`'s stderr against the fixed pattern order; the first
/// match wins. Returns `None` when nothing matches (caller wraps the raw
/// text as a generic `GhExec`).
pub fn classify_gh_stderr(stderr: &str) -> Option<Error> {
    if stderr.contains("already exists") {
        return Some(Error::PrAlreadyExists);
    }
    if stderr.contains("not found") {
        return Some(Error::PrNotFound);
    }
    if stderr.contains("Could not resolve") {
        return Some(Error::GhNotFound);
    }
    if stderr.contains("conflict") {
        return Some(Error::MergeConflict);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_already_exists() {
        assert!(matches!(classify_gh_stderr("pull request already exists for branch"), Some(Error::PrAlreadyExists)));
    }

    #[test]
    fn matches_not_found() {
        assert!(matches!(classify_gh_stderr("no pull requests found"), Some(Error::PrNotFound)));
    }

    #[test]
    fn matches_could_not_resolve() {
        assert!(matches!(classify_gh_stderr("Could not resolve to a Repository"), Some(Error::GhNotFound)));
    }

    #[test]
    fn matches_conflict() {
        assert!(matches!(classify_gh_stderr("merge conflict in file.rs"), Some(Error::MergeConflict)));
    }

    #[test]
    fn unmatched_text_falls_through_to_none() {
        assert!(classify_gh_stderr("some other error entirely").is_none());
    }
}
