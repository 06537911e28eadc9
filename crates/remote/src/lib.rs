//! Remote-hosting adapter (C8): wraps the `gh` CLI for PR lifecycle
//! operations, issue closing, and a spec-to-issue link registry.

pub mod classify;
pub mod error;
pub mod gh_client;
pub mod issue_closer;
pub mod retry;
pub mod spec_linker;

pub use error::Error;
pub use gh_client::{CiConclusion, GhClient, GhOps, MergeMethod};
pub use issue_closer::{close_issue_with_comment, CloseResult};
pub use retry::{retry_with_backoff, RetrySettings};
pub use spec_linker::{LinkStatus, SpecLink, SpecLinkRegistry, SpecLinker};
