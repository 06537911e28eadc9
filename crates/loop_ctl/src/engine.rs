use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::types::{Decision, Feedback, LoopState};

#[async_trait]
pub trait DecisionEngine: Send + Sync {
    async fn decide(&self, state: &LoopState, latest: &Feedback) -> Decision;
}

#[async_trait]
pub trait FeedbackSource: Send + Sync {
    async fn collect(&self, cancel: &CancellationToken) -> anyhow::Result<Feedback>;
}
