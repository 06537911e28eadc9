//! Concrete `DecisionEngine`/`FeedbackSource` the CLI wires into
//! `moai-loop`'s controller: a shell-driven feedback collector running
//! `cargo test`/`cargo clippy`, and a threshold-based decision engine.

use async_trait::async_trait;
use moai_loop::{Action, Decision, DecisionEngine, Feedback, LoopPhase, LoopState};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

pub struct ShellFeedbackSource;

#[async_trait]
impl moai_loop::FeedbackSource for ShellFeedbackSource {
    async fn collect(&self, cancel: &CancellationToken) -> anyhow::Result<Feedback> {
        let test_run = tokio::select! {
            result = Command::new("cargo").args(["test", "--quiet"]).output() => result?,
            _ = cancel.cancelled() => return Err(anyhow::anyhow!("cancelled")),
        };
        let lint_run = tokio::select! {
            result = Command::new("cargo").args(["clippy", "--quiet", "--", "-D", "warnings"]).output() => result?,
            _ = cancel.cancelled() => return Err(anyhow::anyhow!("cancelled")),
        };

        let tests_passed = test_run.status.success();
        let lint_errors = if lint_run.status.success() { 0 } else { 1 };

        Ok(Feedback {
            phase: LoopPhase::Test,
            iteration: 0,
            tests_passed: u32::from(tests_passed),
            tests_failed: u32::from(!tests_passed),
            lint_errors,
            build_success: tests_passed,
            coverage: 0.0,
            message: None,
        })
    }
}

pub struct ThresholdDecisionEngine;

#[async_trait]
impl DecisionEngine for ThresholdDecisionEngine {
    async fn decide(&self, _state: &LoopState, latest: &Feedback) -> Decision {
        if latest.build_success && latest.tests_failed == 0 && latest.lint_errors == 0 {
            return Decision { action: Action::Converge, converged: true, reason: "tests and lint are clean".to_string() };
        }
        Decision { action: Action::Continue, converged: false, reason: "tests or lint still failing".to_string() }
    }
}
