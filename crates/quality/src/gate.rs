use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::context::{GateConfig, GateContext};
use crate::methodology::apply_methodology_rules;
use crate::phase::{apply_phase_gate, detect_regressions};
use crate::types::{Phase, PrincipleResult, Report, Severity, TRUST5_ORDER};
use crate::validator::{DiagnosticSource, NullDiagnosticSource, PrincipleValidator};

pub struct Gate {
    validators: Vec<Arc<dyn PrincipleValidator>>,
    diagnostic_source: Arc<dyn DiagnosticSource>,
    config: GateConfig,
}

impl Gate {
    pub fn new(validators: Vec<Arc<dyn PrincipleValidator>>) -> Self {
        Self { validators, diagnostic_source: Arc::new(NullDiagnosticSource), config: GateConfig::default() }
    }

    pub fn with_diagnostic_source(mut self, source: Arc<dyn DiagnosticSource>) -> Self {
        self.diagnostic_source = source;
        self
    }

    pub fn with_config(mut self, config: GateConfig) -> Self {
        self.config = config;
        self
    }

    /// Default five-validator TRUST-5 gate.
    pub fn default_validators() -> Vec<Arc<dyn PrincipleValidator>> {
        use crate::validators::{ReadableValidator, SecuredValidator, TestedValidator, TrackableValidator, UnderstandableValidator};
        vec![
            Arc::new(TestedValidator),
            Arc::new(ReadableValidator),
            Arc::new(UnderstandableValidator),
            Arc::new(SecuredValidator),
            Arc::new(TrackableValidator),
        ]
    }

    pub async fn validate(&self, ctx: &GateContext, cancel: &CancellationToken) -> Report {
        let (tx, mut rx) = mpsc::channel::<PrincipleResult>(self.validators.len().max(1));

        for validator in &self.validators {
            let validator = Arc::clone(validator);
            let ctx = ctx.clone();
            let tx = tx.clone();
            let timeout = self.config.validator_timeout;
            let name = validator.name();
            tokio::spawn(async move {
                let result = tokio::time::timeout(timeout, validator.validate(&ctx)).await;
                let result = result.unwrap_or_else(|_| PrincipleResult::missing(name));
                let _ = tx.send(result).await;
            });
        }
        drop(tx);

        let snapshot_fut = self.diagnostic_source.snapshot();

        let mut received = Vec::with_capacity(self.validators.len());
        let mut cancelled = false;

        tokio::select! {
            _ = cancel.cancelled() => {
                cancelled = true;
            }
            () = async {
                while let Some(result) = rx.recv().await {
                    received.push(result);
                }
            } => {}
        }

        let snapshot = if cancelled {
            None
        } else {
            Some(snapshot_fut.await)
        };

        let mut principles = Vec::with_capacity(TRUST5_ORDER.len());
        for name in TRUST5_ORDER {
            let found = received.iter().find(|r| r.name == name).cloned();
            principles.push(found.unwrap_or_else(|| PrincipleResult::missing(name)));
        }

        let mut phase_issues = Vec::new();
        let mut regression_issues = Vec::new();
        let mut methodology_issues = Vec::new();

        if let Some(snapshot) = &snapshot {
            phase_issues = apply_phase_gate(ctx, snapshot);
            if let Some(baseline) = &ctx.baseline {
                regression_issues = detect_regressions(baseline, snapshot, ctx.thresholds);
            }
        }

        if let Some(methodology) = &ctx.methodology {
            methodology_issues = apply_methodology_rules(methodology);
        }

        let score = principles.iter().map(|p| p.name.weight() * p.score).sum::<f64>();
        let score = (score * 1000.0).round() / 1000.0;

        let has_error_issue = phase_issues
            .iter()
            .chain(regression_issues.iter())
            .chain(methodology_issues.iter())
            .any(|i| i.severity == Severity::Error);

        let passed = !cancelled && score >= 0.7 && !has_error_issue;

        Report {
            principles,
            phase_issues,
            regression_issues,
            methodology_issues,
            passed,
            score,
            development_mode: ctx.methodology.as_ref().and_then(|m| m.mode),
            phase: ctx.phase.unwrap_or(Phase::Plan),
            timestamp: Utc::now(),
            cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn full_gate_with_clean_inputs_passes() {
        let gate = Gate::new(Gate::default_validators());
        let ctx = GateContext {
            coverage_percent: 90.0,
            last_commit_message: "feat(core): add gate".to_string(),
            phase: Some(Phase::Plan),
            ..GateContext::default()
        };
        let cancel = CancellationToken::new();
        let report = gate.validate(&ctx, &cancel).await;
        assert!(report.passed);
        assert_eq!(report.principles.len(), 5);
        assert!(!report.cancelled);
    }

    #[tokio::test]
    async fn cancellation_yields_partial_report() {
        let gate = Gate::new(Gate::default_validators());
        let ctx = GateContext::default();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let report = gate.validate(&ctx, &cancel).await;
        assert!(report.cancelled);
        assert!(!report.passed);
    }

    #[tokio::test]
    async fn principles_are_emitted_in_canonical_order() {
        let gate = Gate::new(Gate::default_validators());
        let ctx = GateContext::default();
        let cancel = CancellationToken::new();
        let report = gate.validate(&ctx, &cancel).await;
        let names: Vec<_> = report.principles.iter().map(|p| p.name).collect();
        assert_eq!(names, TRUST5_ORDER.to_vec());
    }
}
