use std::time::Duration;

use crate::types::{DevelopmentMode, DiagnosticSnapshot, Phase};

/// Thresholds used by phase gating and regression detection. All default to
/// the values spec'd for the `run` phase; `sync` relaxes the warning budget.
#[derive(Debug, Clone, Copy)]
pub struct Thresholds {
    pub max_errors: u32,
    pub max_type_errors: u32,
    pub max_lint_errors: u32,
    pub max_warnings: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { max_errors: 0, max_type_errors: 0, max_lint_errors: 0, max_warnings: 10 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DddInputs {
    pub characterization_tests_exist: bool,
    pub preserve_step_completed: bool,
    pub behavior_snapshot_regressed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TddInputs {
    pub test_first_verified: bool,
    pub coverage_exemption_requested: bool,
    pub commit_coverage: f64,
    pub min_coverage_per_commit: f64,
}

#[derive(Debug, Clone)]
pub struct MethodologyContext {
    pub mode: Option<DevelopmentMode>,
    pub previous_mode: Option<DevelopmentMode>,
    pub ddd: DddInputs,
    pub tdd: TddInputs,
}

impl Default for MethodologyContext {
    fn default() -> Self {
        Self { mode: None, previous_mode: None, ddd: DddInputs::default(), tdd: TddInputs::default() }
    }
}

/// Inputs a validator reads its own slice of; fields unrelated to a given
/// principle are simply ignored by that validator.
#[derive(Debug, Clone, Default)]
pub struct GateContext {
    pub coverage_percent: f64,
    pub type_error_count: u32,
    pub lint_error_count: u32,
    pub complexity_sample: Vec<u32>,
    pub security_diagnostic_count: u32,
    pub last_commit_message: String,
    pub phase: Option<Phase>,
    pub baseline: Option<DiagnosticSnapshot>,
    pub current: Option<DiagnosticSnapshot>,
    pub thresholds: Thresholds,
    pub methodology: Option<MethodologyContext>,
}

impl GateContext {
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GateConfig {
    pub validator_timeout: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self { validator_timeout: Duration::from_secs(3) }
    }
}
