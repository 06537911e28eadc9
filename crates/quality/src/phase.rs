use crate::context::{GateContext, Thresholds};
use crate::types::{DiagnosticSnapshot, Issue, Phase, Severity};

/// Applies the phase policy for the snapshot taken this run, appending to
/// `phase_issues`. `plan` only ever captures a baseline and never fails.
pub fn apply_phase_gate(ctx: &GateContext, current: &DiagnosticSnapshot) -> Vec<Issue> {
    let thresholds = ctx.thresholds;
    match ctx.phase {
        None | Some(Phase::Plan) => Vec::new(),
        Some(Phase::Run) => zero_tolerance_issues(current, thresholds),
        Some(Phase::Sync) => sync_issues(current, thresholds),
    }
}

fn zero_tolerance_issues(snapshot: &DiagnosticSnapshot, thresholds: Thresholds) -> Vec<Issue> {
    let mut issues = Vec::new();
    if snapshot.errors > thresholds.max_errors {
        issues.push(phase_error(format!("{} error(s) exceed max {}", snapshot.errors, thresholds.max_errors), "errors"));
    }
    if snapshot.type_errors > thresholds.max_type_errors {
        issues.push(phase_error(
            format!("{} type error(s) exceed max {}", snapshot.type_errors, thresholds.max_type_errors),
            "type_errors",
        ));
    }
    if snapshot.lint_errors > thresholds.max_lint_errors {
        issues.push(phase_error(
            format!("{} lint error(s) exceed max {}", snapshot.lint_errors, thresholds.max_lint_errors),
            "lint_errors",
        ));
    }
    issues
}

fn sync_issues(snapshot: &DiagnosticSnapshot, thresholds: Thresholds) -> Vec<Issue> {
    let mut issues = zero_tolerance_issues(snapshot, thresholds);
    if snapshot.warnings > thresholds.max_warnings {
        issues.push(Issue {
            file: String::new(),
            line: 0,
            severity: Severity::Warning,
            message: format!("{} warning(s) exceed max {}", snapshot.warnings, thresholds.max_warnings),
            rule: "warnings".to_string(),
        });
    }
    issues
}

fn phase_error(message: String, rule: &str) -> Issue {
    Issue { file: String::new(), line: 0, severity: Severity::Error, message, rule: rule.to_string() }
}

/// Diffs `current` against `baseline`; only increases beyond threshold count.
pub fn detect_regressions(baseline: &DiagnosticSnapshot, current: &DiagnosticSnapshot, thresholds: Thresholds) -> Vec<Issue> {
    let mut issues = Vec::new();

    let error_increase = current.errors.saturating_sub(baseline.errors);
    if error_increase > thresholds.max_errors {
        issues.push(phase_error(format!("errors increased by {error_increase}"), "regression_errors"));
    }

    let type_error_increase = current.type_errors.saturating_sub(baseline.type_errors);
    if type_error_increase > thresholds.max_type_errors {
        issues.push(phase_error(format!("type errors increased by {type_error_increase}"), "regression_type_errors"));
    }

    let warning_increase = current.warnings.saturating_sub(baseline.warnings);
    if warning_increase > thresholds.max_warnings {
        issues.push(Issue {
            file: String::new(),
            line: 0,
            severity: Severity::Warning,
            message: format!("warnings increased by {warning_increase}"),
            rule: "regression_warnings".to_string(),
        });
    }

    issues
}
