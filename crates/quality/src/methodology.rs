use crate::context::MethodologyContext;
use crate::types::{DevelopmentMode, Issue, Severity};

fn error(message: impl Into<String>, rule: &str) -> Issue {
    Issue { file: String::new(), line: 0, severity: Severity::Error, message: message.into(), rule: rule.to_string() }
}

/// Applies the DDD/TDD rule set from the methodology context. A mode change
/// relative to `previous_mode` is logged, never an issue.
pub fn apply_methodology_rules(methodology: &MethodologyContext) -> Vec<Issue> {
    let mut issues = Vec::new();

    if let (Some(previous), Some(current)) = (methodology.previous_mode, methodology.mode) {
        if previous != current {
            tracing::info!(?previous, ?current, "development mode changed");
        }
    }

    match methodology.mode {
        None => {
            issues.push(error(
                "no development mode set; valid options are tdd, ddd",
                "invalid_mode",
            ));
        }
        Some(DevelopmentMode::Ddd) => {
            if !methodology.ddd.characterization_tests_exist {
                issues.push(error("characterization tests do not exist", "ddd_characterization"));
            }
            if !methodology.ddd.preserve_step_completed {
                issues.push(error("preserve step not completed", "ddd_preserve"));
            }
            if methodology.ddd.behavior_snapshot_regressed {
                issues.push(error("behavior snapshot regressed", "ddd_behavior_snapshot"));
            }
        }
        Some(DevelopmentMode::Tdd) => {
            if !methodology.tdd.test_first_verified {
                issues.push(error("test-first was not verified for this commit", "tdd_test_first"));
            }
            if methodology.tdd.coverage_exemption_requested {
                issues.push(error("coverage exemption requested under tdd", "tdd_coverage_exemption"));
            }
            if methodology.tdd.commit_coverage < methodology.tdd.min_coverage_per_commit {
                issues.push(error(
                    format!(
                        "commit coverage {:.1} below minimum {:.1}",
                        methodology.tdd.commit_coverage, methodology.tdd.min_coverage_per_commit
                    ),
                    "tdd_min_coverage",
                ));
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{DddInputs, TddInputs};

    #[test]
    fn ddd_with_all_conditions_met_has_no_issues() {
        let ctx = MethodologyContext {
            mode: Some(DevelopmentMode::Ddd),
            previous_mode: None,
            ddd: DddInputs { characterization_tests_exist: true, preserve_step_completed: true, behavior_snapshot_regressed: false },
            tdd: TddInputs::default(),
        };
        assert!(apply_methodology_rules(&ctx).is_empty());
    }

    #[test]
    fn ddd_missing_characterization_tests_is_an_error() {
        let ctx = MethodologyContext {
            mode: Some(DevelopmentMode::Ddd),
            previous_mode: None,
            ddd: DddInputs::default(),
            tdd: TddInputs::default(),
        };
        let issues = apply_methodology_rules(&ctx);
        assert!(issues.iter().any(|i| i.rule == "ddd_characterization"));
        assert!(issues.iter().any(|i| i.rule == "ddd_preserve"));
    }

    #[test]
    fn tdd_below_minimum_coverage_is_an_error() {
        let ctx = MethodologyContext {
            mode: Some(DevelopmentMode::Tdd),
            previous_mode: None,
            ddd: DddInputs::default(),
            tdd: TddInputs { test_first_verified: true, coverage_exemption_requested: false, commit_coverage: 50.0, min_coverage_per_commit: 80.0 },
        };
        let issues = apply_methodology_rules(&ctx);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule, "tdd_min_coverage");
    }

    #[test]
    fn no_mode_lists_valid_options() {
        let ctx = MethodologyContext::default();
        let issues = apply_methodology_rules(&ctx);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule, "invalid_mode");
    }
}
