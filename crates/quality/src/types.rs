use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical TRUST-5 order; `Gate::validate` always emits principles in this
/// order in the report regardless of which validator task finishes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Principle {
    Tested,
    Readable,
    Understandable,
    Secured,
    Trackable,
}

pub const TRUST5_ORDER: [Principle; 5] = [
    Principle::Tested,
    Principle::Readable,
    Principle::Understandable,
    Principle::Secured,
    Principle::Trackable,
];

impl Principle {
    pub fn weight(self) -> f64 {
        match self {
            Principle::Tested => 0.30,
            Principle::Readable => 0.15,
            Principle::Understandable => 0.15,
            Principle::Secured => 0.25,
            Principle::Trackable => 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Hint,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub file: String,
    pub line: u32,
    pub severity: Severity,
    pub message: String,
    pub rule: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSource {
    Typecheck,
    Lint,
    Security,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub file: String,
    pub line: u32,
    pub severity: Severity,
    pub source: DiagnosticSource,
    pub code: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticSnapshot {
    pub errors: u32,
    pub warnings: u32,
    pub type_errors: u32,
    pub lint_errors: u32,
    pub security_warnings: u32,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSnapshot {
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            errors: 0,
            warnings: 0,
            type_errors: 0,
            lint_errors: 0,
            security_warnings: 0,
            timestamp,
            diagnostics: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrincipleResult {
    pub name: Principle,
    pub passed: bool,
    pub score: f64,
    pub issues: Vec<Issue>,
}

impl PrincipleResult {
    pub fn missing(name: Principle) -> Self {
        Self { name, passed: false, score: 0.0, issues: Vec::new() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Plan,
    Run,
    Sync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DevelopmentMode {
    Tdd,
    Ddd,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub principles: Vec<PrincipleResult>,
    pub phase_issues: Vec<Issue>,
    pub regression_issues: Vec<Issue>,
    pub methodology_issues: Vec<Issue>,
    pub passed: bool,
    pub score: f64,
    pub development_mode: Option<DevelopmentMode>,
    pub phase: Phase,
    pub timestamp: DateTime<Utc>,
    /// Set when the supplied cancellation token fired mid-gate; the report
    /// still carries whatever principle results completed before that.
    pub cancelled: bool,
}
