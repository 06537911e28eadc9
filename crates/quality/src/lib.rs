//! TRUST-5 weighted quality gate (C6): five concurrent principle
//! validators, phase gating, regression detection, and methodology rules.

pub mod context;
pub mod gate;
pub mod methodology;
pub mod phase;
pub mod types;
pub mod validator;
pub mod validators;

pub use context::{DddInputs, GateConfig, GateContext, MethodologyContext, TddInputs, Thresholds};
pub use gate::Gate;
pub use types::{
    Diagnostic, DiagnosticSnapshot, DiagnosticSource as DiagnosticSourceKind, DevelopmentMode, Issue, Phase,
    Principle, PrincipleResult, Report, Severity, TRUST5_ORDER,
};
pub use validator::{DiagnosticSource, NullDiagnosticSource, PrincipleValidator};
