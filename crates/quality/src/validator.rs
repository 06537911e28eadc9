use async_trait::async_trait;

use crate::context::GateContext;
use crate::types::{DiagnosticSnapshot, Principle, PrincipleResult};

#[async_trait]
pub trait PrincipleValidator: Send + Sync {
    fn name(&self) -> Principle;
    async fn validate(&self, ctx: &GateContext) -> PrincipleResult;
}

/// Injected LSP-diagnostic source; a real implementation streams from a
/// language server, the default returns an empty snapshot so the gate is
/// exercisable without one.
#[async_trait]
pub trait DiagnosticSource: Send + Sync {
    async fn snapshot(&self) -> DiagnosticSnapshot;
}

pub struct NullDiagnosticSource;

#[async_trait]
impl DiagnosticSource for NullDiagnosticSource {
    async fn snapshot(&self) -> DiagnosticSnapshot {
        DiagnosticSnapshot::empty(chrono::Utc::now())
    }
}
