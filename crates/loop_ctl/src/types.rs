use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopPhase {
    Test,
    Review,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    Idle,
    Running,
    Paused,
    Terminated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub phase: LoopPhase,
    pub iteration: u32,
    pub tests_passed: u32,
    pub tests_failed: u32,
    pub lint_errors: u32,
    pub build_success: bool,
    pub coverage: f64,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopState {
    pub spec_id: String,
    pub phase: LoopPhase,
    pub iteration: u32,
    pub max_iter: u32,
    pub feedback: Vec<Feedback>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LoopState {
    pub fn new(spec_id: impl Into<String>, max_iter: u32) -> Self {
        let now = Utc::now();
        Self {
            spec_id: spec_id.into(),
            phase: LoopPhase::Test,
            iteration: 0,
            max_iter: if max_iter == 0 { DEFAULT_MAX_ITER } else { max_iter },
            feedback: Vec::new(),
            started_at: now,
            updated_at: now,
        }
    }
}

pub const DEFAULT_MAX_ITER: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Continue,
    Converge,
    RequestReview,
    Abort,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub action: Action,
    pub converged: bool,
    pub reason: String,
}
