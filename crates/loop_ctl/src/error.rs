use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("a loop is already running for this controller")]
    LoopAlreadyRunning,
    #[error("no loop is running")]
    LoopNotRunning,
    #[error("loop is not paused")]
    LoopNotPaused,
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("corrupted loop state: {0}")]
    CorruptedState(#[from] serde_json::Error),
}
