use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("project already initialized at {0}")]
    ProjectExists(std::path::PathBuf),
    #[error("init failed: {0}")]
    InitFailed(String),
    #[error(transparent)]
    Manifest(#[from] moai_manifest::Error),
    #[error(transparent)]
    Config(#[from] moai_config::Error),
    #[error(transparent)]
    Detect(#[from] moai_detect::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
