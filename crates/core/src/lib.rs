//! Workspace resolution (`workspace::detect_workspace`) and the project
//! initializer (C9) composing `moai-template`, `moai-manifest`, and
//! `moai-config`.

pub mod error;
pub mod initializer;
pub mod workspace;

pub use error::Error;
pub use initializer::{InitResult, Initializer};
pub use workspace::{detect_workspace, ProjectType, WorkspaceContext};

/// Runs the language/framework/methodology detector against `root` and maps
/// its recommendation onto the config crate's `DevelopmentMode`, for callers
/// (`moai init`) that want to default a new project's mode instead of
/// requiring the user to pick one.
pub fn recommend_development_mode(root: &std::path::Path) -> error::Result<moai_config::DevelopmentMode> {
    let report = moai_detect::detect_project(root)?;
    Ok(match report.methodology.recommended {
        moai_detect::DevelopmentMode::Tdd => moai_config::DevelopmentMode::Tdd,
        moai_detect::DevelopmentMode::Ddd => moai_config::DevelopmentMode::Ddd,
    })
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn recommend_development_mode_defaults_tdd_for_empty_rust_project() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "[package]\nname=\"x\"\n").unwrap();
        let mode = recommend_development_mode(dir.path()).unwrap();
        assert_eq!(mode, moai_config::DevelopmentMode::Tdd);
    }
}
