use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::context::{GitMode, GitProvider, ModelPolicy};
use crate::error::{Error, Result};

fn default_validator_timeout_secs() -> u64 {
    3
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

fn default_max_iter() -> u32 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSettings {
    #[serde(default = "default_validator_timeout_secs")]
    pub validator_timeout_secs: u64,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self { validator_timeout_secs: default_validator_timeout_secs() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopSettings {
    #[serde(default = "default_max_iter")]
    pub max_iter: u32,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self { max_iter: default_max_iter() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitDefaults {
    #[serde(default)]
    pub mode: GitMode,
    #[serde(default)]
    pub provider: GitProvider,
}

/// Ambient settings spec.md doesn't otherwise model: gate timeouts, retry
/// settings for the remote adapter, loop defaults, and git provider/mode
/// defaults. Every field has a default so old config files still parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gate: GateSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub loop_settings: LoopSettings,
    #[serde(default)]
    pub git: GitDefaults,
    #[serde(default)]
    pub model_policy: ModelPolicy,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content).map_err(Error::from)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_project(project_root: &Path) -> Result<Option<Self>> {
        let path = Self::project_config_path(project_root);
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Ok(Some(toml::from_str(&content)?))
        } else {
            Ok(None)
        }
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("moai")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn project_config_path(project_root: &Path) -> PathBuf {
        project_root.join(".moai").join("config.toml")
    }

    pub fn ensure_dirs() -> Result<()> {
        std::fs::create_dir_all(Self::config_dir())?;
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        Self::ensure_dirs()?;
        let content = toml::to_string_pretty(self)?;
        moai_manifest::atomic::write_atomic(&Self::config_path(), content.as_bytes())?;
        Ok(())
    }

    pub fn save_project(&self, project_root: &Path) -> Result<()> {
        let path = Self::project_config_path(project_root);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        moai_manifest::atomic::write_atomic(&path, content.as_bytes())?;
        Ok(())
    }

    /// Merges project config over global config, overriding a field only
    /// when the project value differs from that field's default.
    pub fn merge(global: &Config, project: &Config) -> Config {
        let defaults = Config::default();
        Config {
            gate: if project.gate.validator_timeout_secs != defaults.gate.validator_timeout_secs {
                project.gate.clone()
            } else {
                global.gate.clone()
            },
            retry: RetrySettings {
                max_retries: if project.retry.max_retries != defaults.retry.max_retries {
                    project.retry.max_retries
                } else {
                    global.retry.max_retries
                },
                initial_backoff_ms: if project.retry.initial_backoff_ms != defaults.retry.initial_backoff_ms {
                    project.retry.initial_backoff_ms
                } else {
                    global.retry.initial_backoff_ms
                },
                max_backoff_ms: if project.retry.max_backoff_ms != defaults.retry.max_backoff_ms {
                    project.retry.max_backoff_ms
                } else {
                    global.retry.max_backoff_ms
                },
            },
            loop_settings: if project.loop_settings.max_iter != defaults.loop_settings.max_iter {
                project.loop_settings.clone()
            } else {
                global.loop_settings.clone()
            },
            git: if project.git.mode != defaults.git.mode || project.git.provider != defaults.git.provider {
                project.git.clone()
            } else {
                global.git.clone()
            },
            model_policy: if project.model_policy != defaults.model_policy {
                project.model_policy
            } else {
                global.model_policy
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_constants() {
        let cfg = Config::default();
        assert_eq!(cfg.gate.validator_timeout_secs, 3);
        assert_eq!(cfg.retry.max_retries, 3);
        assert_eq!(cfg.retry.initial_backoff_ms, 1000);
        assert_eq!(cfg.retry.max_backoff_ms, 30_000);
        assert_eq!(cfg.loop_settings.max_iter, 5);
    }

    #[test]
    fn merge_prefers_project_override() {
        let global = Config::default();
        let mut project = Config::default();
        project.loop_settings.max_iter = 10;
        let merged = Config::merge(&global, &project);
        assert_eq!(merged.loop_settings.max_iter, 10);
    }

    #[test]
    fn merge_falls_back_to_global_when_project_is_default() {
        let mut global = Config::default();
        global.retry.max_retries = 7;
        let project = Config::default();
        let merged = Config::merge(&global, &project);
        assert_eq!(merged.retry.max_retries, 7);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.loop_settings.max_iter = 8;
        cfg.save_project(dir.path()).unwrap();

        let loaded = Config::load_project(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.loop_settings.max_iter, 8);
    }
}
