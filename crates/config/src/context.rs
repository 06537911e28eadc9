use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitMode {
    Manual,
    Personal,
    Team,
}

impl Default for GitMode {
    fn default() -> Self {
        GitMode::Personal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitProvider {
    Github,
    Gitlab,
}

impl Default for GitProvider {
    fn default() -> Self {
        GitProvider::Github
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevelopmentMode {
    Tdd,
    Ddd,
}

impl Default for DevelopmentMode {
    fn default() -> Self {
        DevelopmentMode::Tdd
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelPolicy {
    High,
    Medium,
    Low,
}

impl Default for ModelPolicy {
    fn default() -> Self {
        ModelPolicy::High
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Darwin,
    Linux,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Darwin
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }
}

/// Every field a template may reference via `{{FieldName}}`. Built by
/// [`TemplateContextBuilder`] and handed to the renderer as one flat record.
///
/// Field names serialize in the exact PascalCase the template vocabulary
/// documents (`{{ProjectName}}`, `{{EnforceQuality}}`, ...); the renderer
/// runs handlebars in strict mode, so a mismatch here is a `MissingTemplateKey`
/// at deploy time rather than a silently-blank render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateContext {
    #[serde(rename = "ProjectName")]
    pub project_name: String,
    #[serde(rename = "ProjectRoot")]
    pub project_root: PathBuf,
    #[serde(rename = "UserName")]
    pub user_name: String,
    #[serde(rename = "ConversationLanguage")]
    pub conversation_language: String,
    #[serde(rename = "ConversationLanguageName")]
    pub conversation_language_name: String,
    #[serde(rename = "AgentPromptLanguage")]
    pub agent_prompt_language: String,
    #[serde(rename = "GitCommitMessages")]
    pub git_commit_messages: String,
    #[serde(rename = "CodeComments")]
    pub code_comments: String,
    #[serde(rename = "Documentation")]
    pub documentation: String,
    #[serde(rename = "ErrorMessages")]
    pub error_messages: String,
    #[serde(rename = "GitMode")]
    pub git_mode: GitMode,
    #[serde(rename = "GitProvider")]
    pub git_provider: GitProvider,
    #[serde(rename = "GitHubUsername")]
    pub github_username: Option<String>,
    #[serde(rename = "GitLabInstanceURL")]
    pub gitlab_instance_url: Option<String>,
    #[serde(rename = "DevelopmentMode")]
    pub development_mode: DevelopmentMode,
    #[serde(rename = "EnforceQuality")]
    pub enforce_quality: bool,
    #[serde(rename = "TestCoverageTarget")]
    pub test_coverage_target: u32,
    #[serde(rename = "AutoClear")]
    pub auto_clear: bool,
    #[serde(rename = "PlanTokens")]
    pub plan_tokens: u32,
    #[serde(rename = "RunTokens")]
    pub run_tokens: u32,
    #[serde(rename = "SyncTokens")]
    pub sync_tokens: u32,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Platform")]
    pub platform: Platform,
    #[serde(rename = "InitializedAt")]
    pub initialized_at: DateTime<Utc>,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "GoBinPath")]
    pub go_bin_path: Option<String>,
    #[serde(rename = "HomeDir")]
    pub home_dir: PathBuf,
    #[serde(rename = "SmartPATH")]
    pub smart_path: String,
    #[serde(rename = "ModelPolicy")]
    pub model_policy: ModelPolicy,
}

/// Builds a [`TemplateContext`] with the defaults spec.md names: English
/// languages, TDD, quality enforced, high model policy.
pub struct TemplateContextBuilder {
    project_name: String,
    project_root: PathBuf,
    user_name: String,
    conversation_language: String,
    conversation_language_name: String,
    agent_prompt_language: String,
    git_commit_messages: String,
    code_comments: String,
    documentation: String,
    error_messages: String,
    git_mode: GitMode,
    git_provider: GitProvider,
    github_username: Option<String>,
    gitlab_instance_url: Option<String>,
    development_mode: DevelopmentMode,
    enforce_quality: bool,
    test_coverage_target: u32,
    auto_clear: bool,
    plan_tokens: u32,
    run_tokens: u32,
    sync_tokens: u32,
    version: String,
    home_dir: PathBuf,
    go_bin_path: Option<String>,
    model_policy: ModelPolicy,
}

impl TemplateContextBuilder {
    pub fn new(project_name: impl Into<String>, project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_name: project_name.into(),
            project_root: project_root.into(),
            user_name: whoami_fallback(),
            conversation_language: "en".to_string(),
            conversation_language_name: "English".to_string(),
            agent_prompt_language: "en".to_string(),
            git_commit_messages: "en".to_string(),
            code_comments: "en".to_string(),
            documentation: "en".to_string(),
            error_messages: "en".to_string(),
            git_mode: GitMode::default(),
            git_provider: GitProvider::default(),
            github_username: None,
            gitlab_instance_url: None,
            development_mode: DevelopmentMode::default(),
            enforce_quality: true,
            test_coverage_target: 85,
            auto_clear: true,
            plan_tokens: 4096,
            run_tokens: 8192,
            sync_tokens: 4096,
            version: env!("CARGO_PKG_VERSION").to_string(),
            home_dir: dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
            go_bin_path: None,
            model_policy: ModelPolicy::default(),
        }
    }

    pub fn user_name(mut self, value: impl Into<String>) -> Self {
        self.user_name = value.into();
        self
    }

    pub fn git_mode(mut self, value: GitMode) -> Self {
        self.git_mode = value;
        self
    }

    pub fn git_provider(mut self, value: GitProvider) -> Self {
        self.git_provider = value;
        self
    }

    pub fn github_username(mut self, value: impl Into<String>) -> Self {
        self.github_username = Some(value.into());
        self
    }

    pub fn gitlab_instance_url(mut self, value: impl Into<String>) -> Self {
        self.gitlab_instance_url = Some(value.into());
        self
    }

    pub fn development_mode(mut self, value: DevelopmentMode) -> Self {
        self.development_mode = value;
        self
    }

    pub fn enforce_quality(mut self, value: bool) -> Self {
        self.enforce_quality = value;
        self
    }

    pub fn test_coverage_target(mut self, value: u32) -> Self {
        self.test_coverage_target = value;
        self
    }

    pub fn model_policy(mut self, value: ModelPolicy) -> Self {
        self.model_policy = value;
        self
    }

    pub fn build(self) -> TemplateContext {
        let now = Utc::now();
        TemplateContext {
            project_name: self.project_name,
            project_root: self.project_root,
            user_name: self.user_name,
            conversation_language: self.conversation_language,
            conversation_language_name: self.conversation_language_name,
            agent_prompt_language: self.agent_prompt_language,
            git_commit_messages: self.git_commit_messages,
            code_comments: self.code_comments,
            documentation: self.documentation,
            error_messages: self.error_messages,
            git_mode: self.git_mode,
            git_provider: self.git_provider,
            github_username: self.github_username,
            gitlab_instance_url: self.gitlab_instance_url,
            development_mode: self.development_mode,
            enforce_quality: self.enforce_quality,
            test_coverage_target: self.test_coverage_target,
            auto_clear: self.auto_clear,
            plan_tokens: self.plan_tokens,
            run_tokens: self.run_tokens,
            sync_tokens: self.sync_tokens,
            version: self.version,
            platform: Platform::current(),
            initialized_at: now,
            created_at: now,
            go_bin_path: self.go_bin_path,
            home_dir: self.home_dir,
            smart_path: std::env::var("PATH").unwrap_or_default(),
            model_policy: self.model_policy,
        }
    }
}

fn whoami_fallback() -> String {
    std::env::var("USER").or_else(|_| std::env::var("USERNAME")).unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_english_tdd_enforced_high() {
        let ctx = TemplateContextBuilder::new("demo", "/tmp/demo").build();
        assert_eq!(ctx.conversation_language, "en");
        assert_eq!(ctx.development_mode, DevelopmentMode::Tdd);
        assert!(ctx.enforce_quality);
        assert_eq!(ctx.model_policy, ModelPolicy::High);
    }

    #[test]
    fn builder_overrides_take_effect() {
        let ctx = TemplateContextBuilder::new("demo", "/tmp/demo")
            .development_mode(DevelopmentMode::Ddd)
            .git_provider(GitProvider::Gitlab)
            .model_policy(ModelPolicy::Low)
            .build();
        assert_eq!(ctx.development_mode, DevelopmentMode::Ddd);
        assert_eq!(ctx.git_provider, GitProvider::Gitlab);
        assert_eq!(ctx.model_policy, ModelPolicy::Low);
    }
}
