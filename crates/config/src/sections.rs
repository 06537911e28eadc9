use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::context::TemplateContext;
use crate::error::Error;

#[derive(Debug, Serialize)]
struct UserSection<'a> {
    name: &'a str,
    home_dir: String,
}

#[derive(Debug, Serialize)]
struct LanguageSection<'a> {
    conversation_language: &'a str,
    conversation_language_name: &'a str,
    agent_prompt_language: &'a str,
    git_commit_messages: &'a str,
    code_comments: &'a str,
    documentation: &'a str,
    error_messages: &'a str,
}

#[derive(Debug, Serialize, Deserialize)]
struct QualitySection {
    enforce_quality: bool,
    test_coverage_target: u32,
}

#[derive(Debug, Serialize)]
struct WorkflowSection {
    development_mode: String,
    auto_clear: bool,
    plan_tokens: u32,
    run_tokens: u32,
    sync_tokens: u32,
}

#[derive(Debug, Serialize)]
struct GitStrategySection<'a> {
    git_mode: String,
    git_provider: String,
    github_username: Option<&'a str>,
    gitlab_instance_url: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SystemSection<'a> {
    platform: String,
    go_bin_path: Option<&'a str>,
    smart_path: &'a str,
}

#[derive(Debug, Serialize)]
struct ProjectSection<'a> {
    project_name: &'a str,
    project_root: String,
    version: &'a str,
    model_policy: String,
    initialized_at: String,
    created_at: String,
}

/// Writes the seven fallback config-section YAML files under
/// `<root>/.moai/config/sections/`, one flat document each, as produced when
/// the interactive deployer's richer config is unavailable.
pub fn write_fallback_sections(root: &Path, ctx: &TemplateContext) -> Result<(), Error> {
    let dir = root.join(".moai").join("config").join("sections");
    std::fs::create_dir_all(&dir)?;

    write_section(
        &dir.join("user.yaml"),
        &UserSection { name: &ctx.user_name, home_dir: ctx.home_dir.display().to_string() },
    )?;
    write_section(
        &dir.join("language.yaml"),
        &LanguageSection {
            conversation_language: &ctx.conversation_language,
            conversation_language_name: &ctx.conversation_language_name,
            agent_prompt_language: &ctx.agent_prompt_language,
            git_commit_messages: &ctx.git_commit_messages,
            code_comments: &ctx.code_comments,
            documentation: &ctx.documentation,
            error_messages: &ctx.error_messages,
        },
    )?;
    write_section(
        &dir.join("quality.yaml"),
        &QualitySection { enforce_quality: ctx.enforce_quality, test_coverage_target: ctx.test_coverage_target },
    )?;
    write_section(
        &dir.join("workflow.yaml"),
        &WorkflowSection {
            development_mode: format!("{:?}", ctx.development_mode).to_lowercase(),
            auto_clear: ctx.auto_clear,
            plan_tokens: ctx.plan_tokens,
            run_tokens: ctx.run_tokens,
            sync_tokens: ctx.sync_tokens,
        },
    )?;
    write_section(
        &dir.join("git-strategy.yaml"),
        &GitStrategySection {
            git_mode: format!("{:?}", ctx.git_mode).to_lowercase(),
            git_provider: format!("{:?}", ctx.git_provider).to_lowercase(),
            github_username: ctx.github_username.as_deref(),
            gitlab_instance_url: ctx.gitlab_instance_url.as_deref(),
        },
    )?;
    write_section(
        &dir.join("system.yaml"),
        &SystemSection {
            platform: format!("{:?}", ctx.platform).to_lowercase(),
            go_bin_path: ctx.go_bin_path.as_deref(),
            smart_path: &ctx.smart_path,
        },
    )?;
    write_section(
        &dir.join("project.yaml"),
        &ProjectSection {
            project_name: &ctx.project_name,
            project_root: ctx.project_root.display().to_string(),
            version: &ctx.version,
            model_policy: format!("{:?}", ctx.model_policy).to_lowercase(),
            initialized_at: ctx.initialized_at.to_rfc3339(),
            created_at: ctx.created_at.to_rfc3339(),
        },
    )?;

    Ok(())
}

fn write_section<T: Serialize>(path: &Path, value: &T) -> Result<(), Error> {
    let body = serde_yaml::to_string(value)?;
    moai_manifest::atomic::write_atomic(path, body.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TemplateContextBuilder;

    #[test]
    fn writes_all_seven_section_files() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = TemplateContextBuilder::new("demo", dir.path()).build();
        write_fallback_sections(dir.path(), &ctx).unwrap();

        let sections_dir = dir.path().join(".moai").join("config").join("sections");
        for name in ["user.yaml", "language.yaml", "quality.yaml", "workflow.yaml", "git-strategy.yaml", "system.yaml", "project.yaml"] {
            assert!(sections_dir.join(name).exists(), "missing {name}");
        }
    }

    #[test]
    fn quality_section_round_trips_target() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = TemplateContextBuilder::new("demo", dir.path()).test_coverage_target(90).build();
        write_fallback_sections(dir.path(), &ctx).unwrap();

        let content = std::fs::read_to_string(dir.path().join(".moai/config/sections/quality.yaml")).unwrap();
        let parsed: QualitySection = serde_yaml::from_str(&content).unwrap();
        assert_eq!(parsed.test_coverage_target, 90);
    }
}
