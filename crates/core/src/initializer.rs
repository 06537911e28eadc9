//! Project initializer (C9): lays down the `.moai`/`.claude` directory
//! skeleton, deploys the embedded template tree (or falls back to writing
//! the config sections directly), rewrites agent model tiers, and finalizes
//! the manifest.

use std::path::{Path, PathBuf};

use include_dir::{include_dir, Dir};
use moai_config::{model_for, TemplateContext};
use moai_manifest::{hash_bytes, Manifest, Provenance};
use moai_template::{DeployOptions, Deployer, Renderer};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::{Error, Result};

static TEMPLATE_TREE: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/../../templates");

const MOAI_DIRS: &[&str] = &[".moai/config/sections", ".moai/specs", ".moai/reports", ".moai/memory", ".moai/logs"];

const CLAUDE_DIRS: &[&str] =
    &[".claude/agents/moai", ".claude/skills", ".claude/commands/moai", ".claude/rules/moai", ".claude/output-styles"];

const MANIFEST_VERSION: &str = moai_manifest::MANIFEST_VERSION;

#[derive(Debug, Clone, Default)]
pub struct InitResult {
    pub created_dirs: Vec<PathBuf>,
    pub created_files: Vec<PathBuf>,
    pub warnings: Vec<String>,
    pub development_mode: String,
}

pub struct Initializer;

impl Initializer {
    /// Runs the full init sequence. `force_update` bypasses the provenance
    /// guard on `template_managed` files during deployment (the `--force` /
    /// `--force-update` CLI flags both land here).
    pub fn run(root: &Path, ctx: &TemplateContext, cancel: &CancellationToken, force_update: bool) -> Result<InitResult> {
        let mut result = InitResult { development_mode: format!("{:?}", ctx.development_mode).to_lowercase(), ..Default::default() };

        Self::create_directories(root, &mut result)?;
        if cancel.is_cancelled() {
            return Err(Error::InitFailed("cancelled after directory creation".to_string()));
        }

        let mut manifest = Manifest::load_or_recover(root)?;
        Self::deploy_or_fallback(root, ctx, &mut manifest, &mut result, force_update);
        if cancel.is_cancelled() {
            return Err(Error::InitFailed("cancelled after template deployment".to_string()));
        }

        Self::rewrite_model_policy(root, ctx, &mut manifest, &mut result);

        let claude_md = root.join("CLAUDE.md");
        if !claude_md.exists() {
            std::fs::write(&claude_md, minimal_claude_md(ctx))?;
            result.created_files.push(claude_md);
        }

        manifest.finalize(MANIFEST_VERSION);
        manifest.save()?;
        validate_manifest_json(root)?;

        Ok(result)
    }

    /// True once a prior `run` has tracked at least one file in the
    /// manifest. `moai init` without `--force` refuses to proceed when this
    /// is true; `moai deploy` never checks it, since re-deploying an
    /// existing project is its whole purpose.
    pub fn already_initialized(root: &Path) -> Result<bool> {
        let manifest = Manifest::load_or_recover(root)?;
        Ok(!manifest.is_empty())
    }

    fn create_directories(root: &Path, result: &mut InitResult) -> Result<()> {
        for rel in MOAI_DIRS.iter().chain(CLAUDE_DIRS.iter()) {
            let path = root.join(rel);
            std::fs::create_dir_all(&path)?;
            result.created_dirs.push(path);
        }
        Ok(())
    }

    fn deploy_or_fallback(root: &Path, ctx: &TemplateContext, manifest: &mut Manifest, result: &mut InitResult, force_update: bool) {
        let deployer = Deployer::new(&TEMPLATE_TREE);
        let renderer = Renderer::new();
        let cancel = CancellationToken::new();

        match deployer.deploy(&cancel, root, manifest, Some(&renderer), Some(ctx), DeployOptions { force_update }) {
            Ok(()) => {
                for name in deployer.list_templates() {
                    result.created_files.push(root.join(name));
                }
            }
            Err(e) => {
                result.warnings.push(format!("template deployment failed, falling back to config sections only: {e}"));
                if let Err(e) = moai_config::write_fallback_sections(root, ctx) {
                    result.warnings.push(format!("fallback config section write failed: {e}"));
                }
            }
        }
    }

    fn rewrite_model_policy(root: &Path, ctx: &TemplateContext, manifest: &mut Manifest, result: &mut InitResult) {
        let agents_dir = root.join(".claude").join("agents").join("moai");
        let entries = match std::fs::read_dir(&agents_dir) {
            Ok(entries) => entries,
            Err(_) => return,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("md") {
                continue;
            }
            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some(s) => s,
                None => continue,
            };
            let Some(model_id) = model_for(stem, ctx.model_policy) else {
                continue;
            };
            match rewrite_model_line(&path, model_id) {
                Ok(true) => {
                    if let Ok(bytes) = std::fs::read(&path) {
                        let rel = path.strip_prefix(root).unwrap_or(&path).to_string_lossy().replace('\\', "/");
                        manifest.track(rel, Provenance::TemplateManaged, hash_bytes(&bytes));
                    }
                }
                Ok(false) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "failed to rewrite model policy line"),
            }
        }
    }
}

/// Rewrites a `model: <value>` frontmatter line in place. Returns `true` if
/// the file changed.
fn rewrite_model_line(path: &Path, model_id: &str) -> std::io::Result<bool> {
    let content = std::fs::read_to_string(path)?;
    let mut changed = false;
    let rewritten: Vec<String> = content
        .lines()
        .map(|line| {
            if let Some(rest) = line.strip_prefix("model:") {
                let new_line = format!("model: {model_id}");
                if rest.trim() != model_id {
                    changed = true;
                }
                new_line
            } else {
                line.to_string()
            }
        })
        .collect();

    if changed {
        let mut body = rewritten.join("\n");
        if content.ends_with('\n') {
            body.push('\n');
        }
        std::fs::write(path, body)?;
    }
    Ok(changed)
}

fn minimal_claude_md(ctx: &TemplateContext) -> String {
    format!("# {}\n\nManaged by moai. Development mode: {:?}.\n", ctx.project_name, ctx.development_mode)
}

fn validate_manifest_json(root: &Path) -> Result<()> {
    let path = Manifest::manifest_path(root);
    let content = std::fs::read_to_string(&path)?;
    serde_json::from_str::<serde_json::Value>(&content).map_err(|e| Error::InitFailed(format!("manifest did not validate as JSON: {e}")))?;
    Ok(())
}
