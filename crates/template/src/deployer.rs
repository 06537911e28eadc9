//! Walks the embedded template tree and writes it into a project, consulting
//! the manifest so user-owned files are never clobbered. A full recursive
//! tree walk with per-file provenance checks and manifest-driven path
//! resolution.

use std::path::{Path, PathBuf};

use include_dir::{Dir, DirEntry};
use moai_manifest::{hash_bytes, Manifest, Provenance};
use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::renderer::{self, Renderer};

#[derive(Debug, Error)]
pub enum Error {
    #[error("deploy {path:?}: destination escapes project root")]
    PathTraversal { path: String },
    #[error("deploy {path:?}: {source}")]
    Render {
        path: String,
        #[source]
        source: renderer::Error,
    },
    #[error("deployment cancelled")]
    Cancelled,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, Default)]
pub struct DeployOptions {
    /// Bypasses the provenance check for `template_managed` files; user
    /// files remain protected regardless.
    pub force_update: bool,
}

pub struct Deployer<'a> {
    tree: &'a Dir<'a>,
}

impl<'a> Deployer<'a> {
    pub fn new(tree: &'a Dir<'a>) -> Self {
        Self { tree }
    }

    /// Looks up a single embedded member by its source path (including the
    /// `.tmpl` suffix if present).
    pub fn extract_template(&self, name: &str) -> Option<&'a [u8]> {
        self.tree.get_file(name).map(|f| f.contents())
    }

    /// Deployment targets: every member's path with a trailing `.tmpl`
    /// suffix stripped.
    pub fn list_templates(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_paths(self.tree, &mut out);
        out.into_iter()
            .map(|p| strip_tmpl_suffix(&p))
            .collect()
    }

    /// Deploys the whole embedded tree into `project_root`.
    pub fn deploy(
        &self,
        cancel: &CancellationToken,
        project_root: &Path,
        manifest: &mut Manifest,
        renderer: Option<&Renderer>,
        template_ctx: Option<&impl Serialize>,
        options: DeployOptions,
    ) -> Result<()> {
        self.deploy_dir(self.tree, cancel, project_root, manifest, renderer, template_ctx, options)
    }

    fn deploy_dir(
        &self,
        dir: &Dir<'a>,
        cancel: &CancellationToken,
        project_root: &Path,
        manifest: &mut Manifest,
        renderer: Option<&Renderer>,
        template_ctx: Option<&impl Serialize>,
        options: DeployOptions,
    ) -> Result<()> {
        for entry in dir.entries() {
            match entry {
                DirEntry::Dir(sub) => {
                    self.deploy_dir(sub, cancel, project_root, manifest, renderer, template_ctx, options)?;
                }
                DirEntry::File(file) => {
                    if cancel.is_cancelled() {
                        return Err(Error::Cancelled);
                    }
                    self.deploy_file(file, project_root, manifest, renderer, template_ctx, options)?;
                }
            }
        }
        Ok(())
    }

    fn deploy_file(
        &self,
        file: &include_dir::File<'a>,
        project_root: &Path,
        manifest: &mut Manifest,
        renderer: Option<&Renderer>,
        template_ctx: Option<&impl Serialize>,
        options: DeployOptions,
    ) -> Result<()> {
        let src_path = file.path().to_string_lossy().to_string();

        let (dest_rel, bytes): (String, Vec<u8>) = if src_path.ends_with(".tmpl") {
            match (renderer, template_ctx) {
                (Some(r), Some(ctx)) => {
                    let source = std::str::from_utf8(file.contents()).unwrap_or_default();
                    let rendered = r.render_str(source, ctx).map_err(|source| Error::Render {
                        path: src_path.clone(),
                        source,
                    })?;
                    (strip_tmpl_suffix(&src_path), rendered)
                }
                _ => (strip_tmpl_suffix(&src_path), file.contents().to_vec()),
            }
        } else {
            (src_path.clone(), file.contents().to_vec())
        };

        let dest_abs = validate_destination(project_root, &dest_rel)?;

        if !options.force_update {
            if let Some(entry) = manifest.get_entry(&dest_rel) {
                if entry.provenance.is_user_owned() {
                    return Ok(());
                }
            } else if dest_abs.exists() {
                let existing = std::fs::read(&dest_abs)?;
                manifest.track(dest_rel, Provenance::UserCreated, hash_bytes(&existing));
                return Ok(());
            }
        }

        if let Some(parent) = dest_abs.parent() {
            std::fs::create_dir_all(parent)?;
            set_mode(parent, 0o755)?;
        }
        std::fs::write(&dest_abs, &bytes)?;
        let mode = if dest_rel.ends_with(".sh") { 0o755 } else { 0o644 };
        set_mode(&dest_abs, mode)?;

        manifest.track(dest_rel, Provenance::TemplateManaged, hash_bytes(&bytes));
        Ok(())
    }
}

fn collect_paths(dir: &Dir<'_>, out: &mut Vec<String>) {
    for entry in dir.entries() {
        match entry {
            DirEntry::Dir(sub) => collect_paths(sub, out),
            DirEntry::File(file) => out.push(file.path().to_string_lossy().to_string()),
        }
    }
}

fn strip_tmpl_suffix(path: &str) -> String {
    path.strip_suffix(".tmpl").unwrap_or(path).to_string()
}

/// Rejects absolute destinations, `..` components, and any resolved path
/// that escapes `project_root`.
fn validate_destination(project_root: &Path, rel: &str) -> Result<PathBuf> {
    let rel_path = Path::new(rel);
    if rel_path.is_absolute() {
        return Err(Error::PathTraversal { path: rel.to_string() });
    }
    for component in rel_path.components() {
        if matches!(component, std::path::Component::ParentDir) {
            return Err(Error::PathTraversal { path: rel.to_string() });
        }
    }
    let joined = project_root.join(rel_path);
    let cleaned = clean_path(&joined);
    if !cleaned.starts_with(project_root) {
        return Err(Error::PathTraversal { path: rel.to_string() });
    }
    Ok(joined)
}

/// Lexically cleans a path (collapses `.`/`..`) without touching the
/// filesystem, since the destination may not exist yet.
fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::ParentDir => {
                out.pop();
            }
            std::path::Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}
