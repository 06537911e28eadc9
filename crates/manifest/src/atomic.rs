//! Write-temp-sibling-then-rename, the pattern every on-disk document in
//! this workspace (manifest, spec-link registry, loop state) relies on so a
//! crash never leaves a torn write visible to another process.

use std::path::Path;

/// Writes `bytes` to `path` by first writing to `<path>.tmp` in the same
/// directory, then renaming over the destination. `rename` within a single
/// filesystem is atomic on every platform this workspace targets.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp_path = tmp_sibling(path);
    std::fs::write(&tmp_path, bytes)?;
    std::fs::rename(&tmp_path, path)
}

fn tmp_sibling(path: &Path) -> std::path::PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
