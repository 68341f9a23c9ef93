//! Mirror applier
//!
//! Copies the source directory into the destination as is. Repository
//! metadata (`.git`) and dotkeep's own files (`.dotkeep*`) are never copied.
//! Existing files whose contents differ are only replaced when the pre-apply
//! hook agrees.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use dotkeep_core::Config;
use dotkeep_init::{Applier, ApplyRequest, PreApplyHook};
use std::fs;
use tracing::{debug, warn};
use walkdir::WalkDir;

const DIR_MODE: u32 = 0o777;
const FILE_MODE: u32 = 0o666;
const EXECUTABLE_MODE: u32 = 0o777;

/// Applies the source tree by mirroring it into the destination
#[derive(Debug, Clone, Copy, Default)]
pub struct MirrorApplier;

impl MirrorApplier {
    pub fn new() -> Self {
        Self
    }
}

/// Whether a source entry is never copied
fn is_ignored(name: &str) -> bool {
    name == ".git" || name.starts_with(".dotkeep")
}

/// Whether `relative` is selected by `targets`
fn is_targeted(relative: &Utf8Path, targets: &[Utf8PathBuf], recursive: bool) -> bool {
    if targets.is_empty() {
        return true;
    }
    targets.iter().any(|target| {
        relative == target.as_path()
            || target.starts_with(relative)
            || (recursive && relative.starts_with(target))
    })
}

#[cfg(unix)]
fn set_mode(path: &Utf8Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("Failed to set permissions on {}", path))
}

#[cfg(not(unix))]
fn set_mode(_path: &Utf8Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    false
}

impl Applier for MirrorApplier {
    fn apply(
        &self,
        config: &Config,
        request: &ApplyRequest,
        pre_apply: &PreApplyHook<'_>,
    ) -> anyhow::Result<()> {
        let source_root = &config.source_dir;
        let umask = request.umask;

        let walker = WalkDir::new(source_root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_ignored(&e.file_name().to_string_lossy()));

        for entry in walker {
            let entry = entry?;
            let source = Utf8Path::from_path(entry.path())
                .with_context(|| format!("Non UTF-8 path: {}", entry.path().display()))?;
            let relative = source.strip_prefix(source_root)?;
            if !is_targeted(relative, &request.targets, request.recursive) {
                continue;
            }
            let dest = request.dest_root.join(relative);
            let file_type = entry.file_type();

            if file_type.is_dir() {
                if request.include.dirs && !dest.is_dir() {
                    debug!("Creating directory {}", dest);
                    fs::create_dir_all(&dest)
                        .with_context(|| format!("Failed to create directory {}", dest))?;
                    set_mode(&dest, DIR_MODE & !umask)?;
                }
            } else if file_type.is_file() {
                if request.include.files {
                    apply_file(source, &dest, relative, umask, pre_apply)?;
                }
            } else if file_type.is_symlink() {
                if request.include.symlinks {
                    apply_symlink(source, &dest, relative, pre_apply)?;
                }
            } else {
                warn!("Skipping unsupported entry {}", source);
            }
        }

        Ok(())
    }
}

fn ensure_parent(dest: &Utf8Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent))?;
    }
    Ok(())
}

fn apply_file(
    source: &Utf8Path,
    dest: &Utf8Path,
    relative: &Utf8Path,
    umask: u32,
    pre_apply: &PreApplyHook<'_>,
) -> Result<()> {
    let contents = fs::read(source).with_context(|| format!("Failed to read {}", source))?;

    if let Ok(existing) = fs::read(dest) {
        if existing == contents {
            return Ok(());
        }
        if !pre_apply(relative)? {
            debug!("Skipping {}", relative);
            return Ok(());
        }
    }

    let mode = if is_executable(&fs::metadata(source)?) {
        EXECUTABLE_MODE
    } else {
        FILE_MODE
    };

    debug!("Writing {}", dest);
    ensure_parent(dest)?;
    fs::write(dest, &contents).with_context(|| format!("Failed to write {}", dest))?;
    set_mode(dest, mode & !umask)
}

#[cfg(unix)]
fn apply_symlink(
    source: &Utf8Path,
    dest: &Utf8Path,
    relative: &Utf8Path,
    pre_apply: &PreApplyHook<'_>,
) -> Result<()> {
    let link_target = fs::read_link(source)
        .with_context(|| format!("Failed to read symlink {}", source))?;

    if let Ok(metadata) = fs::symlink_metadata(dest) {
        if metadata.file_type().is_symlink() && fs::read_link(dest)? == link_target {
            return Ok(());
        }
        if !pre_apply(relative)? {
            debug!("Skipping {}", relative);
            return Ok(());
        }
        if metadata.is_dir() {
            fs::remove_dir_all(dest)?;
        } else {
            fs::remove_file(dest)?;
        }
    }

    debug!("Linking {} -> {}", dest, link_target.display());
    ensure_parent(dest)?;
    std::os::unix::fs::symlink(&link_target, dest)
        .with_context(|| format!("Failed to create symlink {}", dest))
}

#[cfg(not(unix))]
fn apply_symlink(
    source: &Utf8Path,
    _dest: &Utf8Path,
    _relative: &Utf8Path,
    _pre_apply: &PreApplyHook<'_>,
) -> Result<()> {
    warn!("Symlinks are not supported on this platform, skipping {}", source);
    Ok(())
}
