//! Repository acquisition and directory normalization.
//!
//! Produces a local working tree for a remote repository reference: derives a
//! collision-safe target directory, clones through a sibling temp directory
//! so a failed clone never leaves a half-baked target, verifies the
//! version-control marker and flattens one accidental level of nesting left
//! over by some clone/archive layouts.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;
use tracing::{debug, error, info, warn};

use crate::config::{FlattenPolicy, RunContext};

#[derive(Debug)]
pub enum AcquireError {
    /// The git process could not be started at all.
    Launch(std::io::Error),
    /// git ran and exited unsuccessfully (network, auth, bad reference).
    CloneFailed { url: String, detail: String },
    /// The clone reported success but left no version-control marker.
    MissingGitMarker(PathBuf),
    Io(std::io::Error),
}

impl std::fmt::Display for AcquireError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcquireError::Launch(e) => write!(f, "failed to launch git: {e}"),
            AcquireError::CloneFailed { url, detail } => {
                write!(f, "clone of {url} failed: {detail}")
            }
            AcquireError::MissingGitMarker(p) => {
                write!(f, "clone failed: .git not found in {}", p.display())
            }
            AcquireError::Io(e) => write!(f, "io error during acquisition: {e}"),
        }
    }
}

impl std::error::Error for AcquireError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AcquireError::Launch(e) | AcquireError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AcquireError {
    fn from(e: std::io::Error) -> Self {
        AcquireError::Io(e)
    }
}

/// Extract the repository short name from a remote reference.
///
/// Host-qualified forms (`host/owner/repo[.git]`, `host:owner/repo`) yield
/// the segment after the owner, stopping at the first dot so a `.git` suffix
/// never contributes. Anything else falls back to the last path segment with
/// a trailing `.git` stripped.
pub fn repo_short_name(url: &str) -> String {
    let hosted = Regex::new(r"[A-Za-z0-9.-]+\.[A-Za-z]{2,}[/:]([^/]+)/([^/.]+)").unwrap();
    if let Some(caps) = hosted.captures(url) {
        return caps[2].to_string();
    }
    let last = url
        .rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or(url);
    last.strip_suffix(".git").unwrap_or(last).to_string()
}

fn millis_now() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Resolve the working-tree path for `short_name` under `base`, appending a
/// millisecond timestamp when the plain path is already taken.
///
/// Best-effort uniqueness only, not a lock: two invocations within the same
/// millisecond can still collide.
pub fn derive_target_path(base: &Path, short_name: &str) -> PathBuf {
    let target = base.join(short_name);
    if target.exists() {
        let suffixed = base.join(format!("{}-{}", short_name, millis_now()));
        info!(
            target = %suffixed.display(),
            "Target exists, using timestamped path"
        );
        suffixed
    } else {
        target
    }
}

/// Inject the token as userinfo into http(s) clone URLs. Other transports
/// (ssh) are returned unchanged.
fn authenticated_url(url: &str, token: Option<&str>) -> String {
    match token {
        Some(tok) => {
            if let Some(rest) = url.strip_prefix("https://") {
                format!("https://{tok}@{rest}")
            } else if let Some(rest) = url.strip_prefix("http://") {
                format!("http://{tok}@{rest}")
            } else {
                url.to_string()
            }
        }
        None => url.to_string(),
    }
}

/// Clone `url` into exactly `target`, replacing whatever is there.
///
/// The clone lands in a sibling `_temp_` directory first and is moved over
/// entry by entry, so the target is only ever a complete working tree. The
/// presence of `target/.git` is verified before returning.
pub fn clone_repository(
    ctx: &RunContext,
    url: &str,
    target: &Path,
    token: Option<&str>,
) -> Result<PathBuf, AcquireError> {
    if target.exists() {
        info!(target = %target.display(), "Target directory exists, cleaning it up");
        cleanup_directory(target);
    }

    let parent = target.parent().unwrap_or_else(|| Path::new("."));
    let temp_name = format!(
        "{}_temp_{}",
        target.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
        millis_now()
    );
    let temp_dir = parent.join(temp_name);
    fs::create_dir_all(&temp_dir)?;

    info!(
        run_id = %ctx.run_id,
        url = url,
        temp = %temp_dir.display(),
        "Cloning repository"
    );

    let clone_url = authenticated_url(url, token);
    let status = Command::new("git")
        .arg("clone")
        .arg(&clone_url)
        .arg(&temp_dir)
        .status();

    match status {
        Ok(s) if s.success() => {
            debug!(url = url, "git clone exited successfully");
        }
        Ok(s) => {
            error!(url = url, status = ?s, "git clone exited with non-zero code");
            cleanup_directory(&temp_dir);
            return Err(AcquireError::CloneFailed {
                url: url.to_string(),
                detail: format!("git exited with {s}"),
            });
        }
        Err(e) => {
            error!(error = ?e, url = url, "Failed to launch git process");
            cleanup_directory(&temp_dir);
            return Err(AcquireError::Launch(e));
        }
    }

    fs::create_dir_all(target)?;
    move_entries(&temp_dir, target)?;
    cleanup_directory(&temp_dir);

    if !target.join(".git").exists() {
        return Err(AcquireError::MissingGitMarker(target.to_path_buf()));
    }
    info!(run_id = %ctx.run_id, target = %target.display(), "Repository ready");
    Ok(target.to_path_buf())
}

/// Move every entry below `src_root` to the same relative path below
/// `dest_root`, creating parents and overwriting on conflict. Per-entry
/// failures are logged and skipped; only enumeration failures abort.
fn move_entries(src_root: &Path, dest_root: &Path) -> Result<(), AcquireError> {
    fn visit(dir: &Path, src_root: &Path, dest_root: &Path) -> Result<(), AcquireError> {
        for entry_res in fs::read_dir(dir)? {
            let entry = entry_res?;
            let path = entry.path();
            let rel = path.strip_prefix(src_root).unwrap();
            let dest = dest_root.join(rel);
            if path.is_dir() {
                if let Err(e) = fs::create_dir_all(&dest) {
                    error!(error = ?e, dest = %dest.display(), "Failed to create directory while moving");
                    continue;
                }
                visit(&path, src_root, dest_root)?;
            } else {
                if let Some(parent) = dest.parent() {
                    if let Err(e) = fs::create_dir_all(parent) {
                        error!(error = ?e, dest = %dest.display(), "Failed to create parent while moving");
                        continue;
                    }
                }
                if let Err(e) = fs::rename(&path, &dest) {
                    error!(
                        error = ?e,
                        source = %path.display(),
                        dest = %dest.display(),
                        "Error moving entry"
                    );
                }
            }
        }
        Ok(())
    }
    visit(src_root, src_root, dest_root)
}

/// Flatten one accidental nesting level: when `root/short_name` exists as a
/// directory, every descendant is moved up to `root` (parents created,
/// conflicts overwritten) and the emptied subdirectory is pruned bottom-up.
///
/// A tree without a matching subdirectory is left untouched. The `policy`
/// decides whether one failed move aborts acquisition or is logged and
/// skipped.
pub fn flatten_nested_checkout(
    ctx: &RunContext,
    root: &Path,
    short_name: &str,
    policy: FlattenPolicy,
) -> Result<(), AcquireError> {
    let nested = root.join(short_name);
    if !nested.is_dir() {
        debug!(root = %root.display(), "No nested checkout folder, nothing to flatten");
        return Ok(());
    }
    info!(
        run_id = %ctx.run_id,
        nested = %nested.display(),
        "Detected nested folder, flattening"
    );

    fn visit(
        dir: &Path,
        nested_root: &Path,
        dest_root: &Path,
        policy: FlattenPolicy,
    ) -> Result<(), AcquireError> {
        for entry_res in fs::read_dir(dir)? {
            let entry = entry_res?;
            let path = entry.path();
            let rel = path.strip_prefix(nested_root).unwrap();
            let dest = dest_root.join(rel);
            let moved: Result<(), std::io::Error> = if path.is_dir() {
                fs::create_dir_all(&dest)
            } else {
                match dest.parent() {
                    Some(parent) => fs::create_dir_all(parent)
                        .and_then(|_| fs::rename(&path, &dest)),
                    None => fs::rename(&path, &dest),
                }
            };
            match moved {
                Ok(()) => {
                    if path.is_dir() {
                        visit(&path, nested_root, dest_root, policy)?;
                    }
                }
                Err(e) => {
                    error!(
                        error = ?e,
                        source = %path.display(),
                        dest = %dest.display(),
                        "Error flattening entry"
                    );
                    if policy == FlattenPolicy::Abort {
                        return Err(AcquireError::Io(e));
                    }
                }
            }
        }
        Ok(())
    }
    visit(&nested, &nested, root, policy)?;

    prune_empty_dirs(&nested);
    Ok(())
}

/// Remove a directory skeleton bottom-up, leaving any non-empty directory
/// (and whatever it still contains) in place.
fn prune_empty_dirs(dir: &Path) {
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                prune_empty_dirs(&path);
            }
        }
    }
    let _ = fs::remove_dir(dir);
}

/// Recursively delete a directory. Best-effort: failures are logged and
/// never escalate into the run's outcome.
pub fn cleanup_directory(dir: &Path) {
    if dir.exists() {
        if let Err(e) = fs::remove_dir_all(dir) {
            warn!(error = ?e, dir = %dir.display(), "Failed to delete directory");
        }
    }
}

/// Full acquisition for one run: resolve the target under the configured
/// destination, clone into it and flatten a nested checkout if present.
pub fn acquire_repository(
    ctx: &RunContext,
    base: &Path,
    token: Option<&str>,
    policy: FlattenPolicy,
) -> Result<PathBuf, AcquireError> {
    let target = derive_target_path(base, &ctx.repo_name);
    let repo_path = clone_repository(ctx, &ctx.repo_url, &target, token)?;
    flatten_nested_checkout(ctx, &repo_path, &ctx.repo_name, policy)?;
    Ok(repo_path)
}
