//! Command implementations

pub mod collect;
pub mod config;
pub mod defaults;
pub mod list;
pub mod remove;

use anyhow::{Context, Result};
use std::path::{Component, Path, PathBuf};

/// Tracked files are keyed by absolute, lexically cleaned path
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(clean(path));
    }
    let cwd = std::env::current_dir().context("Cannot determine the current directory")?;
    Ok(clean(&cwd.join(path)))
}

/// Drop `.` components and resolve `..` without touching the file system,
/// the tracked file may not exist yet
fn clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if matches!(cleaned.components().next_back(), Some(Component::Normal(_))) {
                    cleaned.pop();
                }
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}
