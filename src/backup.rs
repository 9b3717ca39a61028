//! Sibling-file backups.
//!
//! Every transformed file keeps its original content next to it under the
//! same name plus a suffix (`foo.tab.c` -> `foo.tab.c.bak`), so a bad run is
//! recoverable by re-running bisonfix against the restored original.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_SUFFIX: &str = ".bak";

/// Path of the backup belonging to `file_path`.
pub fn backup_path(file_path: &Path, suffix: &str) -> PathBuf {
    let mut name = file_path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Copy `file_path` to its backup path, returning the backup location.
pub fn create(file_path: &Path, suffix: &str) -> Result<PathBuf> {
    let backup = backup_path(file_path, suffix);
    fs::copy(file_path, &backup).with_context(|| {
        format!(
            "Failed to back up {} to {}",
            file_path.display(),
            backup.display()
        )
    })?;
    info!(backup = %backup.display(), "wrote backup");
    Ok(backup)
}

/// Copy the backup back over the original.
pub fn restore(file_path: &Path, suffix: &str) -> Result<()> {
    let backup = backup_path(file_path, suffix);
    if !backup.exists() {
        bail!(
            "No backup found for {} (expected {})",
            file_path.display(),
            backup.display()
        );
    }
    fs::copy(&backup, file_path).with_context(|| {
        format!(
            "Failed to restore {} from {}",
            file_path.display(),
            backup.display()
        )
    })?;
    info!(file = %file_path.display(), "restored from backup");
    Ok(())
}

/// The suffix becomes part of a sibling file name, nothing more.
pub fn validate_suffix(suffix: &str) -> Result<()> {
    if suffix.is_empty() {
        bail!("Backup suffix must not be empty");
    }
    if suffix.contains('/') || suffix.contains('\\') {
        bail!("Backup suffix must not contain path separators");
    }
    Ok(())
}
