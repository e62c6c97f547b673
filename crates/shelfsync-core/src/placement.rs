//! Final placement of verified downloads into the categorized library tree.
//!
//! `ebook` files go to `<root>/ebook/<filetype>/`, everything else to
//! `<root>/<platform>/`. The temp file is moved, not copied; when a rename is
//! impossible (scratch on another filesystem) it is copied and then removed.
//! On failure the temp file is left where it is for manual recovery.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::inventory::EBOOK_PLATFORM;
use crate::matcher::expected_filename;

/// Directory holding files of `platform`/`filetype`.
pub fn target_dir(root: &Path, platform: &str, filetype: &str) -> PathBuf {
    if platform == EBOOK_PLATFORM {
        root.join(EBOOK_PLATFORM).join(filetype.to_ascii_lowercase())
    } else {
        root.join(platform)
    }
}

/// Full final path of an item's file.
pub fn target_path(root: &Path, platform: &str, machine_name: &str, filetype: &str) -> PathBuf {
    target_dir(root, platform, filetype)
        .join(expected_filename(machine_name, &filetype.to_ascii_lowercase()))
}

/// Moves `temp_path` to its final location, creating directories on demand.
/// Returns the final path.
pub fn place(
    temp_path: &Path,
    root: &Path,
    platform: &str,
    machine_name: &str,
    filetype: &str,
) -> Result<PathBuf> {
    let dir = target_dir(root, platform, filetype);
    fs::create_dir_all(&dir).with_context(|| format!("create directory {}", dir.display()))?;
    let final_path = target_path(root, platform, machine_name, filetype);

    if let Err(rename_err) = fs::rename(temp_path, &final_path) {
        tracing::debug!(
            "rename {} -> {} failed ({}), copying instead",
            temp_path.display(),
            final_path.display(),
            rename_err
        );
        fs::copy(temp_path, &final_path).with_context(|| {
            format!(
                "failed to move {} to {}",
                temp_path.display(),
                final_path.display()
            )
        })?;
        if let Err(e) = fs::remove_file(temp_path) {
            tracing::warn!("placed copy but could not remove {}: {}", temp_path.display(), e);
        }
    }
    Ok(final_path)
}
