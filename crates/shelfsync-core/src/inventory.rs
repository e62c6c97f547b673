//! Local inventory: which files already exist for a platform.
//!
//! Most platforms keep their files in one flat directory (`<root>/<platform>/`).
//! Ebooks are filed per filetype (`<root>/ebook/pdf/`, `<root>/ebook/epub/`, ...)
//! so that platform is walked recursively.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Platform whose files live in per-filetype subdirectories.
pub const EBOOK_PLATFORM: &str = "ebook";

/// Filenames (not paths) present for `platform` under `root`.
///
/// A platform directory that does not exist yet yields an empty set.
pub fn scan(root: &Path, platform: &str) -> Result<BTreeSet<String>> {
    let dir = root.join(platform);
    let mut names = BTreeSet::new();
    if !dir.is_dir() {
        return Ok(names);
    }
    let recursive = platform == EBOOK_PLATFORM;
    collect(&dir, recursive, &mut names)?;
    tracing::debug!(platform, count = names.len(), "scanned {}", dir.display());
    Ok(names)
}

fn collect(dir: &Path, recursive: bool, names: &mut BTreeSet<String>) -> Result<()> {
    let entries = fs::read_dir(dir).with_context(|| format!("list {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("list {}", dir.display()))?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            if recursive {
                collect(&entry.path(), true, names)?;
            }
        } else if file_type.is_file() {
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn missing_platform_dir_is_empty() {
        let root = tempfile::tempdir().unwrap();
        assert!(scan(root.path(), "video").unwrap().is_empty());
    }

    #[test]
    fn flat_platform_ignores_subdirectories() {
        let root = tempfile::tempdir().unwrap();
        touch(&root.path().join("windows/game.zip"));
        touch(&root.path().join("windows/old/stale.zip"));
        let names = scan(root.path(), "windows").unwrap();
        assert_eq!(names.into_iter().collect::<Vec<_>>(), vec!["game.zip"]);
    }

    #[test]
    fn ebook_platform_is_recursive() {
        let root = tempfile::tempdir().unwrap();
        touch(&root.path().join("ebook/pdf/alpha.pdf"));
        touch(&root.path().join("ebook/epub/alpha.epub"));
        touch(&root.path().join("ebook/loose.mobi"));
        let names = scan(root.path(), "ebook").unwrap();
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec!["alpha.epub", "alpha.pdf", "loose.mobi"]
        );
    }
}
