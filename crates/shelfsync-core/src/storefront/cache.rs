//! Offline manifest cache: a JSON array of raw order documents.

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::error::SetupError;

pub fn load(path: &Path) -> Result<Vec<Value>> {
    let data = fs::read_to_string(path).map_err(|source| SetupError::UnreadableManifest {
        path: path.to_path_buf(),
        source,
    })?;
    let docs: Vec<Value> = serde_json::from_str(&data).map_err(|e| {
        SetupError::MalformedManifest(format!("cache {}: {}", path.display(), e))
    })?;
    Ok(docs)
}

/// Written to `<path>.part`, then renamed over `path`.
pub fn save(path: &Path, docs: &[Value]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".part");
    let tmp = std::path::PathBuf::from(tmp);
    let json = serde_json::to_vec(docs)?;
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("rename {} to {}", tmp.display(), path.display()))?;
    tracing::info!(orders = docs.len(), "wrote manifest cache {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let docs = vec![json!({"product": {"machine_name": "b", "human_name": "B"}, "subproducts": []})];
        save(&path, &docs).unwrap();
        assert_eq!(load(&path).unwrap(), docs);
        assert!(!dir.path().join("data.json.part").exists());
    }

    #[test]
    fn non_array_cache_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, r#"{"not": "an array"}"#).unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SetupError>(),
            Some(SetupError::MalformedManifest(_))
        ));
    }

    #[test]
    fn unreadable_cache_is_setup_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SetupError>(),
            Some(SetupError::UnreadableManifest { .. })
        ));
    }
}
