//! Manifest normalizer: raw per-order JSON documents → [`Catalog`].
//!
//! The top-level document shape is validated strictly; sub-items are decoded
//! one by one and any item that does not fit the expected shape is skipped.

use serde::Deserialize;
use serde_json::Value;

use super::{Asset, Catalog, CatalogEntry, DeclaredDigest};
use crate::error::SetupError;

#[derive(Debug, Deserialize)]
struct RawOrder {
    product: RawProduct,
    subproducts: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    machine_name: String,
    human_name: String,
}

#[derive(Debug, Deserialize)]
struct RawSubproduct {
    machine_name: String,
    human_name: String,
    #[serde(default)]
    downloads: Vec<RawDownload>,
}

#[derive(Debug, Deserialize)]
struct RawDownload {
    platform: String,
    #[serde(default)]
    download_struct: Vec<RawDownloadStruct>,
}

#[derive(Debug, Deserialize)]
struct RawDownloadStruct {
    name: String,
    url: RawUrl,
    #[serde(default)]
    human_size: String,
    md5: String,
    #[serde(default)]
    sha1: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawUrl {
    web: String,
}

/// Builds the catalog from raw order documents, in order.
///
/// Fails with [`SetupError::MalformedManifest`] only when a document itself is
/// not an order (missing `product` names or `subproducts` array). Items without
/// downloads, or with a download record that cannot be decoded, are skipped.
pub fn normalize(raw: &[Value]) -> Result<Catalog, SetupError> {
    let mut catalog = Catalog::default();

    for (index, doc) in raw.iter().enumerate() {
        let order: RawOrder = serde_json::from_value(doc.clone()).map_err(|e| {
            SetupError::MalformedManifest(format!("order document {index}: {e}"))
        })?;

        let mut kept = 0usize;
        for item in &order.subproducts {
            let sub: RawSubproduct = match serde_json::from_value(item.clone()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::debug!(
                        bundle = %order.product.machine_name,
                        "skipping sub-item with unexpected shape: {}",
                        e
                    );
                    continue;
                }
            };
            if let Some(entry) = build_entry(&order.product, sub) {
                catalog.push(entry);
                kept += 1;
            }
        }
        tracing::debug!(
            bundle = %order.product.machine_name,
            items = order.subproducts.len(),
            kept,
            "normalized bundle"
        );
    }

    Ok(catalog)
}

fn build_entry(product: &RawProduct, sub: RawSubproduct) -> Option<CatalogEntry> {
    let download = sub.downloads.into_iter().next()?;
    if download.download_struct.is_empty() {
        return None;
    }
    let assets = download
        .download_struct
        .into_iter()
        .map(|d| Asset {
            declared_name: d.name,
            url: d.url.web,
            human_size: d.human_size,
            md5: DeclaredDigest::parse(&d.md5),
            sha1: DeclaredDigest::from_optional(d.sha1.as_deref()),
        })
        .collect();

    Some(CatalogEntry {
        bundle_id: product.machine_name.clone(),
        bundle_name: product.human_name.clone(),
        item_machine_name: sub.machine_name,
        item_human_name: sub.human_name,
        platform: download.platform,
        assets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order(subproducts: Value) -> Value {
        json!({
            "product": { "machine_name": "bookbundle", "human_name": "Book Bundle" },
            "subproducts": subproducts
        })
    }

    #[test]
    fn builds_entry_with_optional_sha1() {
        let raw = vec![order(json!([
            {
                "machine_name": "alpha",
                "human_name": "Alpha",
                "downloads": [{
                    "platform": "ebook",
                    "download_struct": [
                        { "name": "PDF", "url": { "web": "https://dl/alpha.pdf" },
                          "human_size": "1 MB", "md5": "ABC" },
                        { "name": "EPUB", "url": { "web": "https://dl/alpha.epub" },
                          "human_size": "2 MB", "md5": "def", "sha1": "0123" }
                    ]
                }]
            }
        ]))];
        let catalog = normalize(&raw).unwrap();
        assert_eq!(catalog.entries.len(), 1);
        let e = &catalog.entries[0];
        assert_eq!(e.bundle_id, "bookbundle");
        assert_eq!(e.bundle_name, "Book Bundle");
        assert_eq!(e.platform, "ebook");
        assert_eq!(e.assets.len(), 2);
        assert_eq!(e.assets[0].md5, DeclaredDigest::Provided("abc".into()));
        assert_eq!(e.assets[0].sha1, DeclaredDigest::NotProvided);
        assert_eq!(e.assets[1].sha1, DeclaredDigest::Provided("0123".into()));
        assert!(catalog.platforms.contains("ebook"));
    }

    #[test]
    fn skips_items_without_downloads() {
        let raw = vec![order(json!([
            { "machine_name": "keyonly", "human_name": "Steam key" },
            { "machine_name": "empty", "human_name": "Empty", "downloads": [] },
            { "machine_name": "nostruct", "human_name": "No struct",
              "downloads": [{ "platform": "audio", "download_struct": [] }] },
            { "machine_name": "song", "human_name": "Song",
              "downloads": [{ "platform": "audio", "download_struct": [
                  { "name": "MP3", "url": { "web": "https://dl/song.zip" },
                    "human_size": "5 MB", "md5": "aa" } ] }] }
        ]))];
        let catalog = normalize(&raw).unwrap();
        let names: Vec<_> = catalog
            .entries
            .iter()
            .map(|e| e.item_machine_name.as_str())
            .collect();
        assert_eq!(names, vec!["song"]);
        assert_eq!(catalog.platforms.len(), 1);
    }

    #[test]
    fn skips_only_the_irregular_item() {
        let raw = vec![order(json!([
            { "machine_name": "broken", "human_name": "Broken",
              "downloads": [{ "platform": "linux", "download_struct": [
                  { "name": "Download", "url": {}, "md5": "aa" } ] }] },
            "not even an object",
            { "machine_name": "ok", "human_name": "Ok",
              "downloads": [{ "platform": "linux", "download_struct": [
                  { "name": "Download", "url": { "web": "https://dl/ok.tar.gz" },
                    "human_size": "5 MB", "md5": "bb" } ] }] }
        ]))];
        let catalog = normalize(&raw).unwrap();
        assert_eq!(catalog.entries.len(), 1);
        assert_eq!(catalog.entries[0].item_machine_name, "ok");
    }

    #[test]
    fn new_platform_values_are_tolerated() {
        let raw = vec![order(json!([
            { "machine_name": "x", "human_name": "X",
              "downloads": [{ "platform": "hologram", "download_struct": [
                  { "name": "Download", "url": { "web": "https://dl/x.holo" },
                    "human_size": "1 KB", "md5": "cc" } ] }] }
        ]))];
        let catalog = normalize(&raw).unwrap();
        assert!(catalog.platforms.contains("hologram"));
    }

    #[test]
    fn malformed_top_level_fails_closed() {
        let raw = vec![json!({ "subproducts": [] })];
        assert!(matches!(
            normalize(&raw),
            Err(SetupError::MalformedManifest(_))
        ));
        let raw = vec![json!([1, 2, 3])];
        assert!(normalize(&raw).is_err());
    }
}
