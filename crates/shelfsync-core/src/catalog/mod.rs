//! Uniform catalog of owned items and their downloadable assets.
//!
//! Built once per run by [`normalize`] from raw order documents and read-only
//! afterwards. `machine_name` is the join key between the catalog and the local
//! library; lookups compare it case-insensitively.

pub mod filetype;
mod normalize;

pub use filetype::{derive_filetype, is_placeholder_url};
pub use normalize::normalize;

use std::collections::BTreeSet;
use std::fmt;

/// Labels that mean "the best available miscellaneous asset" when no exact
/// label match exists.
pub const FALLBACK_LABELS: [&str; 6] = [
    "download",
    "supplement",
    "mp3",
    "companion file",
    "installer",
    ".zip",
];

/// Sentinel used in source data (and logs) for a digest that was not provided.
pub const DIGEST_NOT_PROVIDED: &str = "n/a";

/// A digest as declared by the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredDigest {
    /// Hex digest, trimmed and lowercased.
    Provided(String),
    /// Absent from the source (or the explicit `"n/a"` sentinel). Unchecked,
    /// never a mismatch.
    NotProvided,
}

impl DeclaredDigest {
    /// Parses a manifest value; `"n/a"` and empty strings become `NotProvided`.
    pub fn parse(value: &str) -> Self {
        let v = value.trim();
        if v.is_empty() || v.eq_ignore_ascii_case(DIGEST_NOT_PROVIDED) {
            DeclaredDigest::NotProvided
        } else {
            DeclaredDigest::Provided(v.to_ascii_lowercase())
        }
    }

    pub fn from_optional(value: Option<&str>) -> Self {
        value.map(Self::parse).unwrap_or(DeclaredDigest::NotProvided)
    }

    pub fn as_str(&self) -> &str {
        match self {
            DeclaredDigest::Provided(hex) => hex,
            DeclaredDigest::NotProvided => DIGEST_NOT_PROVIDED,
        }
    }
}

impl fmt::Display for DeclaredDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One downloadable file variant of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Free-form label from the manifest ("PDF", "Download", ...).
    pub declared_name: String,
    pub url: String,
    pub human_size: String,
    pub md5: DeclaredDigest,
    pub sha1: DeclaredDigest,
}

impl Asset {
    /// Filetype derived from the URL (empty for placeholder URLs).
    pub fn filetype(&self) -> String {
        derive_filetype(&self.url)
    }

    fn label_is(&self, wanted: &str) -> bool {
        self.declared_name.eq_ignore_ascii_case(wanted)
    }

    /// True if the label is one of [`FALLBACK_LABELS`].
    pub fn has_fallback_label(&self) -> bool {
        FALLBACK_LABELS.iter().any(|l| self.label_is(l))
    }
}

/// How an asset was selected for a requested filetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedBy {
    /// Label equals the filetype (case-insensitive).
    Label,
    /// Filetype derived from the asset URL equals the requested one.
    UrlFiletype,
    /// Label is in the known fallback set.
    FallbackLabel,
}

/// One owned item on one platform, with its assets. Never has an empty asset list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub bundle_id: String,
    pub bundle_name: String,
    pub item_machine_name: String,
    pub item_human_name: String,
    pub platform: String,
    pub assets: Vec<Asset>,
}

impl CatalogEntry {
    /// Download URL resolution: exact label, then URL-derived filetype, then the
    /// fallback label set. `None` when nothing matches.
    pub fn resolve_asset(&self, filetype: &str) -> Option<(&Asset, MatchedBy)> {
        if let Some(a) = self.assets.iter().find(|a| a.label_is(filetype)) {
            return Some((a, MatchedBy::Label));
        }
        let wanted = filetype.to_ascii_lowercase();
        if let Some(a) = self.assets.iter().find(|a| a.filetype() == wanted) {
            return Some((a, MatchedBy::UrlFiletype));
        }
        self.assets
            .iter()
            .find(|a| a.has_fallback_label())
            .map(|a| (a, MatchedBy::FallbackLabel))
    }
}

/// All catalog entries of a run plus the distinct platforms they cover.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
    pub platforms: BTreeSet<String>,
}

impl Catalog {
    pub fn push(&mut self, entry: CatalogEntry) {
        self.platforms.insert(entry.platform.clone());
        self.entries.push(entry);
    }

    pub fn for_platform<'a>(&'a self, platform: &'a str) -> impl Iterator<Item = &'a CatalogEntry> {
        self.entries.iter().filter(move |e| e.platform == platform)
    }

    /// First entry of `platform` with this machine name (case-insensitive).
    pub fn find(&self, platform: &str, machine_name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| {
            e.platform == platform && e.item_machine_name.eq_ignore_ascii_case(machine_name)
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn asset(label: &str, url: &str, md5: &str) -> Asset {
        Asset {
            declared_name: label.to_string(),
            url: url.to_string(),
            human_size: "1 MB".to_string(),
            md5: DeclaredDigest::parse(md5),
            sha1: DeclaredDigest::NotProvided,
        }
    }

    pub(crate) fn entry(machine_name: &str, platform: &str, assets: Vec<Asset>) -> CatalogEntry {
        CatalogEntry {
            bundle_id: "bundle".to_string(),
            bundle_name: "Bundle".to_string(),
            item_machine_name: machine_name.to_string(),
            item_human_name: format!("{machine_name} (human)"),
            platform: platform.to_string(),
            assets,
        }
    }

    #[test]
    fn declared_digest_sentinel_and_normalization() {
        assert_eq!(DeclaredDigest::parse("n/a"), DeclaredDigest::NotProvided);
        assert_eq!(DeclaredDigest::parse(""), DeclaredDigest::NotProvided);
        assert_eq!(
            DeclaredDigest::parse(" ABCdef "),
            DeclaredDigest::Provided("abcdef".to_string())
        );
        assert_eq!(DeclaredDigest::from_optional(None).as_str(), "n/a");
    }

    #[test]
    fn resolve_prefers_exact_label() {
        let e = entry(
            "alpha",
            "ebook",
            vec![
                asset("EPUB", "https://dl/alpha.epub", "1"),
                asset("PDF", "https://dl/alpha.pdf", "2"),
            ],
        );
        let (a, by) = e.resolve_asset("pdf").unwrap();
        assert_eq!(a.url, "https://dl/alpha.pdf");
        assert_eq!(by, MatchedBy::Label);
    }

    #[test]
    fn resolve_by_url_filetype() {
        let e = entry(
            "alpha",
            "ebook",
            vec![asset("PDF (HQ)", "https://dl/alpha_hq.pdf?t=1", "1")],
        );
        let (_, by) = e.resolve_asset("pdf").unwrap();
        assert_eq!(by, MatchedBy::UrlFiletype);
    }

    #[test]
    fn installer_label_resolves_via_fallback_set() {
        let e = entry(
            "game",
            "windows",
            vec![asset("Installer", "https://dl/game_setup.exe", "1")],
        );
        let (a, by) = e.resolve_asset("zip").unwrap();
        assert_eq!(by, MatchedBy::FallbackLabel);
        assert_eq!(a.declared_name, "Installer");
    }

    #[test]
    fn resolve_unmatched_is_none() {
        let e = entry("game", "windows", vec![asset("64-bit", "https://dl/g.exe", "1")]);
        assert!(e.resolve_asset("zip").is_none());
    }

    #[test]
    fn catalog_find_is_case_insensitive() {
        let mut c = Catalog::default();
        c.push(entry("Alpha_Book", "ebook", vec![asset("PDF", "https://dl/a.pdf", "1")]));
        assert!(c.find("ebook", "alpha_book").is_some());
        assert!(c.find("audio", "alpha_book").is_none());
        assert!(c.find("ebook", "beta").is_none());
        assert_eq!(c.platforms.iter().collect::<Vec<_>>(), vec!["ebook"]);
    }
}
