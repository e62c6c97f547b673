//! Filetype derivation from asset URLs.
//!
//! Asset labels in the manifest ("PDF", "Download", "Installer", ...) are not
//! reliable, so the filetype is always taken from the URL path.

/// Token the storefront leaves in URLs it never filled in.
pub const PLACEHOLDER_TOKEN: &str = "FILE_NAME";

/// True if the URL still carries the un-substituted placeholder token.
pub fn is_placeholder_url(url: &str) -> bool {
    url.contains(PLACEHOLDER_TOKEN)
}

/// Derives the lowercase filetype from the last path segment of `url`.
///
/// Query string and fragment are ignored. Returns an empty string when the URL
/// is a placeholder or the last segment has no dot-delimited suffix.
///
/// - `derive_filetype("https://host/path/file.PDF?sig=abc")` → `"pdf"`
/// - `derive_filetype("https://host/FILE_NAME_placeholder")` → `""`
pub fn derive_filetype(url: &str) -> String {
    if is_placeholder_url(url) {
        return String::new();
    }
    let Some(segment) = last_path_segment(url) else {
        return String::new();
    };
    match segment.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Last non-empty path segment, parsed with `url` when possible and falling back
/// to plain string splitting for relative or malformed values.
fn last_path_segment(url: &str) -> Option<String> {
    if let Ok(parsed) = url::Url::parse(url) {
        return parsed
            .path_segments()
            .and_then(|mut s| s.rfind(|seg| !seg.is_empty()).map(str::to_string));
    }
    let path = url.split(['?', '#']).next().unwrap_or("");
    path.split('/')
        .filter(|s| !s.is_empty())
        .last()
        .map(str::to_string)
}
