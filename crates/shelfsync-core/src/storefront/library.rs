//! Library page parsing: login detection and the embedded order-key data island.

use anyhow::Result;
use regex::Regex;
use serde::Deserialize;

use crate::error::SetupError;

/// `id` of the `<script type="application/json">` block holding the user's orders.
pub const DATA_ISLAND_ID: &str = "user-home-json-data";

#[derive(Debug, Deserialize)]
struct UserHome {
    #[serde(default)]
    gamekeys: Vec<String>,
}

/// True if the page is the storefront's login form rather than the library.
pub fn is_login_page(html: &str) -> Result<bool> {
    let title = Regex::new(r"(?is)<title[^>]*>(.*?)</title>")?;
    Ok(title
        .captures(html)
        .and_then(|c| c.get(1))
        .is_some_and(|t| t.as_str().contains("Log In")))
}

/// Raw JSON text of the data island, if the page carries one.
pub fn data_island(html: &str) -> Result<Option<&str>> {
    let pattern = format!(
        r#"(?is)<script\b[^>]*\bid\s*=\s*["']{}["'][^>]*>(.*?)</script>"#,
        regex::escape(DATA_ISLAND_ID)
    );
    let re = Regex::new(&pattern)?;
    Ok(re
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim()))
}

/// Order keys listed on the library page.
///
/// Errors are [`SetupError`]s: login page, missing island, undecodable island
/// or an empty key list.
pub fn order_keys(html: &str) -> Result<Vec<String>> {
    if is_login_page(html)? {
        return Err(SetupError::NotLoggedIn.into());
    }
    let island = data_island(html)?.ok_or(SetupError::MissingDataIsland)?;
    let home: UserHome = serde_json::from_str(island)
        .map_err(|e| SetupError::MalformedManifest(format!("library data island: {}", e)))?;
    if home.gamekeys.is_empty() {
        return Err(SetupError::NoOrderKeys.into());
    }
    Ok(home.gamekeys)
}
