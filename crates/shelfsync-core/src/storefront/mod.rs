//! Remote manifest source: the storefront library page and per-order API.
//!
//! A run takes its raw order documents either from the local cache file (when
//! present; fully offline) or from the storefront using a session cookie.

pub mod cache;
pub mod library;

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::config::{SyncConfig, TransportConfig};
use crate::error::SetupError;
use crate::http::HttpClient;
use crate::report::Console;

/// Where a run's manifest came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    Cache(PathBuf),
    Remote,
}

/// Reads the session cookie and returns it as a `Cookie` header value.
///
/// The first line is either a JSON object of cookie name to value or an
/// already-formatted header value (`a=1; b=2`).
pub fn load_cookie(path: &Path) -> Result<String, SetupError> {
    let text = fs::read_to_string(path).map_err(|source| SetupError::Credential {
        path: path.to_path_buf(),
        source,
    })?;
    let line = text.lines().next().unwrap_or("").trim();
    if line.is_empty() {
        return Err(SetupError::EmptyCredential(path.to_path_buf()));
    }
    if line.starts_with('{') {
        let map: serde_json::Map<String, Value> = serde_json::from_str(line).map_err(|e| {
            SetupError::InvalidConfig(format!("cookie file {}: {}", path.display(), e))
        })?;
        let pairs: Vec<String> = map
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => format!("{}={}", k, s),
                other => format!("{}={}", k, other),
            })
            .collect();
        if pairs.is_empty() {
            return Err(SetupError::EmptyCredential(path.to_path_buf()));
        }
        return Ok(pairs.join("; "));
    }
    Ok(line.to_string())
}

/// Authenticated storefront client.
pub struct Storefront {
    client: HttpClient,
    base: Url,
}

impl Storefront {
    pub fn new(base_url: &str, transport: TransportConfig, cookie: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| SetupError::InvalidConfig(format!("storefront base_url {}: {}", base_url, e)))?;
        let client = HttpClient::new(transport)
            .with_header("Cookie", cookie)
            .with_header("Accept", "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8")
            .with_header("Accept-Language", "en-US,en;q=0.5");
        Ok(Self { client, base })
    }

    pub fn library_url(&self) -> Result<Url> {
        Ok(self.base.join("/home/library")?)
    }

    pub fn order_url(&self, key: &str) -> Result<Url> {
        let mut url = self.base.join("/api/v1/order/")?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("storefront base_url cannot carry a path"))?
            .pop_if_empty()
            .push(key);
        url.set_query(Some("all_tpkds=true"));
        Ok(url)
    }

    /// Order keys from the library page.
    pub fn order_keys(&self) -> Result<Vec<String>> {
        let url = self.library_url()?;
        let body = self
            .client
            .get_bytes(url.as_str())
            .with_context(|| format!("fetch library page {}", url))?;
        let html = String::from_utf8_lossy(&body);
        library::order_keys(&html)
    }

    /// One raw order document.
    pub fn order(&self, key: &str) -> Result<Value> {
        let url = self.order_url(key)?;
        let body = self
            .client
            .get_bytes(url.as_str())
            .with_context(|| format!("fetch order {}", key))?;
        serde_json::from_slice(&body)
            .map_err(|e| SetupError::MalformedManifest(format!("order {}: {}", key, e)).into())
    }

    /// Every order listed in the library, in listing order. Any failure is fatal.
    pub fn fetch_all(&self, console: Console) -> Result<Vec<Value>> {
        console.detail("Fetching your keys...");
        let keys = self.order_keys()?;
        console.detail(format!("Got {} keys, fetching data for each", keys.len()));
        let mut docs = Vec::with_capacity(keys.len());
        for (i, key) in keys.iter().enumerate() {
            docs.push(self.order(key)?);
            console.detail(format!("{}: {}/{}", key, i + 1, keys.len()));
        }
        Ok(docs)
    }
}

/// Fetch the remote manifest and write it to the cache file unconditionally.
pub fn refresh_cache(cfg: &SyncConfig, console: Console) -> Result<Vec<Value>> {
    let cookie = load_cookie(&cfg.cookie_path)?;
    let storefront = Storefront::new(&cfg.storefront.base_url, cfg.transport.clone(), &cookie)?;
    let docs = storefront.fetch_all(console)?;
    cache::save(&cfg.cache_path, &docs)?;
    Ok(docs)
}

/// Raw order documents for a run: the cache when it exists, else the storefront
/// (cached afterwards when `write_cache` is set).
pub fn load_manifest(cfg: &SyncConfig, console: Console) -> Result<(Vec<Value>, ManifestSource)> {
    if cfg.cache_path.is_file() {
        console.status(format!(
            "{} file found, using offline data.",
            cfg.cache_path.display()
        ));
        let docs = cache::load(&cfg.cache_path)?;
        return Ok((docs, ManifestSource::Cache(cfg.cache_path.clone())));
    }

    let cookie = load_cookie(&cfg.cookie_path)?;
    let storefront = Storefront::new(&cfg.storefront.base_url, cfg.transport.clone(), &cookie)?;
    let docs = storefront.fetch_all(console)?;
    if cfg.write_cache {
        cache::save(&cfg.cache_path, &docs)?;
    }
    Ok((docs, ManifestSource::Remote))
}
