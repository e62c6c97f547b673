//! Blocking HTTP GET over libcurl (`curl` crate easy interface).
//!
//! Used for the storefront API (small JSON/HTML bodies kept in memory) and for
//! asset downloads (streamed to a writer with progress). Everything runs on the
//! calling thread; a stuck transfer is bounded only by the configured timeouts.

mod error;

pub use error::TransferError;

use std::io::Write;
use std::time::Duration;

use crate::config::TransportConfig;

/// Blocking GET client with fixed options and request headers.
#[derive(Debug, Clone)]
pub struct HttpClient {
    opts: TransportConfig,
    headers: Vec<(String, String)>,
}

impl HttpClient {
    pub fn new(opts: TransportConfig) -> Self {
        Self {
            opts,
            headers: Vec::new(),
        }
    }

    /// Adds a request header sent with every GET.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.trim().to_string(), value.trim().to_string()));
        self
    }

    fn easy(&self, url: &str) -> Result<curl::easy::Easy, curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        if !self.opts.user_agent.is_empty() {
            easy.useragent(&self.opts.user_agent)?;
        }
        easy.connect_timeout(Duration::from_secs(self.opts.connect_timeout_secs))?;
        // Abort if throughput stays below the limit for the window; keeps big
        // files on slow links alive while still failing truly stuck transfers.
        easy.low_speed_limit(self.opts.low_speed_limit_bytes)?;
        easy.low_speed_time(Duration::from_secs(self.opts.low_speed_time_secs))?;
        if self.opts.timeout_secs > 0 {
            easy.timeout(Duration::from_secs(self.opts.timeout_secs))?;
        }

        if !self.headers.is_empty() {
            let mut list = curl::easy::List::new();
            for (k, v) in &self.headers {
                list.append(&format!("{}: {}", k, v))?;
            }
            easy.http_headers(list)?;
        }
        Ok(easy)
    }

    /// GET `url` and return the whole body.
    pub fn get_bytes(&self, url: &str) -> Result<Vec<u8>, TransferError> {
        let mut body = Vec::new();
        self.get_streaming(url, &mut body, &mut |_: u64, _: Option<u64>| {})?;
        Ok(body)
    }

    /// GET `url`, writing the body to `sink` as it arrives.
    ///
    /// `progress` receives `(bytes_received, total_if_known)`. Returns the number
    /// of bytes written.
    pub fn get_streaming(
        &self,
        url: &str,
        sink: &mut dyn Write,
        progress: &mut dyn FnMut(u64, Option<u64>),
    ) -> Result<u64, TransferError> {
        let mut easy = self.easy(url)?;
        easy.progress(true)?;

        let mut written: u64 = 0;
        let mut storage_error: Option<std::io::Error> = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match sink.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    storage_error = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.progress_function(|dltotal, dlnow, _, _| {
                let total = (dltotal > 0.0).then_some(dltotal as u64);
                progress(dlnow as u64, total);
                true
            })?;
            transfer.perform()
        };

        if let Some(e) = storage_error {
            return Err(TransferError::Storage(e));
        }
        performed?;
        sink.flush().map_err(TransferError::Storage)?;

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(TransferError::Http(code));
        }

        let announced = easy.content_length_download()?;
        if announced >= 0.0 && announced as u64 != written {
            return Err(TransferError::PartialTransfer {
                expected: announced as u64,
                received: written,
            });
        }
        Ok(written)
    }
}
