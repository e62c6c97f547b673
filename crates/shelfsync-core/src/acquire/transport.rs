//! Byte transport used by the acquirer. Production code fetches over libcurl;
//! tests substitute an in-memory implementation.

use std::io::Write;

use crate::config::TransportConfig;
use crate::http::{HttpClient, TransferError};

/// Streams the body of `url` into `sink`, reporting `(received, total)` to
/// `progress`. Returns the byte count written.
pub trait Transport {
    fn fetch(
        &self,
        url: &str,
        sink: &mut dyn Write,
        progress: &mut dyn FnMut(u64, Option<u64>),
    ) -> Result<u64, TransferError>;
}

/// [`Transport`] over the blocking curl client.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    client: HttpClient,
}

impl CurlTransport {
    pub fn new(opts: TransportConfig) -> Self {
        Self {
            client: HttpClient::new(opts),
        }
    }

    pub fn from_client(client: HttpClient) -> Self {
        Self { client }
    }
}

impl Transport for CurlTransport {
    fn fetch(
        &self,
        url: &str,
        sink: &mut dyn Write,
        progress: &mut dyn FnMut(u64, Option<u64>),
    ) -> Result<u64, TransferError> {
        self.client.get_streaming(url, sink, progress)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn fetch(
        &self,
        url: &str,
        sink: &mut dyn Write,
        progress: &mut dyn FnMut(u64, Option<u64>),
    ) -> Result<u64, TransferError> {
        (**self).fetch(url, sink, progress)
    }
}
