//! Failure of one blocking transfer.

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("{0}")]
    Curl(#[from] curl::Error),

    /// Non-2xx final status (after redirects).
    #[error("HTTP {0}")]
    Http(u32),

    /// Body shorter or longer than the announced `Content-Length`.
    #[error("partial transfer: expected {expected} bytes, got {received}")]
    PartialTransfer { expected: u64, received: u64 },

    /// Local sink failed (scratch file, disk full).
    #[error("storage: {0}")]
    Storage(#[source] std::io::Error),
}

impl TransferError {
    /// Whether a later pass could plausibly succeed: network trouble, throttling
    /// and server-side errors. Client errors and local storage failures are not.
    pub fn is_transient(&self) -> bool {
        match self {
            TransferError::Curl(e) => {
                e.is_operation_timedout()
                    || e.is_couldnt_connect()
                    || e.is_couldnt_resolve_host()
                    || e.is_recv_error()
                    || e.is_send_error()
                    || e.is_got_nothing()
                    || e.is_partial_file()
            }
            TransferError::Http(code) => *code == 408 || *code == 429 || (500..600).contains(code),
            TransferError::PartialTransfer { .. } => true,
            TransferError::Storage(_) => false,
        }
    }
}
