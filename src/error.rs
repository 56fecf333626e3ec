use std::time::Duration;
use thiserror::Error;

/// Broad failure categories surfaced to callers of the fetch and lookup
/// operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied an address, URL or name that cannot be used.
    InvalidInput,
    /// DNS, connect, TLS, HTTP or timeout failure, including non-2xx statuses.
    Transport,
    /// The body could not be decompressed or decoded.
    Decode,
    /// The body decoded but did not have the expected shape.
    MalformedResponse,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid server name: {0}")]
    InvalidServerName(String),

    #[error("DNS lookup failed: {0}")]
    Dns(String),

    #[error("TCP connection failed: {0}")]
    Connect(#[source] std::io::Error),

    #[error("TLS handshake failed: {0}")]
    Tls(#[source] std::io::Error),

    #[error("TLS configuration failed: {0}")]
    TlsConfig(#[from] rustls::Error),

    #[error("HTTP exchange failed: {0}")]
    Http(#[from] hyper::Error),

    #[error("Failed to build request: {0}")]
    Request(String),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Too many redirects")]
    TooManyRedirects,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidAddress(_) | Error::InvalidUrl(_) | Error::InvalidServerName(_) => {
                ErrorKind::InvalidInput
            }
            Error::Decode(_) => ErrorKind::Decode,
            Error::MalformedResponse(_) => ErrorKind::MalformedResponse,
            _ => ErrorKind::Transport,
        }
    }

    /// Stable machine-readable code for logs and reports.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidAddress(_) => "INVALID_ADDRESS",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::InvalidServerName(_) => "INVALID_SERVER_NAME",
            Error::Dns(_) => "DNS_ERROR",
            Error::Connect(_) => "CONNECTION_FAILED",
            Error::Tls(_) | Error::TlsConfig(_) => "TLS_ERROR",
            Error::Http(_) => "HTTP_ERROR",
            Error::Request(_) => "REQUEST_BUILD_ERROR",
            Error::Status(_) => "HTTP_STATUS",
            Error::TooManyRedirects => "TOO_MANY_REDIRECTS",
            Error::Timeout(_) => "TIMEOUT",
            Error::Decode(_) => "DECODE_ERROR",
            Error::MalformedResponse(_) => "MALFORMED_RESPONSE",
        }
    }
}
