//! Transport seam for outbound HTTP.
//!
//! The interceptor and the on-demand fetcher only depend on the `Transport`
//! trait; production code composes `CurlTransport` (libcurl), tests compose
//! stubs. Calls are blocking; async code invokes them via `spawn_blocking`.

use std::collections::HashMap;
use std::fmt;
use std::str;
use std::time::Duration;

/// Outbound request as seen by a transport.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: String,
    pub url: String,
    pub headers: HashMap<String, String>,
}

impl TransportRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            headers: HashMap::new(),
        }
    }
}

/// Raw response: status plus undecoded body bytes.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport-level failure (before any HTTP status is available).
#[derive(Debug)]
pub enum TransportError {
    /// libcurl reported an error (timeout, DNS, TLS, ...).
    Curl(curl::Error),
    /// Connection-level failure reported by a non-curl transport.
    Connection(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Curl(e) => write!(f, "{}", e),
            TransportError::Connection(msg) => write!(f, "connection failed: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Curl(e) => Some(e),
            TransportError::Connection(_) => None,
        }
    }
}

impl From<curl::Error> for TransportError {
    fn from(err: curl::Error) -> Self {
        TransportError::Curl(err)
    }
}

/// Minimal outbound HTTP interface the capture subsystem depends on.
pub trait Transport: Send + Sync {
    fn fetch(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn fetch(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        (**self).fetch(request)
    }
}

/// Production transport backed by libcurl, mirroring the browser client:
/// follows redirects, bounded connect/read timeouts.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(30),
        }
    }
}

impl Transport for CurlTransport {
    fn fetch(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(&request.url)?;
        if request.method == "GET" {
            easy.get(true)?;
        } else {
            easy.custom_request(&request.method)?;
        }
        easy.follow_location(true)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;

        if !request.headers.is_empty() {
            let mut list = curl::easy::List::new();
            for (name, value) in &request.headers {
                list.append(&format!("{}: {}", name.trim(), value.trim()))?;
            }
            easy.http_headers(list)?;
        }

        let mut body = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()? as u16;
        Ok(TransportResponse { status, body })
    }
}
