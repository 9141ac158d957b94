//! Capture failure taxonomy.
//!
//! Every member is absorbed inside the subsystem and normalized to the single
//! externally visible outcome "not found"; nothing here crosses the consumer
//! boundary as a hard failure.

use std::fmt;

use crate::intercept::transport::TransportError;

/// Reasons a capture attempt or on-demand lookup produced no record.
#[derive(Debug)]
pub enum CaptureError {
    /// Response body was not parseable as JSON; the capture attempt is
    /// skipped, the original response is unaffected.
    Decode(serde_json::Error),
    /// Transport-level failure of the on-demand round trip.
    Network(TransportError),
    /// Non-success status from the on-demand query endpoint.
    UpstreamRejection(u16),
    /// Anti-forgery token unavailable; no network attempt is made.
    MissingCredential,
    /// No resolution arrived within the lookup wait window.
    Timeout,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Decode(e) => write!(f, "response body is not valid JSON: {}", e),
            CaptureError::Network(e) => write!(f, "on-demand transport failed: {}", e),
            CaptureError::UpstreamRejection(status) => {
                write!(f, "query endpoint returned HTTP {}", status)
            }
            CaptureError::MissingCredential => write!(f, "anti-forgery token unavailable"),
            CaptureError::Timeout => write!(f, "no resolution before the wait window elapsed"),
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureError::Decode(e) => Some(e),
            CaptureError::Network(e) => Some(e),
            CaptureError::UpstreamRejection(_)
            | CaptureError::MissingCredential
            | CaptureError::Timeout => None,
        }
    }
}

impl From<TransportError> for CaptureError {
    fn from(err: TransportError) -> Self {
        CaptureError::Network(err)
    }
}

impl From<serde_json::Error> for CaptureError {
    fn from(err: serde_json::Error) -> Self {
        CaptureError::Decode(err)
    }
}
