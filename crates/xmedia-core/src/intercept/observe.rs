//! Observed transport: a pure-observer decorator around a `Transport`.
//!
//! Composed once at startup in front of the host realm's transport. Every
//! call's result is returned unchanged; matching successful responses are
//! additionally copied onto a tap channel for the interceptor to decode off
//! the caller's path. The wrap is never a gate.

use tokio::sync::mpsc;

use super::allowlist;
use super::transport::{Transport, TransportError, TransportRequest, TransportResponse};

/// One observed exchange: the request URL and the raw response body.
/// Decoding happens on the interceptor task, not here.
#[derive(Debug, Clone)]
pub struct Observation {
    pub url: String,
    pub body: Vec<u8>,
}

/// Decorator that forwards to `inner` and taps allowlisted 2xx responses.
pub struct ObservedTransport<T> {
    inner: T,
    tap: mpsc::UnboundedSender<Observation>,
}

impl<T> ObservedTransport<T> {
    pub fn new(inner: T, tap: mpsc::UnboundedSender<Observation>) -> Self {
        Self { inner, tap }
    }
}

impl<T: Transport> Transport for ObservedTransport<T> {
    fn fetch(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        let response = self.inner.fetch(request)?;
        if allowlist::should_intercept(&request.url) && response.is_success() {
            // A closed tap (interceptor gone) must not affect the caller.
            let _ = self.tap.send(Observation {
                url: request.url.clone(),
                body: response.body.clone(),
            });
        }
        Ok(response)
    }
}
