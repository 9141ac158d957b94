//! Interception layer: observes the host realm's outbound traffic, owns the
//! authoritative capture store, and answers bridge queries, falling back to
//! an on-demand fetch for ids it has never seen.

pub mod allowlist;
pub mod observe;
pub mod ondemand;
pub mod store;
pub mod transport;

pub use observe::{Observation, ObservedTransport};
pub use ondemand::{CookieTokenSource, OnDemandFetcher, TokenSource};
pub use store::CaptureStore;
pub use transport::{CurlTransport, Transport, TransportError, TransportRequest, TransportResponse};

use serde_json::Value;
use tokio::sync::mpsc;

use crate::bridge::{CaptureEvent, CaptureQuery, InterceptorEnd};
use crate::error::CaptureError;
use crate::model::ContentId;
use crate::scanner;

/// Completed on-demand round trip, routed back onto the interceptor loop so
/// store mutation stays on the owning task.
struct FetchOutcome {
    id: ContentId,
    result: Result<Value, CaptureError>,
}

/// Event loop of the interceptor realm.
///
/// Drains observation taps (decode → scan → store → publish `captured`) and
/// answers bridge queries from the store, from an on-demand fetch, or with a
/// full dump. Single task, so the store needs no locking.
pub struct Interceptor<T> {
    store: CaptureStore,
    bridge: InterceptorEnd,
    observations: mpsc::UnboundedReceiver<Observation>,
    fetcher: OnDemandFetcher<T>,
    fetches: mpsc::UnboundedReceiver<FetchOutcome>,
    fetch_tx: mpsc::UnboundedSender<FetchOutcome>,
    max_scan_depth: usize,
}

impl<T: Transport + 'static> Interceptor<T> {
    /// Builds the interceptor and the tap sender to hand to one or more
    /// `ObservedTransport` wrappers.
    pub fn new(
        bridge: InterceptorEnd,
        fetcher: OnDemandFetcher<T>,
        max_scan_depth: usize,
    ) -> (Self, mpsc::UnboundedSender<Observation>) {
        let (tap_tx, tap_rx) = mpsc::unbounded_channel();
        let (fetch_tx, fetch_rx) = mpsc::unbounded_channel();
        let interceptor = Self {
            store: CaptureStore::new(),
            bridge,
            observations: tap_rx,
            fetcher,
            fetches: fetch_rx,
            fetch_tx,
            max_scan_depth,
        };
        (interceptor, tap_tx)
    }

    /// Runs until every input channel is closed.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(observation) = self.observations.recv() => self.capture(observation),
                Some(outcome) = self.fetches.recv() => self.finish_fetch(outcome),
                query = self.bridge.recv_query() => match query {
                    Some(query) => self.answer(query),
                    None => break,
                },
            }
        }
        tracing::debug!("interceptor loop stopped");
    }

    /// Passive capture: decode an observed body, scan it, store every record
    /// and publish them. Runs after the original response was already
    /// returned to its caller, so capture is never on the critical path.
    fn capture(&mut self, observation: Observation) {
        let value: Value = match serde_json::from_slice(&observation.body) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(url = %observation.url, "{}", CaptureError::Decode(err));
                return;
            }
        };
        self.absorb(&value);
    }

    /// Scan → store → publish path shared by passive and on-demand capture.
    fn absorb(&mut self, value: &Value) {
        let records = scanner::scan(value, self.max_scan_depth);
        if records.is_empty() {
            return;
        }
        tracing::debug!(count = records.len(), "captured media records");
        for record in &records {
            self.store.insert(record.clone());
        }
        self.bridge.publish(CaptureEvent::Captured { records });
    }

    fn answer(&mut self, query: CaptureQuery) {
        match query {
            CaptureQuery::ById { id } => {
                if let Some(record) = self.store.get(&id) {
                    let data = Some(record.clone());
                    self.bridge.publish(CaptureEvent::Response { id, data });
                } else {
                    self.spawn_fetch(id);
                }
            }
            CaptureQuery::All => {
                self.bridge.publish(CaptureEvent::AllRecords {
                    records: self.store.snapshot(),
                });
            }
        }
    }

    /// Starts the on-demand round trip without suspending the loop, so
    /// unrelated observations and queries keep interleaving while it runs.
    fn spawn_fetch(&self, id: ContentId) {
        let fetcher = self.fetcher.clone();
        let outcome_tx = self.fetch_tx.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch(&id).await;
            let _ = outcome_tx.send(FetchOutcome { id, result });
        });
    }

    fn finish_fetch(&mut self, outcome: FetchOutcome) {
        let FetchOutcome { id, result } = outcome;
        match result {
            Ok(value) => self.absorb(&value),
            Err(err @ CaptureError::UpstreamRejection(_)) => {
                tracing::warn!(id = %id, "{}", err);
            }
            Err(err) => {
                tracing::debug!(id = %id, "{}", err);
            }
        }
        let data = self.store.get(&id).cloned();
        self.bridge.publish(CaptureEvent::Response { id, data });
    }
}
