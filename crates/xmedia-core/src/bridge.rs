//! Cross-realm bridge: tagged, serializable messages between the interceptor
//! realm and the correlator realm, which share no memory.
//!
//! Delivery is best-effort with no acknowledgement or retry at this layer;
//! reliability is the correlator's job via its timeout-based re-querying.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::model::{CaptureRecord, ContentId};

/// Interceptor → correlator messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CaptureEvent {
    /// All records found in one passive or on-demand capture pass.
    Captured { records: Vec<CaptureRecord> },
    /// Answer to a by-id query; `data` is None when nothing was found.
    Response {
        id: ContentId,
        data: Option<CaptureRecord>,
    },
    /// Full dump of the capture store, answering a bulk query.
    AllRecords {
        records: HashMap<ContentId, CaptureRecord>,
    },
}

/// Correlator → interceptor messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CaptureQuery {
    /// Ask for one id; may trigger an on-demand fetch on the far side.
    ById { id: ContentId },
    /// Ask for everything currently known; never triggers network activity.
    All,
}

/// Interceptor-side end of the duplex channel.
pub struct InterceptorEnd {
    events: mpsc::UnboundedSender<CaptureEvent>,
    queries: mpsc::UnboundedReceiver<CaptureQuery>,
}

/// Correlator-side end of the duplex channel.
pub struct CorrelatorEnd {
    queries: mpsc::UnboundedSender<CaptureQuery>,
    events: mpsc::UnboundedReceiver<CaptureEvent>,
}

/// Creates the two connected ends of the bridge.
pub fn duplex() -> (InterceptorEnd, CorrelatorEnd) {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (query_tx, query_rx) = mpsc::unbounded_channel();
    (
        InterceptorEnd { events: event_tx, queries: query_rx },
        CorrelatorEnd { queries: query_tx, events: event_rx },
    )
}

impl InterceptorEnd {
    /// Best-effort publish; a departed peer only costs a debug line.
    pub fn publish(&self, event: CaptureEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("correlator end closed; event dropped");
        }
    }

    pub async fn recv_query(&mut self) -> Option<CaptureQuery> {
        self.queries.recv().await
    }
}

impl CorrelatorEnd {
    pub fn send_query(&self, query: CaptureQuery) {
        if self.queries.send(query).is_err() {
            tracing::debug!("interceptor end closed; query dropped");
        }
    }

    pub async fn recv_event(&mut self) -> Option<CaptureEvent> {
        self.events.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MediaVariant;

    fn record(id: &str) -> CaptureRecord {
        CaptureRecord {
            id: id.to_string(),
            variants: vec![MediaVariant {
                url: "https://video.example/v.mp4".to_string(),
                bitrate: 1,
                content_type: "video/mp4".to_string(),
            }],
            thumbnail: None,
            duration_ms: None,
            aspect_ratio: None,
        }
    }

    #[tokio::test]
    async fn delivers_in_both_directions() {
        let (mut interceptor, mut correlator) = duplex();
        correlator.send_query(CaptureQuery::ById { id: "42".to_string() });
        assert_eq!(
            interceptor.recv_query().await,
            Some(CaptureQuery::ById { id: "42".to_string() })
        );

        interceptor.publish(CaptureEvent::Captured { records: vec![record("42")] });
        match correlator.recv_event().await {
            Some(CaptureEvent::Captured { records }) => assert_eq!(records[0].id, "42"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn messages_are_tagged_for_the_wire() {
        let json = serde_json::to_string(&CaptureQuery::All).unwrap();
        assert!(json.contains(r#""type":"all""#));

        let json =
            serde_json::to_string(&CaptureEvent::Response { id: "1".to_string(), data: None })
                .unwrap();
        assert!(json.contains(r#""type":"response""#));
        assert!(json.contains(r#""data":null"#));

        let parsed: CaptureQuery =
            serde_json::from_str(r#"{"type":"by_id","id":"9"}"#).unwrap();
        assert_eq!(parsed, CaptureQuery::ById { id: "9".to_string() });
    }

    #[test]
    fn dropped_peer_is_tolerated() {
        let (interceptor, correlator) = duplex();
        drop(correlator);
        interceptor.publish(CaptureEvent::AllRecords { records: HashMap::new() });

        let (interceptor, correlator) = duplex();
        drop(interceptor);
        correlator.send_query(CaptureQuery::All);
    }
}
