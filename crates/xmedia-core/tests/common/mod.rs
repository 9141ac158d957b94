//! Shared fixtures: canned platform payloads, a scriptable stub transport,
//! and a fixed token source.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use xmedia_core::intercept::{
    TokenSource, Transport, TransportError, TransportRequest, TransportResponse,
};

/// Timeline-shaped payload carrying one video tweet.
pub fn timeline_payload(id: &str, url: &str) -> String {
    format!(
        r#"{{
            "data": {{
                "home": {{
                    "home_timeline_urt": {{
                        "instructions": [{{
                            "type": "TimelineAddEntries",
                            "entries": [{{
                                "content": {{
                                    "itemContent": {{
                                        "tweet_results": {{
                                            "result": {{
                                                "rest_id": "{id}",
                                                "legacy": {{
                                                    "extended_entities": {{
                                                        "media": [{{
                                                            "media_url_https": "https://pbs.example/{id}.jpg",
                                                            "video_info": {{
                                                                "duration_millis": 12000,
                                                                "aspect_ratio": [16, 9],
                                                                "variants": [
                                                                    {{ "content_type": "application/x-mpegURL", "url": "https://video.example/{id}.m3u8" }},
                                                                    {{ "content_type": "video/mp4", "bitrate": 832000, "url": "{url}?tag=720" }},
                                                                    {{ "content_type": "video/mp4", "bitrate": 2176000, "url": "{url}" }}
                                                                ]
                                                            }}
                                                        }}]
                                                    }}
                                                }}
                                            }}
                                        }}
                                    }}
                                }}
                            }}]
                        }}]
                    }}
                }}
            }}
        }}"#
    )
}

/// TweetResultByRestId-shaped payload for one id.
pub fn tweet_detail_payload(id: &str, url: &str) -> String {
    format!(
        r#"{{
            "data": {{
                "tweetResult": {{
                    "result": {{
                        "rest_id": "{id}",
                        "legacy": {{
                            "extended_entities": {{
                                "media": [{{
                                    "video_info": {{
                                        "variants": [
                                            {{ "content_type": "video/mp4", "bitrate": 500000, "url": "{url}" }}
                                        ]
                                    }}
                                }}]
                            }}
                        }}
                    }}
                }}
            }}
        }}"#
    )
}

/// Transport stub keyed by URL substring; counts calls per key.
pub struct StubTransport {
    routes: Mutex<HashMap<&'static str, (u16, String)>>,
    pub calls: AtomicUsize,
}

impl StubTransport {
    pub fn new() -> Self {
        Self { routes: Mutex::new(HashMap::new()), calls: AtomicUsize::new(0) }
    }

    pub fn route(self, keyword: &'static str, status: u16, body: String) -> Self {
        self.routes.lock().unwrap().insert(keyword, (status, body));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Transport for StubTransport {
    fn fetch(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let routes = self.routes.lock().unwrap();
        for (keyword, (status, body)) in routes.iter() {
            if request.url.contains(keyword) {
                return Ok(TransportResponse {
                    status: *status,
                    body: body.clone().into_bytes(),
                });
            }
        }
        Ok(TransportResponse { status: 404, body: b"{}".to_vec() })
    }
}

pub struct StaticToken(pub Option<&'static str>);

impl TokenSource for StaticToken {
    fn csrf_token(&self) -> Option<String> {
        self.0.map(str::to_string)
    }
}
