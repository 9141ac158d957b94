//! Deep media scanner: depth-bounded search of decoded API payloads for
//! content items that carry playable video variants.
//!
//! The scan is a total function: malformed or absent substructures are
//! skipped, never propagated, so one bad branch cannot abort a pass.

use serde_json::{Map, Value};

use crate::model::{CaptureRecord, MediaVariant};

/// Recursion bound for payload traversal. Timeline payloads nest deeply but
/// well below this; anything deeper is malformed and not worth following.
pub const DEFAULT_MAX_DEPTH: usize = 25;

/// Field names whose string value identifies a content item.
const ID_FIELDS: &[&str] = &["rest_id", "id_str"];

/// Relative paths (from an id-bearing node) that may hold a media array.
const MEDIA_PATHS: &[&[&str]] = &[
    &["legacy", "extended_entities", "media"],
    &["legacy", "entities", "media"],
    &["extended_entities", "media"],
    &["entities", "media"],
];

const ACCEPTED_CONTENT_TYPE: &str = "video/mp4";

/// Scans a decoded payload for capture records, depth-first, bounded by
/// `max_depth`. Within one pass only the first record found per id is kept.
/// Not required to be exhaustive; never fails.
pub fn scan(value: &Value, max_depth: usize) -> Vec<CaptureRecord> {
    let mut records = Vec::new();
    walk(value, 0, max_depth, &mut records);
    records
}

fn walk(value: &Value, depth: usize, max_depth: usize, records: &mut Vec<CaptureRecord>) {
    if depth > max_depth {
        return;
    }
    match value {
        Value::Object(map) => {
            if let Some(id) = node_id(map) {
                if !records.iter().any(|r| r.id == id) {
                    if let Some(record) = extract_record(map, id) {
                        records.push(record);
                    }
                }
            }
            for child in map.values() {
                walk(child, depth + 1, max_depth, records);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, depth + 1, max_depth, records);
            }
        }
        _ => {}
    }
}

/// Content id of a node, if it carries one of the known id fields.
fn node_id(map: &Map<String, Value>) -> Option<&str> {
    ID_FIELDS
        .iter()
        .find_map(|field| map.get(*field).and_then(Value::as_str))
}

/// Probes the known media paths under an id-bearing node and assembles a
/// record from the first media element with accepted variants.
fn extract_record(map: &Map<String, Value>, id: &str) -> Option<CaptureRecord> {
    for path in MEDIA_PATHS {
        let Some(media) = lookup_path(map, path).and_then(Value::as_array) else {
            continue;
        };
        for item in media {
            let Some(video_info) = item.get("video_info") else {
                continue;
            };
            let Some(raw) = video_info.get("variants").and_then(Value::as_array) else {
                continue;
            };
            let mut variants: Vec<MediaVariant> =
                raw.iter().filter_map(parse_variant).collect();
            if variants.is_empty() {
                continue;
            }
            variants.sort_by(|a, b| b.bitrate.cmp(&a.bitrate));
            return Some(CaptureRecord {
                id: id.to_string(),
                variants,
                thumbnail: item
                    .get("media_url_https")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                duration_ms: video_info.get("duration_millis").and_then(Value::as_u64),
                aspect_ratio: parse_aspect_ratio(video_info.get("aspect_ratio")),
            });
        }
    }
    None
}

fn lookup_path<'a>(map: &'a Map<String, Value>, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut current = map.get(*first)?;
    for key in rest {
        current = current.get(key)?;
    }
    Some(current)
}

fn parse_variant(value: &Value) -> Option<MediaVariant> {
    if value.get("content_type").and_then(Value::as_str) != Some(ACCEPTED_CONTENT_TYPE) {
        return None;
    }
    Some(MediaVariant {
        url: value.get("url").and_then(Value::as_str)?.to_string(),
        bitrate: value.get("bitrate").and_then(Value::as_u64).unwrap_or(0),
        content_type: ACCEPTED_CONTENT_TYPE.to_string(),
    })
}

fn parse_aspect_ratio(value: Option<&Value>) -> Option<(u64, u64)> {
    match value?.as_array()?.as_slice() {
        [w, h] => Some((w.as_u64()?, h.as_u64()?)),
        _ => None,
    }
}
