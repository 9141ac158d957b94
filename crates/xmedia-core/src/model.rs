//! Core data model: content ids, media variants, and capture records.

use serde::{Deserialize, Serialize};

/// Platform-assigned string identifying one content item.
pub type ContentId = String;

/// One playable rendition of a media item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaVariant {
    pub url: String,
    /// Bits per second; 0 means the upstream payload carried no bitrate.
    pub bitrate: u64,
    pub content_type: String,
}

/// Resolved media descriptor for one content id.
///
/// `variants` is non-empty and sorted non-increasing by bitrate, so
/// `variants[0]` is always the best-quality choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRecord {
    pub id: ContentId,
    pub variants: Vec<MediaVariant>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    /// Width/height ratio as reported by the platform, e.g. (16, 9).
    #[serde(default)]
    pub aspect_ratio: Option<(u64, u64)>,
}

impl CaptureRecord {
    /// Highest-bitrate accepted variant. Variants are kept sorted, so this is
    /// the first entry; when no bitrate was present anywhere, it is the first
    /// accepted variant encountered during the scan.
    pub fn best_variant(&self) -> Option<&MediaVariant> {
        self.variants.first()
    }

    /// Human-readable quality band for the best variant.
    pub fn quality_label(&self) -> &'static str {
        let bitrate = self.best_variant().map(|v| v.bitrate).unwrap_or(0);
        if bitrate >= 2_000_000 {
            "Video HD (1080p)"
        } else if bitrate >= 800_000 {
            "Video (720p)"
        } else if bitrate >= 300_000 {
            "Video (480p)"
        } else if bitrate > 0 {
            "Video (360p)"
        } else {
            "Video"
        }
    }

    /// Download filename suggested to consumers.
    pub fn suggested_filename(&self) -> String {
        format!("twitter_video_{}.mp4", self.id)
    }
}
