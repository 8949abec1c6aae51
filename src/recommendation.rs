use crate::reaction::Reaction;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const VIDEO_ID_LEN: usize = 11;
pub const PLAYLIST_ID_LEN: usize = 34;

/// One video or playlist shared in the chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Author of the message
    pub sender: String,
    /// Milliseconds since epoch, the only sort key
    pub timestamp: i64,
    /// Decoded message text
    pub message: String,

    /// Link exactly as it appeared in the message
    pub original_url: String,
    /// Canonical link used for lookups
    pub url: String,
    /// Exactly one of `video_id` and `playlist_id` is set
    pub video_id: Option<String>,
    pub playlist_id: Option<String>,

    #[serde(default)]
    pub reactions: BTreeMap<String, Reaction>,
    /// Resolved lazily by enrichment
    #[serde(default)]
    pub title: Option<String>,
}

/// Deduplication key of a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaId<'a> {
    Video(&'a str),
    Playlist(&'a str),
}

impl<'a> MediaId<'a> {
    pub fn as_str(&self) -> &'a str {
        match *self {
            MediaId::Video(id) | MediaId::Playlist(id) => id,
        }
    }
}

impl Recommendation {
    /// The video or playlist id, `None` when the XOR invariant is broken
    pub fn media_id(&self) -> Option<MediaId<'_>> {
        match (&self.video_id, &self.playlist_id) {
            (Some(video), None) => Some(MediaId::Video(video)),
            (None, Some(playlist)) => Some(MediaId::Playlist(playlist)),
            _ => None,
        }
    }

    /// Identifier used for deduplication
    pub fn key(&self) -> Option<&str> {
        self.media_id().map(|id| id.as_str())
    }

    pub fn is_resolved(&self) -> bool {
        self.title.is_some()
    }

    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

/// Canonical short link for a video
pub fn video_url(video_id: &str) -> String {
    format!("https://youtu.be/{}", video_id)
}

/// Canonical link for a playlist
pub fn playlist_url(playlist_id: &str) -> String {
    format!("https://www.youtube.com/playlist?list={}", playlist_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Recommendation {
        Recommendation {
            sender: "Alice".to_string(),
            timestamp: 1_600_000_000_000,
            message: "check this out https://youtu.be/dQw4w9WgXcQ".to_string(),
            original_url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
            url: video_url("dQw4w9WgXcQ"),
            video_id: Some("dQw4w9WgXcQ".to_string()),
            playlist_id: None,
            reactions: BTreeMap::new(),
            title: None,
        }
    }

    #[test]
    fn test_media_id_xor() {
        let mut rec = sample();
        assert_eq!(rec.media_id(), Some(MediaId::Video("dQw4w9WgXcQ")));
        assert_eq!(rec.key(), Some("dQw4w9WgXcQ"));

        rec.playlist_id = Some("PLx0sYbCqOb8TBPRdmBHs5Iftvv9TPboYG".to_string());
        assert_eq!(rec.media_id(), None);

        rec.video_id = None;
        assert!(matches!(rec.media_id(), Some(MediaId::Playlist(_))));
    }

    #[test]
    fn test_missing_title_and_reactions_default() {
        let json = r#"{
            "sender": "Bob",
            "timestamp": 5,
            "message": "m",
            "original_url": "youtu.be/dQw4w9WgXcQ",
            "url": "https://youtu.be/dQw4w9WgXcQ",
            "video_id": "dQw4w9WgXcQ",
            "playlist_id": null
        }"#;
        let rec: Recommendation = serde_json::from_str(json).unwrap();
        assert!(rec.reactions.is_empty());
        assert!(!rec.is_resolved());
    }

    #[test]
    fn test_sent_at() {
        let rec = sample();
        assert_eq!(rec.sent_at().unwrap().timestamp(), 1_600_000_000);
    }

    #[test]
    fn test_canonical_urls() {
        assert_eq!(video_url("dQw4w9WgXcQ"), "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(
            playlist_url("PLx0sYbCqOb8TBPRdmBHs5Iftvv9TPboYG"),
            "https://www.youtube.com/playlist?list=PLx0sYbCqOb8TBPRdmBHs5Iftvv9TPboYG"
        );
    }
}
