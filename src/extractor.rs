/// Link extraction: turns one chat message into at most one recommendation
use crate::error::{RecsError, Result};
use crate::export::{fix_mojibake, RawMessage};
use crate::reaction::EmojiTable;
use crate::recommendation::{
    playlist_url, video_url, Recommendation, PLAYLIST_ID_LEN, VIDEO_ID_LEN,
};
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A message must contain one of these to be considered at all
pub const DOMAIN_MARKERS: [&str; 2] = ["youtube.com", "youtu.be"];

/// URL-encoded short link nested inside another link
pub const NESTED_LINK_MARKER: &str = "youtu.be%2F";

const VIDEO_PATTERN: &str =
    r"((https?://)?(www\.)?youtube\.com/(watch\?&?(\w+=\S+)*v=)?(?P<id>[\w-]{11})\S*)";
const SHORT_PATTERN: &str = r"((https?://)?(www\.)?youtu\.be/(?P<id>[\w-]{11})\S*)";
const PLAYLIST_PATTERN: &str =
    r"((https?://)?(www\.)?youtube\.com/(playlist\?(\w+=\S+)*list=)?(?P<playlist_id>[\w-]{34})\S*)";

/// Policy for messages the extractor cannot interpret unambiguously
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionPolicy {
    /// Drop messages with more than one link instead of taking the first
    pub skip_ambiguous: bool,
    /// Drop messages carrying a URL-encoded nested link
    pub skip_nested_links: bool,
}

impl ExtractionPolicy {
    pub const STRICT: Self = Self {
        skip_ambiguous: true,
        skip_nested_links: true,
    };
}

impl Default for ExtractionPolicy {
    fn default() -> Self {
        Self::STRICT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkKind {
    Video,
    Playlist,
}

struct LinkPattern {
    kind: LinkKind,
    regex: Regex,
    id_group: &'static str,
}

/// A single pattern hit inside a message
#[derive(Debug)]
struct LinkMatch<'t> {
    kind: LinkKind,
    full: &'t str,
    id: &'t str,
}

/// Parses chat messages into recommendations
pub struct LinkExtractor {
    patterns: Vec<LinkPattern>,
    policy: ExtractionPolicy,
    emoji: EmojiTable,
}

impl LinkExtractor {
    pub fn new(policy: ExtractionPolicy, emoji: EmojiTable) -> Result<Self> {
        let patterns = vec![
            LinkPattern {
                kind: LinkKind::Video,
                regex: Regex::new(VIDEO_PATTERN)?,
                id_group: "id",
            },
            LinkPattern {
                kind: LinkKind::Video,
                regex: Regex::new(SHORT_PATTERN)?,
                id_group: "id",
            },
            LinkPattern {
                kind: LinkKind::Playlist,
                regex: Regex::new(PLAYLIST_PATTERN)?,
                id_group: "playlist_id",
            },
        ];

        Ok(Self {
            patterns,
            policy,
            emoji,
        })
    }

    pub fn policy(&self) -> ExtractionPolicy {
        self.policy
    }

    /// Parse every message, keeping the ones that yield a recommendation
    pub fn parse_all(&self, messages: &[RawMessage]) -> Result<Vec<Recommendation>> {
        let mut recommendations = Vec::new();
        for message in messages {
            if let Some(recommendation) = self.parse(message)? {
                recommendations.push(recommendation);
            }
        }
        debug!(
            "Extracted {} recommendations from {} messages",
            recommendations.len(),
            messages.len()
        );
        Ok(recommendations)
    }

    /// Parse a single message.
    ///
    /// Returns `Ok(None)` for messages without exactly one recognizable link.
    /// An identifier of the wrong length is an error: it means a pattern is
    /// broken and the run must stop.
    pub fn parse(&self, message: &RawMessage) -> Result<Option<Recommendation>> {
        let Some(raw_content) = message.content.as_deref() else {
            return Ok(None);
        };
        let content = fix_mojibake(raw_content);

        if !DOMAIN_MARKERS.iter().any(|marker| content.contains(marker)) {
            return Ok(None);
        }

        if self.policy.skip_nested_links && content.contains(NESTED_LINK_MARKER) {
            debug!("Skipping message with nested link: {}", content);
            return Ok(None);
        }

        let matches = self.find_links(&content);
        let link = match matches.as_slice() {
            [] => {
                warn!("No youtube links found in message: {}", content);
                return Ok(None);
            }
            [single] => single,
            [first, ..] => {
                if self.policy.skip_ambiguous {
                    debug!("{} links in message, skipping: {}", matches.len(), content);
                    return Ok(None);
                }
                first
            }
        };

        let (url, video_id, playlist_id) = canonicalize(link)?;

        let mut recommendation = Recommendation {
            sender: message.sender_name.clone().unwrap_or_default(),
            timestamp: message.timestamp_ms.unwrap_or_default(),
            message: content.to_string(),
            original_url: link.full.to_string(),
            url,
            video_id,
            playlist_id,
            reactions: BTreeMap::new(),
            title: None,
        };

        for reaction_data in &message.reactions {
            let emoji = fix_mojibake(&reaction_data.reaction);
            match self.emoji.lookup(&emoji) {
                Some(reaction) => {
                    recommendation
                        .reactions
                        .insert(reaction_data.actor.clone(), reaction);
                }
                None => debug!("Ignoring reaction '{}' from {}", emoji, reaction_data.actor),
            }
        }

        Ok(Some(recommendation))
    }

    fn find_links<'t>(&self, content: &'t str) -> Vec<LinkMatch<'t>> {
        let mut matches = Vec::new();
        for pattern in &self.patterns {
            for captures in pattern.regex.captures_iter(content) {
                let (Some(full), Some(id)) = (captures.get(0), captures.name(pattern.id_group))
                else {
                    continue;
                };
                matches.push(LinkMatch {
                    kind: pattern.kind,
                    full: full.as_str(),
                    id: id.as_str(),
                });
            }
        }
        matches
    }
}

fn canonicalize(link: &LinkMatch<'_>) -> Result<(String, Option<String>, Option<String>)> {
    let (kind, expected) = match link.kind {
        LinkKind::Video => ("video", VIDEO_ID_LEN),
        LinkKind::Playlist => ("playlist", PLAYLIST_ID_LEN),
    };
    let actual = link.id.chars().count();
    if actual != expected {
        return Err(RecsError::MalformedIdentifier {
            kind,
            id: link.id.to_string(),
            expected,
            actual,
        });
    }

    let id = link.id.to_string();
    Ok(match link.kind {
        LinkKind::Video => (video_url(&id), Some(id), None),
        LinkKind::Playlist => (playlist_url(&id), None, Some(id)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::RawReaction;
    use crate::reaction::{Reaction, EMOJI_REACTIONS};

    const PLAYLIST_ID: &str = "PLx0sYbCqOb8TBPRdmBHs5Iftvv9TPboYG";

    fn extractor() -> LinkExtractor {
        LinkExtractor::new(ExtractionPolicy::STRICT, EMOJI_REACTIONS).unwrap()
    }

    fn message(content: &str) -> RawMessage {
        RawMessage {
            sender_name: Some("Alice".to_string()),
            timestamp_ms: Some(1_000),
            content: Some(content.to_string()),
            reactions: Vec::new(),
        }
    }

    fn mangle(text: &str) -> String {
        text.bytes().map(char::from).collect()
    }

    #[test]
    fn test_short_link() {
        let rec = extractor()
            .parse(&message("check this out https://youtu.be/dQw4w9WgXcQ"))
            .unwrap()
            .unwrap();
        assert_eq!(rec.video_id.as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(rec.playlist_id, None);
        assert_eq!(rec.url, "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(rec.original_url, "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(rec.sender, "Alice");
        assert_eq!(rec.timestamp, 1_000);
        assert!(rec.title.is_none());
    }

    #[test]
    fn test_watch_link_with_extra_params() {
        let rec = extractor()
            .parse(&message(
                "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42 lol",
            ))
            .unwrap()
            .unwrap();
        assert_eq!(rec.video_id.as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(
            rec.original_url,
            "https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=42"
        );
        assert_eq!(rec.url, "https://youtu.be/dQw4w9WgXcQ");
    }

    #[test]
    fn test_watch_link_inside_playlist_is_a_video() {
        let content = format!("youtube.com/watch?v=dQw4w9WgXcQ&list={}", PLAYLIST_ID);
        let rec = extractor().parse(&message(&content)).unwrap().unwrap();
        assert_eq!(rec.video_id.as_deref(), Some("dQw4w9WgXcQ"));
        assert!(rec.playlist_id.is_none());
    }

    #[test]
    fn test_playlist_link() {
        let content = format!("all of it: https://www.youtube.com/playlist?list={}", PLAYLIST_ID);
        let rec = extractor().parse(&message(&content)).unwrap().unwrap();
        assert_eq!(rec.video_id, None);
        assert_eq!(rec.playlist_id.as_deref(), Some(PLAYLIST_ID));
        assert_eq!(rec.playlist_id.as_ref().unwrap().len(), PLAYLIST_ID_LEN);
        assert_eq!(
            rec.url,
            format!("https://www.youtube.com/playlist?list={}", PLAYLIST_ID)
        );
    }

    #[test]
    fn test_two_links_rejected() {
        let result = extractor()
            .parse(&message(
                "https://youtu.be/dQw4w9WgXcQ and https://youtu.be/9bZkp7q19f0",
            ))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_lenient_policy_takes_first_link() {
        let policy = ExtractionPolicy {
            skip_ambiguous: false,
            ..ExtractionPolicy::STRICT
        };
        let extractor = LinkExtractor::new(policy, EMOJI_REACTIONS).unwrap();
        let rec = extractor
            .parse(&message(
                "https://youtu.be/dQw4w9WgXcQ and https://youtu.be/9bZkp7q19f0",
            ))
            .unwrap()
            .unwrap();
        assert_eq!(rec.video_id.as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_no_domain_rejected() {
        assert!(extractor().parse(&message("see vimeo.com/12345")).unwrap().is_none());
    }

    #[test]
    fn test_domain_without_link_rejected() {
        assert!(extractor()
            .parse(&message("youtube.com is down again"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_missing_content_rejected() {
        let msg = RawMessage {
            content: None,
            ..message("")
        };
        assert!(extractor().parse(&msg).unwrap().is_none());
    }

    #[test]
    fn test_nested_link_policy() {
        let content =
            "https://l.facebook.com/l.php?u=https%3A%2F%2Fyoutu.be%2FdQw4w9WgXcQ https://youtu.be/dQw4w9WgXcQ";
        assert!(extractor().parse(&message(content)).unwrap().is_none());

        let policy = ExtractionPolicy {
            skip_nested_links: false,
            ..ExtractionPolicy::STRICT
        };
        let lenient = LinkExtractor::new(policy, EMOJI_REACTIONS).unwrap();
        let rec = lenient.parse(&message(content)).unwrap().unwrap();
        assert_eq!(rec.video_id.as_deref(), Some("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_encoded_watch_redirect_does_not_block_plain_link() {
        let content = "https://youtu.be/dQw4w9WgXcQ via https://l.facebook.com/l.php?u=https%3A%2F%2Fwww.youtube.com%2Fwatch%3Fv%3D9bZkp7q19f0";
        let rec = extractor().parse(&message(content)).unwrap().unwrap();
        assert_eq!(rec.video_id.as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(rec.original_url, "https://youtu.be/dQw4w9WgXcQ");
    }

    #[test]
    fn test_content_is_decoded() {
        let content = mangle("😂 https://youtu.be/dQw4w9WgXcQ");
        let rec = extractor().parse(&message(&content)).unwrap().unwrap();
        assert_eq!(rec.message, "😂 https://youtu.be/dQw4w9WgXcQ");
    }

    #[test]
    fn test_reactions_mapped() {
        let mut msg = message("https://youtu.be/dQw4w9WgXcQ");
        msg.reactions = vec![
            RawReaction {
                actor: "Bob".to_string(),
                reaction: mangle("❤"),
            },
            RawReaction {
                actor: "Carol".to_string(),
                reaction: mangle("👍"),
            },
            RawReaction {
                actor: "Dave".to_string(),
                reaction: mangle("😮"),
            },
        ];

        let rec = extractor().parse(&msg).unwrap().unwrap();
        assert_eq!(rec.reactions.get("Bob"), Some(&Reaction::Heart));
        assert_eq!(rec.reactions.get("Bob").map(|r| r.score()), Some(2));
        assert_eq!(rec.reactions.get("Carol"), Some(&Reaction::UpThumb));
        assert!(!rec.reactions.contains_key("Dave"));
        assert_eq!(rec.reactions.len(), 2);
    }

    #[test]
    fn test_wrong_length_identifier_is_fatal() {
        let link = LinkMatch {
            kind: LinkKind::Playlist,
            full: "youtube.com/playlist?list=short",
            id: "short",
        };
        let err = canonicalize(&link).unwrap_err();
        assert!(matches!(
            err,
            RecsError::MalformedIdentifier {
                expected: PLAYLIST_ID_LEN,
                actual: 5,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_all_keeps_only_hits() {
        let messages = vec![
            message("https://youtu.be/dQw4w9WgXcQ"),
            message("nothing here"),
            message("https://youtu.be/9bZkp7q19f0"),
        ];
        let recs = extractor().parse_all(&messages).unwrap();
        assert_eq!(recs.len(), 2);
    }
}
