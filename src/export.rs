/// Chat export input: the raw message records and their text decoding
use crate::error::Result;
use serde::Deserialize;
use std::borrow::Cow;
use std::path::Path;
use tracing::debug;

/// Top-level chat export document
#[derive(Debug, Clone, Deserialize)]
pub struct ChatExport {
    pub messages: Vec<RawMessage>,
}

/// One message as it appears in the export
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMessage {
    pub sender_name: Option<String>,
    pub timestamp_ms: Option<i64>,
    pub content: Option<String>,
    #[serde(default)]
    pub reactions: Vec<RawReaction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawReaction {
    pub actor: String,
    /// Emoji glyph, still mis-encoded
    pub reaction: String,
}

/// Read and parse a chat export file
pub async fn read_chat_export(path: &Path) -> Result<ChatExport> {
    let content = tokio::fs::read_to_string(path).await?;
    let export: ChatExport = serde_json::from_str(&content)?;
    debug!("Read {} messages from {}", export.messages.len(), path.display());
    Ok(export)
}

/// Undo the export's encoding damage.
///
/// Exports store UTF-8 bytes as if each byte were a Latin-1 character. Every
/// char is mapped back to its byte and the bytes are decoded as UTF-8. Text
/// that cannot have been produced that way is returned unchanged.
pub fn fix_mojibake(text: &str) -> Cow<'_, str> {
    let mut bytes = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match u8::try_from(u32::from(ch)) {
            Ok(byte) => bytes.push(byte),
            Err(_) => return Cow::Borrowed(text),
        }
    }

    match String::from_utf8(bytes) {
        Ok(decoded) if decoded == text => Cow::Borrowed(text),
        Ok(decoded) => Cow::Owned(decoded),
        Err(_) => Cow::Borrowed(text),
    }
}
