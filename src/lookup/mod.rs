/// Title lookup backends
///
/// Enrichment only needs one operation from the video platform: turn a
/// canonical link into a title. Each backend reports failures as one of the
/// two `LookupError` kinds so the store can log and move on.

pub mod oembed;
pub mod page;
pub mod ytdlp;

use crate::config::{LookupConfig, LookupProvider};
use crate::error::{LookupError, Result};
use async_trait::async_trait;

pub use oembed::OEmbedLookup;
pub use page::PageTitleLookup;
pub use ytdlp::YtDlpLookup;

/// Resolves the title of a video or playlist
#[async_trait]
pub trait TitleLookup: Send + Sync {
    async fn fetch_title(&self, url: &str) -> std::result::Result<String, LookupError>;
    fn name(&self) -> &'static str;
}

/// Create a title lookup based on configuration
pub fn create_lookup(config: &LookupConfig) -> Result<Box<dyn TitleLookup>> {
    match config.provider {
        LookupProvider::OEmbed => Ok(Box::new(OEmbedLookup::new(config)?)),
        LookupProvider::YtDlp => Ok(Box::new(YtDlpLookup::new(config))),
        LookupProvider::Page => Ok(Box::new(PageTitleLookup::new(config)?)),
    }
}

/// Classify an HTTP status the way the platform's failures are reported
pub(crate) fn classify_status(status: reqwest::StatusCode, url: &str) -> LookupError {
    if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        LookupError::Download(format!("HTTP {} for {}", status, url))
    } else {
        LookupError::Extraction(format!("HTTP {} for {}", status, url))
    }
}
