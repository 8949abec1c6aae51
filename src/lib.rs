/// YouTube recommendation collector
///
/// Scans a chat export for shared YouTube links, keeps one record per video or
/// playlist, and resolves titles into a local JSON cache.

pub mod config;
pub mod error;
pub mod export;
pub mod extractor;
pub mod lookup;
pub mod pipeline;
pub mod reaction;
pub mod recommendation;
pub mod store;

// Re-export main types for easy access
pub use crate::config::{Config, LookupProvider};
pub use crate::error::{LookupError, RecsError, Result};
pub use crate::export::{ChatExport, RawMessage, RawReaction};
pub use crate::extractor::{ExtractionPolicy, LinkExtractor};
pub use crate::lookup::{create_lookup, TitleLookup};
pub use crate::pipeline::{Pipeline, RunOptions, RunSummary};
pub use crate::reaction::{Reaction, EMOJI_REACTIONS};
pub use crate::recommendation::{MediaId, Recommendation};
pub use crate::store::{merge, RecommendationStore};
