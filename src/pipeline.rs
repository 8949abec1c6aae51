use crate::config::Config;
use crate::error::Result;
use crate::export::read_chat_export;
use crate::extractor::LinkExtractor;
use crate::lookup::TitleLookup;
use crate::reaction::EMOJI_REACTIONS;
use crate::recommendation::Recommendation;
use crate::store::{merge, RecommendationStore};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info};

/// What a single run should do
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Chat export to scan for new links
    pub export_path: Option<PathBuf>,
    /// Start from an empty set instead of the cache file
    pub ignore_cache: bool,
}

/// Counters reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cached: usize,
    pub parsed: usize,
    pub added: usize,
    pub resolved: usize,
    pub failed: usize,
    pub skipped: usize,
    pub total: usize,
}

/// Merge the cache with fresh messages, then enrich and persist
pub struct Pipeline {
    extractor: LinkExtractor,
    store: RecommendationStore,
    lookup: Option<Box<dyn TitleLookup>>,
}

impl Pipeline {
    pub fn new(config: &Config, lookup: Option<Box<dyn TitleLookup>>) -> Result<Self> {
        let extractor = LinkExtractor::new(config.extraction.policy(), EMOJI_REACTIONS)?;
        let store = RecommendationStore::new(
            config.cache.path.clone(),
            config.cache.checkpoint_interval,
        );

        Ok(Self {
            extractor,
            store,
            lookup,
        })
    }

    pub fn store(&self) -> &RecommendationStore {
        &self.store
    }

    /// Execute one run and return the final record list
    pub async fn run(&self, options: &RunOptions) -> Result<(Vec<Recommendation>, RunSummary)> {
        let mut summary = RunSummary::default();

        let cached = if options.ignore_cache {
            info!("⏭️ Ignoring cache at {}", self.store.path().display());
            Vec::new()
        } else {
            debug!("Reading in from cache at {}", self.store.path().display());
            self.store.load().await?
        };
        summary.cached = cached.len();
        let known: HashSet<String> = cached
            .iter()
            .filter_map(|record| record.key().map(str::to_string))
            .collect();

        let fresh = match &options.export_path {
            Some(path) => {
                info!("📄 Scanning chat export: {}", path.display());
                let export = read_chat_export(path).await?;
                self.extractor.parse_all(&export.messages)?
            }
            None => Vec::new(),
        };
        summary.parsed = fresh.len();

        let mut records = merge(cached, fresh);
        summary.total = records.len();
        summary.added = records
            .iter()
            .filter(|record| record.key().is_some_and(|key| !known.contains(key)))
            .count();
        info!(
            "📚 {} recommendations ({} new from {} parsed links)",
            summary.total, summary.added, summary.parsed
        );

        match self.lookup.as_deref() {
            Some(lookup) => {
                info!("🌐 Resolving titles with {}", lookup.name());
                let stats = self.store.enrich(&mut records, lookup).await?;
                summary.resolved = stats.resolved;
                summary.failed = stats.failed;
                summary.skipped = stats.skipped;
            }
            None => {
                info!("⏭️ Title lookup disabled");
                self.store.save(&records).await?;
            }
        }

        info!("💾 Saved {} recommendations to {}", records.len(), self.store.path().display());
        Ok((records, summary))
    }
}
