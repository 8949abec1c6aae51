/// Recommendation store: the on-disk cache, merging and title enrichment
use crate::error::{RecsError, Result};
use crate::lookup::TitleLookup;
use crate::recommendation::Recommendation;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Counters from one enrichment pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichStats {
    /// Lookups attempted
    pub looked_up: usize,
    pub resolved: usize,
    pub failed: usize,
    /// Records that already had a title
    pub skipped: usize,
    /// Checkpoint saves that failed; the lookups went on regardless
    pub failed_checkpoints: usize,
}

/// Owns the cache file and the checkpoint cadence
#[derive(Debug, Clone)]
pub struct RecommendationStore {
    path: PathBuf,
    checkpoint_interval: usize,
}

impl RecommendationStore {
    pub fn new(path: PathBuf, checkpoint_interval: usize) -> Self {
        Self {
            path,
            checkpoint_interval: checkpoint_interval.max(1),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Vec<Recommendation>> {
        load_recommendations(&self.path).await
    }

    pub async fn save(&self, records: &[Recommendation]) -> Result<()> {
        save_recommendations(records, &self.path).await
    }

    /// Resolve missing titles in place, one lookup at a time.
    ///
    /// Lookup failures are logged and leave the title unset. The cache is
    /// checkpointed every `checkpoint_interval` lookups. A failed checkpoint
    /// is logged and counted, and the remaining lookups still run. The cache
    /// is always saved once the loop ends; only that final save's error is
    /// returned.
    pub async fn enrich(
        &self,
        records: &mut [Recommendation],
        lookup: &dyn TitleLookup,
    ) -> Result<EnrichStats> {
        let stats = self.resolve_titles(records, lookup).await;
        self.save(records).await?;

        if stats.failed_checkpoints > 0 {
            warn!(
                "{} checkpoint saves failed; final save succeeded",
                stats.failed_checkpoints
            );
        }
        info!(
            "🎬 Enrichment finished: {} resolved, {} failed, {} already titled",
            stats.resolved, stats.failed, stats.skipped
        );
        Ok(stats)
    }

    async fn resolve_titles(
        &self,
        records: &mut [Recommendation],
        lookup: &dyn TitleLookup,
    ) -> EnrichStats {
        let mut stats = EnrichStats::default();

        for index in 0..records.len() {
            if let Some(title) = &records[index].title {
                debug!("Skipping {}", title);
                stats.skipped += 1;
                continue;
            }

            let url = records[index].url.clone();
            info!("🔍 Getting link info: {}", url);

            match lookup.fetch_title(&url).await {
                Ok(title) => {
                    let shared_on = records[index]
                        .sent_at()
                        .map(|at| at.format("%Y-%m-%d").to_string())
                        .unwrap_or_default();
                    info!("✅ {} (shared by {} on {})", title, records[index].sender, shared_on);
                    records[index].title = Some(title);
                    stats.resolved += 1;
                }
                Err(e) => {
                    warn!("{}: Could not extract {} ({})", e.kind(), url, e);
                    stats.failed += 1;
                }
            }

            stats.looked_up += 1;
            if stats.looked_up % self.checkpoint_interval == 0 {
                debug!("💾 Checkpoint after {} lookups", stats.looked_up);
                if let Err(e) = self.save(records).await {
                    warn!("Checkpoint after {} lookups failed: {}", stats.looked_up, e);
                    stats.failed_checkpoints += 1;
                }
            }
        }

        stats
    }
}

/// Read cached recommendations. A missing file is an empty cache.
pub async fn load_recommendations(path: &Path) -> Result<Vec<Recommendation>> {
    if !path.exists() {
        warn!("Attempted to read nonexistent cache {}. Skipping...", path.display());
        return Ok(Vec::new());
    }

    let content = tokio::fs::read_to_string(path).await?;
    let records: Vec<Recommendation> = serde_json::from_str(&content)?;
    debug!("Reading {} recommendations from file {}", records.len(), path.display());

    for record in &records {
        if record.media_id().is_none() {
            return Err(RecsError::MalformedRecord {
                path: path.to_path_buf(),
                reason: format!(
                    "record for {} must have exactly one of video_id and playlist_id",
                    record.url
                ),
            });
        }
    }

    Ok(records)
}

/// Overwrite the cache file with the full list as pretty-printed JSON
pub async fn save_recommendations(records: &[Recommendation], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let json_content = serde_json::to_string_pretty(records)?;
    debug!("Writing {} recommendations to file {}", records.len(), path.display());
    tokio::fs::write(path, json_content).await?;
    Ok(())
}

/// Combine cached and freshly parsed records.
///
/// Fresh records whose identifier is already known are dropped; the rest are
/// appended in encounter order. The result is sorted by timestamp, keeping
/// the relative order of equal timestamps.
pub fn merge(cached: Vec<Recommendation>, fresh: Vec<Recommendation>) -> Vec<Recommendation> {
    let mut seen: HashSet<String> = HashSet::with_capacity(cached.len() + fresh.len());
    let mut merged = Vec::with_capacity(cached.len() + fresh.len());

    for record in cached.into_iter().chain(fresh) {
        let Some(key) = record.key() else {
            warn!("Dropping record without identifier: {}", record.url);
            continue;
        };
        if seen.insert(key.to_string()) {
            merged.push(record);
        }
    }

    merged.sort_by_key(|record| record.timestamp);
    merged
}
