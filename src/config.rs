use crate::error::{RecsError, Result};
use crate::extractor::ExtractionPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Configuration for the recommendation collector
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cache file settings
    pub cache: CacheConfig,

    /// Title lookup settings
    pub lookup: LookupConfig,

    /// Message parsing policy
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Path of the processed recommendations file
    pub path: PathBuf,

    /// Save a checkpoint after this many lookups
    pub checkpoint_interval: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Backend used to resolve titles
    pub provider: LookupProvider,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// oEmbed endpoint queried by the `oembed` provider
    pub oembed_endpoint: String,

    /// Executable used by the `ytdlp` provider
    pub ytdlp_binary: String,

    /// User agent for HTTP providers
    pub user_agent: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupProvider {
    OEmbed,
    YtDlp,
    Page,
}

impl FromStr for LookupProvider {
    type Err = RecsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "oembed" => Ok(LookupProvider::OEmbed),
            "ytdlp" | "yt-dlp" => Ok(LookupProvider::YtDlp),
            "page" => Ok(LookupProvider::Page),
            other => Err(RecsError::Configuration(format!(
                "unknown lookup provider '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Skip messages containing more than one link
    pub skip_ambiguous: bool,

    /// Skip messages containing URL-encoded nested links
    pub skip_nested_links: bool,
}

impl ExtractionConfig {
    pub fn policy(&self) -> ExtractionPolicy {
        ExtractionPolicy {
            skip_ambiguous: self.skip_ambiguous,
            skip_nested_links: self.skip_nested_links,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("cache/processed.json"),
            checkpoint_interval: 100,
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            provider: LookupProvider::OEmbed,
            timeout_seconds: 30,
            oembed_endpoint: "https://www.youtube.com/oembed".to_string(),
            ytdlp_binary: "yt-dlp".to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        let policy = ExtractionPolicy::STRICT;
        Self {
            skip_ambiguous: policy.skip_ambiguous,
            skip_nested_links: policy.skip_nested_links,
        }
    }
}

impl Config {
    /// Load configuration, trying an explicit path first, then the default
    /// locations, then environment variables.
    ///
    /// Unreadable or unparsable default-location files are skipped with a
    /// warning. Invalid environment overrides are returned as errors.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let config_paths = ["yt-recs.toml", "config/yt-recs.toml"];

        for path in &config_paths {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str::<Config>(&config_str) {
                    Ok(config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        return config.with_env_overrides();
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Self::default().with_env_overrides()
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&config_str)?;
        tracing::info!("📄 Loaded configuration from: {}", path.display());
        config.with_env_overrides()
    }

    /// Apply `YT_RECS_*` environment variables on top of this configuration
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `YT_RECS_*` overrides read through `var`.
    ///
    /// An invalid value is an error; the configuration it was applied to is
    /// never silently replaced.
    pub fn with_overrides<F>(mut self, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = var("YT_RECS_CACHE_PATH") {
            self.cache.path = PathBuf::from(path);
        }

        if let Some(interval) = var("YT_RECS_CHECKPOINT_INTERVAL") {
            self.cache.checkpoint_interval = interval.parse().map_err(|_| {
                RecsError::Configuration(format!(
                    "invalid YT_RECS_CHECKPOINT_INTERVAL '{}'",
                    interval
                ))
            })?;
        }

        if let Some(provider) = var("YT_RECS_LOOKUP_PROVIDER") {
            self.lookup.provider = provider.parse().map_err(|e| {
                RecsError::Configuration(format!("invalid YT_RECS_LOOKUP_PROVIDER: {}", e))
            })?;
        }

        if let Some(binary) = var("YT_RECS_YTDLP_BINARY") {
            self.lookup.ytdlp_binary = binary;
        }

        Ok(self)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.cache.checkpoint_interval == 0 {
            return Err(RecsError::Configuration(
                "checkpoint_interval must be greater than 0".to_string(),
            ));
        }

        if self.lookup.timeout_seconds == 0 {
            return Err(RecsError::Configuration(
                "timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if let Some(parent) = self.cache.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    RecsError::Configuration(format!("Cannot create cache directory: {}", e))
                })?;
            }
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Configuration:\n\
            - Cache: {}\n\
            - Checkpoint every: {} lookups\n\
            - Lookup provider: {:?}\n\
            - Skip ambiguous messages: {}\n\
            - Skip nested links: {}",
            self.cache.path.display(),
            self.cache.checkpoint_interval,
            self.lookup.provider,
            self.extraction.skip_ambiguous,
            self.extraction.skip_nested_links
        )
    }
}
