use std::path::PathBuf;

/// Result type for recommendation operations
pub type Result<T> = std::result::Result<T, RecsError>;

/// Error types for the recommendation pipeline
#[derive(thiserror::Error, Debug)]
pub enum RecsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// A link pattern produced an identifier of the wrong length
    #[error("Malformed {kind} identifier '{id}': expected {expected} characters, got {actual}")]
    MalformedIdentifier {
        kind: &'static str,
        id: String,
        expected: usize,
        actual: usize,
    },

    #[error("Malformed record in {}: {reason}", .path.display())]
    MalformedRecord { path: PathBuf, reason: String },
}

/// The two recognized ways a title lookup can fail.
///
/// Neither is fatal: the record keeps an unresolved title and the next run
/// retries it from the cache.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The platform answered but no metadata could be extracted
    #[error("ExtractorError: {0}")]
    Extraction(String),

    /// The metadata could not be fetched at all
    #[error("DownloadError: {0}")]
    Download(String),
}

impl LookupError {
    pub fn kind(&self) -> &'static str {
        match self {
            LookupError::Extraction(_) => "ExtractorError",
            LookupError::Download(_) => "DownloadError",
        }
    }
}
