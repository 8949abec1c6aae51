use super::TitleLookup;
use crate::config::LookupConfig;
use crate::error::LookupError;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Resolves titles by asking yt-dlp for the link's metadata without downloading
pub struct YtDlpLookup {
    binary: String,
    timeout: Duration,
}

impl YtDlpLookup {
    pub fn new(config: &LookupConfig) -> Self {
        Self {
            binary: config.ytdlp_binary.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

#[async_trait]
impl TitleLookup for YtDlpLookup {
    async fn fetch_title(&self, url: &str) -> Result<String, LookupError> {
        debug!("Running {} for {}", self.binary, url);

        let mut command = tokio::process::Command::new(&self.binary);
        command
            .args([
                "--dump-single-json",
                "--flat-playlist",
                "--skip-download",
                "--no-warnings",
                url,
            ])
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                LookupError::Download(format!(
                    "{} timed out after {}s",
                    self.binary,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| LookupError::Download(format!("failed to launch {}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_stderr(stderr.trim()));
        }

        title_from_json(&output.stdout)
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}

/// Map yt-dlp's error output to a failure kind
fn classify_stderr(stderr: &str) -> LookupError {
    let lowered = stderr.to_ascii_lowercase();
    let transient = ["unable to download", "http error 5", "http error 429", "timed out", "connection"];
    if transient.iter().any(|needle| lowered.contains(needle)) {
        LookupError::Download(stderr.to_string())
    } else {
        LookupError::Extraction(stderr.to_string())
    }
}

fn title_from_json(stdout: &[u8]) -> Result<String, LookupError> {
    let info: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|e| LookupError::Extraction(format!("invalid yt-dlp output: {}", e)))?;

    info["title"]
        .as_str()
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .ok_or_else(|| LookupError::Extraction("no title in yt-dlp output".to_string()))
}
