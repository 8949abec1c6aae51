use super::{classify_status, TitleLookup};
use crate::config::LookupConfig;
use crate::error::{LookupError, RecsError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Resolves titles through the platform's oEmbed endpoint
pub struct OEmbedLookup {
    client: Client,
    endpoint: Url,
}

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: Option<String>,
}

impl OEmbedLookup {
    pub fn new(config: &LookupConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()?;

        let endpoint = Url::parse(&config.oembed_endpoint).map_err(|e| {
            RecsError::Configuration(format!(
                "invalid oEmbed endpoint '{}': {}",
                config.oembed_endpoint, e
            ))
        })?;

        Ok(Self { client, endpoint })
    }

    fn request_url(&self, url: &str) -> Url {
        let mut request = self.endpoint.clone();
        request
            .query_pairs_mut()
            .append_pair("url", url)
            .append_pair("format", "json");
        request
    }
}

#[async_trait]
impl TitleLookup for OEmbedLookup {
    async fn fetch_title(&self, url: &str) -> std::result::Result<String, LookupError> {
        let request = self.request_url(url);
        debug!("Requesting oEmbed metadata: {}", request);

        let response = self
            .client
            .get(request)
            .send()
            .await
            .map_err(|e| LookupError::Download(e.to_string()))?;

        if !response.status().is_success() {
            return Err(classify_status(response.status(), url));
        }

        let body: OEmbedResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Extraction(format!("invalid oEmbed response: {}", e)))?;

        body.title
            .filter(|title| !title.is_empty())
            .ok_or_else(|| LookupError::Extraction(format!("no title in oEmbed response for {}", url)))
    }

    fn name(&self) -> &'static str {
        "oembed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url_encodes_target() {
        let lookup = OEmbedLookup::new(&LookupConfig::default()).unwrap();
        let request = lookup.request_url("https://www.youtube.com/playlist?list=PLx0sYbCqOb8TBPRdmBHs5Iftvv9TPboYG");
        assert_eq!(
            request.as_str(),
            "https://www.youtube.com/oembed?url=https%3A%2F%2Fwww.youtube.com%2Fplaylist%3Flist%3DPLx0sYbCqOb8TBPRdmBHs5Iftvv9TPboYG&format=json"
        );
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let config = LookupConfig {
            oembed_endpoint: "not a url".to_string(),
            ..LookupConfig::default()
        };
        assert!(matches!(
            OEmbedLookup::new(&config),
            Err(RecsError::Configuration(_))
        ));
    }
}
