use super::{classify_status, TitleLookup};
use crate::config::LookupConfig;
use crate::error::{LookupError, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;

const TITLE_SUFFIX: &str = "- YouTube";

/// Resolves titles by scraping the link's HTML page
pub struct PageTitleLookup {
    client: Client,
}

impl PageTitleLookup {
    pub fn new(config: &LookupConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl TitleLookup for PageTitleLookup {
    async fn fetch_title(&self, url: &str) -> std::result::Result<String, LookupError> {
        debug!("Fetching page: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::Download(e.to_string()))?;

        if !response.status().is_success() {
            return Err(classify_status(response.status(), url));
        }

        let html = response
            .text()
            .await
            .map_err(|e| LookupError::Download(e.to_string()))?;

        extract_page_title(&html)
            .ok_or_else(|| LookupError::Extraction(format!("no title found on page {}", url)))
    }

    fn name(&self) -> &'static str {
        "page"
    }
}

/// Pull the title out of a video or playlist page
fn extract_page_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    if let Ok(selector) = Selector::parse(r#"meta[property="og:title"]"#) {
        let og_title = document
            .select(&selector)
            .filter_map(|element| element.value().attr("content"))
            .map(str::trim)
            .find(|content| !content.is_empty());
        if let Some(title) = og_title {
            return Some(title.to_string());
        }
    }

    let selector = Selector::parse("title").ok()?;
    let text = document.select(&selector).next()?.text().collect::<String>();
    let title = text.trim();
    let title = title.strip_suffix(TITLE_SUFFIX).unwrap_or(title).trim();

    if title.is_empty() || title == "YouTube" {
        None
    } else {
        Some(title.to_string())
    }
}
