//! Profile Scraper: fetches rendered profile text for a public profile URL.
//!
//! Browser automation lives in a separate scraping service. This client posts the
//! target URL to `SCRAPER_ENDPOINT` and expects `{"name": ..., "about": ...}` back.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedProfile {
    pub name: String,
    pub raw_text: String,
}

#[async_trait]
pub trait ProfileScraper: Send + Sync {
    /// `None` when the profile could not be scraped.
    async fn scrape(&self, url: &str) -> Option<ScrapedProfile>;
}

#[derive(Debug, Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    name: Option<String>,
    about: Option<String>,
}

impl ScrapeResponse {
    fn into_profile(self) -> ScrapedProfile {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Unknown User".to_string());
        let about = self.about.map(|a| a.trim().to_string()).unwrap_or_default();
        ScrapedProfile {
            raw_text: format!("Name: {name}\nAbout: {about}"),
            name,
        }
    }
}

#[derive(Clone)]
pub struct HttpProfileScraper {
    client: Client,
    endpoint: Option<String>,
}

impl HttpProfileScraper {
    pub fn new(endpoint: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build scraper HTTP client")?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl ProfileScraper for HttpProfileScraper {
    async fn scrape(&self, url: &str) -> Option<ScrapedProfile> {
        let Some(endpoint) = &self.endpoint else {
            warn!("Scraper unavailable: SCRAPER_ENDPOINT is not set");
            return None;
        };

        info!("Scraping profile URL: {url}");
        let response = match self
            .client
            .post(endpoint)
            .json(&ScrapeRequest { url })
            .send()
            .await
        {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                warn!("Scraper returned {}", r.status());
                return None;
            }
            Err(e) => {
                warn!("Scraping error: {e}");
                return None;
            }
        };

        match response.json::<ScrapeResponse>().await {
            Ok(body) => Some(body.into_profile()),
            Err(e) => {
                warn!("Scraper response unreadable: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_text_combines_name_and_about() {
        let body: ScrapeResponse = serde_json::from_str(
            r#"{"name": "  Ada Lovelace ", "about": "Analytical engine programmer"}"#,
        )
        .unwrap();
        let profile = body.into_profile();
        assert_eq!(profile.name, "Ada Lovelace");
        assert_eq!(
            profile.raw_text,
            "Name: Ada Lovelace\nAbout: Analytical engine programmer"
        );
    }

    #[test]
    fn test_missing_fields_use_placeholders() {
        let body: ScrapeResponse = serde_json::from_str(r#"{"name": ""}"#).unwrap();
        let profile = body.into_profile();
        assert_eq!(profile.name, "Unknown User");
        assert_eq!(profile.raw_text, "Name: Unknown User\nAbout: ");
    }

    #[tokio::test]
    async fn test_unconfigured_scraper_returns_none() {
        let scraper = HttpProfileScraper::new(None, Duration::from_secs(1)).unwrap();
        assert_eq!(scraper.scrape("https://www.linkedin.com/in/someone").await, None);
    }
}
