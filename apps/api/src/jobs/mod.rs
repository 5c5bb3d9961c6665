//! Job Search Provider: pass-through to the JSearch API on RapidAPI.
//!
//! Without an API key the service runs on a one-item mock listing so the job
//! board still renders.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

pub mod handlers;

const JSEARCH_URL: &str = "https://jsearch.p.rapidapi.com/search";
const JSEARCH_HOST: &str = "jsearch.p.rapidapi.com";
const MAX_JOBS: usize = 10;

#[derive(Debug, Error)]
pub enum JobSearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External API error (status {0})")]
    Status(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobSource {
    Live,
    Mock,
}

/// Listing shape the job board renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub platform: String,
    #[serde(rename = "link")]
    pub apply_link: String,
}

#[async_trait]
pub trait JobSearchProvider: Send + Sync {
    fn source(&self) -> JobSource;

    async fn search(&self, skill: &str) -> Result<Vec<Job>, JobSearchError>;
}

#[derive(Debug, Deserialize)]
struct JSearchResponse {
    #[serde(default)]
    data: Vec<JSearchJob>,
}

#[derive(Debug, Deserialize)]
struct JSearchJob {
    job_id: Option<String>,
    job_title: Option<String>,
    employer_name: Option<String>,
    job_city: Option<String>,
    job_publisher: Option<String>,
    job_apply_link: Option<String>,
}

impl From<JSearchJob> for Job {
    fn from(raw: JSearchJob) -> Self {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Job {
            id: raw.job_id.unwrap_or_default(),
            title: raw.job_title.unwrap_or_default(),
            company: raw.employer_name.unwrap_or_default(),
            location: non_empty(raw.job_city).unwrap_or_else(|| "Remote".to_string()),
            platform: non_empty(raw.job_publisher).unwrap_or_else(|| "LinkedIn".to_string()),
            apply_link: raw.job_apply_link.unwrap_or_default(),
        }
    }
}

fn map_jobs(response: JSearchResponse) -> Vec<Job> {
    response
        .data
        .into_iter()
        .take(MAX_JOBS)
        .map(Job::from)
        .collect()
}

/// JSearch client; falls back to a mock listing when no key is configured.
#[derive(Clone)]
pub struct JSearchClient {
    client: Client,
    api_key: Option<String>,
}

impl JSearchClient {
    pub fn new(api_key: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build job search HTTP client")?;
        Ok(Self { client, api_key })
    }
}

#[async_trait]
impl JobSearchProvider for JSearchClient {
    fn source(&self) -> JobSource {
        if self.api_key.is_some() {
            JobSource::Live
        } else {
            JobSource::Mock
        }
    }

    async fn search(&self, skill: &str) -> Result<Vec<Job>, JobSearchError> {
        let Some(api_key) = &self.api_key else {
            return Ok(vec![mock_job(skill)]);
        };

        info!("Fetching real jobs for: {skill}");
        let query = format!("{skill} developer");
        let response = self
            .client
            .get(JSEARCH_URL)
            .header("X-RapidAPI-Key", api_key)
            .header("X-RapidAPI-Host", JSEARCH_HOST)
            .query(&[("query", query.as_str()), ("page", "1"), ("num_pages", "1")])
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(JobSearchError::Status(response.status().as_u16()));
        }

        Ok(map_jobs(response.json().await?))
    }
}

fn mock_job(skill: &str) -> Job {
    Job {
        id: "mock-1".to_string(),
        title: format!("Mock {skill} Job"),
        company: "Test Co".to_string(),
        location: "Remote".to_string(),
        platform: "LinkedIn".to_string(),
        apply_link: "#".to_string(),
    }
}
