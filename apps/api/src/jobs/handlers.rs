//! Axum route handler for job recommendations.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::jobs::{Job, JobSource};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    #[serde(default = "default_skill")]
    pub skill: String,
}

fn default_skill() -> String {
    "Python".to_string()
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub status: &'static str,
    pub count: usize,
    pub jobs: Vec<Job>,
}

/// GET /api/jobs/recommend
///
/// Upstream failures degrade to an empty `error` listing rather than a 5xx.
pub async fn handle_recommend(
    State(state): State<AppState>,
    Query(query): Query<RecommendQuery>,
) -> Json<RecommendResponse> {
    let status = match state.jobs.source() {
        JobSource::Live => "success",
        JobSource::Mock => "mock",
    };

    match state.jobs.search(query.skill.trim()).await {
        Ok(jobs) => Json(RecommendResponse {
            status,
            count: jobs.len(),
            jobs,
        }),
        Err(e) => {
            error!("Job fetch error: {e}");
            Json(RecommendResponse {
                status: "error",
                count: 0,
                jobs: Vec::new(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::{JobSearchError, JobSearchProvider};
    use crate::testing::TestHarness;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct UnavailableJobs;

    #[async_trait]
    impl JobSearchProvider for UnavailableJobs {
        fn source(&self) -> JobSource {
            JobSource::Live
        }

        async fn search(&self, _skill: &str) -> Result<Vec<Job>, JobSearchError> {
            Err(JobSearchError::Status(503))
        }
    }

    #[tokio::test]
    async fn test_recommend_uses_default_skill() {
        let harness = TestHarness::new();
        let query: RecommendQuery = serde_json::from_str("{}").unwrap();

        let Json(body) = handle_recommend(State(harness.state()), Query(query)).await;

        assert_eq!(body.status, "mock");
        assert_eq!(body.count, 1);
        assert_eq!(body.jobs[0].title, "Mock Python Job");
    }

    #[tokio::test]
    async fn test_upstream_failure_degrades_to_error_listing() {
        let mut state = TestHarness::new().state();
        state.jobs = Arc::new(UnavailableJobs);
        let query = RecommendQuery {
            skill: "Rust".to_string(),
        };

        let Json(body) = handle_recommend(State(state), Query(query)).await;

        assert_eq!(body.status, "error");
        assert_eq!(body.count, 0);
        assert!(body.jobs.is_empty());
    }
}
