pub mod health;
pub mod user;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::auth::handlers as auth;
use crate::jobs::handlers as jobs;
use crate::posts::handlers as posts;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // PDF uploads replace axum's 2 MB default with the configured bound.
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Authentication
        .route("/auth/login", get(auth::handle_login))
        .route("/auth/callback", get(auth::handle_callback))
        // Analysis
        .route("/api/analyze/scrape-url", post(analysis::handle_scrape_url))
        .route(
            "/api/analyze/linkedin",
            post(analysis::handle_profile_pdf).layer(upload_limit),
        )
        .route(
            "/api/analyze/resume",
            post(analysis::handle_resume).layer(upload_limit),
        )
        .route(
            "/api/analyze/match-job",
            post(analysis::handle_match_job).layer(upload_limit),
        )
        // Posts
        .route("/api/generate/post", post(posts::handle_generate_post))
        .route("/api/publish/linkedin", post(posts::handle_publish))
        // Jobs & dashboard
        .route("/api/jobs/recommend", get(jobs::handle_recommend))
        .route("/api/user/data", get(user::handle_user_data))
        .with_state(state)
}
