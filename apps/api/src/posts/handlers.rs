//! Axum route handlers for post generation and publishing.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::posts::service::{generate_post, PostRequest};
use crate::resilience::{fallback, TaskResult};
use crate::state::AppState;

/// Audience of a published post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    Public,
    Connections,
    LoggedIn,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "PUBLIC",
            Visibility::Connections => "CONNECTIONS",
            Visibility::LoggedIn => "LOGGED_IN",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    #[serde(default)]
    pub token: String,
    pub text: String,
    #[serde(default)]
    pub visibility: Visibility,
}

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub status: &'static str,
    pub post_id: String,
}

/// POST /api/generate/post
pub async fn handle_generate_post(
    State(state): State<AppState>,
    Json(request): Json<PostRequest>,
) -> Result<Json<TaskResult>, AppError> {
    let result = generate_post(&state.orchestrator, state.store.as_ref(), &request).await?;
    Ok(Json(result))
}

/// POST /api/publish/linkedin
///
/// Refuses fallback templates so placeholder text never goes out as a real post.
pub async fn handle_publish(
    State(state): State<AppState>,
    Json(request): Json<PublishRequest>,
) -> Result<Json<PublishResponse>, AppError> {
    if request.token.trim().is_empty() {
        return Err(AppError::Unauthorized("No token provided".to_string()));
    }
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }
    if fallback::is_degraded_post(&request.text) {
        return Err(AppError::Validation(
            "This post was produced while AI was unavailable; generate it again before publishing"
                .to_string(),
        ));
    }

    let post_id = state
        .identity
        .publish(&request.token, &request.text, request.visibility.as_str())
        .await?;

    Ok(Json(PublishResponse {
        status: "success",
        post_id,
    }))
}
