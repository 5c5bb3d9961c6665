use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UserDataResponse {
    pub stats: Option<Value>,
    pub posts: Vec<String>,
}

/// GET /api/user/data
///
/// Dashboard refresh: latest stored analysis plus post history, newest first.
pub async fn handle_user_data(
    State(state): State<AppState>,
) -> Result<Json<UserDataResponse>, AppError> {
    let Some(user) = state.store.get_first_user().await? else {
        return Ok(Json(UserDataResponse {
            stats: None,
            posts: Vec::new(),
        }));
    };

    let posts = state
        .store
        .list_posts(user.id)
        .await?
        .into_iter()
        .map(|p| p.content)
        .collect();

    Ok(Json(UserDataResponse {
        stats: user.summary_json(),
        posts,
    }))
}
