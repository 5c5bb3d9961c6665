//! Axum route handlers for the OAuth flow.

use axum::{
    extract::{Query, State},
    response::Redirect,
};
use reqwest::Url;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

/// GET /auth/login
pub async fn handle_login(State(state): State<AppState>) -> Redirect {
    Redirect::temporary(&state.identity.authorization_url())
}

/// GET /auth/callback
///
/// Exchanges the code, upserts the user, and hands the token to the dashboard.
pub async fn handle_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect, AppError> {
    let code = query
        .code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Authorization code not found".to_string()))?;

    let access_token = state.identity.exchange_code(&code).await?;
    let identity = state.identity.fetch_identity(&access_token).await?;
    let user = state.store.upsert_user(&identity).await?;
    info!("User {} signed in", user.id);

    let redirect = Url::parse_with_params(
        &format!("{}/dashboard", state.config.frontend_url),
        &[
            ("token", access_token.as_str()),
            ("name", user.display_name.as_str()),
            ("pic", user.avatar_url.as_str()),
        ],
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid FRONTEND_URL: {e}")))?;

    Ok(Redirect::temporary(redirect.as_str()))
}
