//! Identity/Posting Provider backed by the LinkedIn OAuth and UGC APIs.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::errors::AppError;
use crate::models::user::ExternalIdentity;

const AUTHORIZATION_URL: &str = "https://www.linkedin.com/oauth/v2/authorization";
const ACCESS_TOKEN_URL: &str = "https://www.linkedin.com/oauth/v2/accessToken";
const USERINFO_URL: &str = "https://api.linkedin.com/v2/userinfo";
const UGC_POSTS_URL: &str = "https://api.linkedin.com/v2/ugcPosts";
/// Read profile (openid), email, and post on the member's behalf.
const OAUTH_SCOPE: &str = "openid profile email w_member_social";

#[derive(Debug, Error)]
pub enum LinkedInError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("ID fetch failed (status {0})")]
    IdentityFetch(u16),

    #[error("LinkedIn rejected the post (status {status}): {message}")]
    PublishRejected { status: u16, message: String },
}

impl From<LinkedInError> for AppError {
    fn from(e: LinkedInError) -> Self {
        AppError::Upstream(e.to_string())
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is sent to for consent.
    fn authorization_url(&self) -> String;

    async fn exchange_code(&self, code: &str) -> Result<String, LinkedInError>;

    async fn fetch_identity(&self, token: &str) -> Result<ExternalIdentity, LinkedInError>;

    /// Publishes `text` as the token's member and returns the post id.
    async fn publish(&self, token: &str, text: &str, visibility: &str)
        -> Result<String, LinkedInError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: Option<String>,
    given_name: Option<String>,
    picture: Option<String>,
}

impl UserInfo {
    fn into_identity(self) -> Option<ExternalIdentity> {
        Some(ExternalIdentity {
            external_id: self.sub.filter(|s| !s.is_empty())?,
            name: self.given_name.unwrap_or_else(|| "User".to_string()),
            avatar_url: self.picture.unwrap_or_default(),
        })
    }
}

#[derive(Clone)]
pub struct LinkedInClient {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl LinkedInClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build LinkedIn HTTP client")?;
        Ok(Self {
            client,
            client_id: config.linkedin_client_id.clone(),
            client_secret: config.linkedin_client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
        })
    }
}

#[async_trait]
impl IdentityProvider for LinkedInClient {
    fn authorization_url(&self) -> String {
        Url::parse_with_params(
            AUTHORIZATION_URL,
            &[
                ("response_type", "code"),
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", OAUTH_SCOPE),
            ],
        )
        .map(String::from)
        .unwrap_or_else(|_| AUTHORIZATION_URL.to_string())
    }

    async fn exchange_code(&self, code: &str) -> Result<String, LinkedInError> {
        let response: TokenResponse = self
            .client
            .post(ACCESS_TOKEN_URL)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        response.access_token.ok_or_else(|| {
            LinkedInError::TokenExchange(
                response
                    .error_description
                    .unwrap_or_else(|| "no access_token in response".to_string()),
            )
        })
    }

    async fn fetch_identity(&self, token: &str) -> Result<ExternalIdentity, LinkedInError> {
        let response = self
            .client
            .get(USERINFO_URL)
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("LinkedIn userinfo returned {status}");
            return Err(LinkedInError::IdentityFetch(status.as_u16()));
        }

        response
            .json::<UserInfo>()
            .await?
            .into_identity()
            .ok_or(LinkedInError::IdentityFetch(status.as_u16()))
    }

    async fn publish(
        &self,
        token: &str,
        text: &str,
        visibility: &str,
    ) -> Result<String, LinkedInError> {
        let identity = self.fetch_identity(token).await?;
        let payload = ugc_post_payload(&identity.external_id, text, visibility);

        let response = self
            .client
            .post(UGC_POSTS_URL)
            .bearer_auth(token)
            .header("X-Restli-Protocol-Version", "2.0.0")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let header_id = response
            .headers()
            .get("x-restli-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if status != StatusCode::CREATED {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(LinkedInError::PublishRejected {
                status: status.as_u16(),
                message,
            });
        }

        let post_id = body
            .get("id")
            .and_then(Value::as_str)
            .map(String::from)
            .or(header_id)
            .unwrap_or_default();
        info!("Published post {post_id} for member {}", identity.external_id);
        Ok(post_id)
    }
}

/// UGC share body for a text-only post.
pub fn ugc_post_payload(member_id: &str, text: &str, visibility: &str) -> Value {
    json!({
        "author": format!("urn:li:person:{member_id}"),
        "lifecycleState": "PUBLISHED",
        "specificContent": {
            "com.linkedin.ugc.ShareContent": {
                "shareCommentary": { "text": text },
                "shareMediaCategory": "NONE"
            }
        },
        "visibility": { "com.linkedin.ugc.MemberNetworkVisibility": visibility }
    })
}
