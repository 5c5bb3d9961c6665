//! Test doubles shared by the unit tests. Compiled only under `cfg(test)`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{IdentityProvider, LinkedInError};
use crate::config::Config;
use crate::documents::{DocumentTextExtractor, ProfileScraper, ScrapedProfile};
use crate::errors::AppError;
use crate::jobs::JSearchClient;
use crate::models::post::Post;
use crate::models::user::{ExternalIdentity, UserProfile};
use crate::resilience::{
    InvocationOutcome, ModelInvoker, NormalizedResult, Orchestrator, RetryPolicy,
};
use crate::state::AppState;
use crate::store::PersistenceGateway;

// ────────────────────────────────────────────────────────────────────────────
// Generation provider doubles
// ────────────────────────────────────────────────────────────────────────────

/// Replays scripted outcomes in order and records every call.
/// Once the script runs out every call is a transient error.
#[derive(Default)]
pub struct ScriptedInvoker {
    script: Mutex<VecDeque<InvocationOutcome>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedInvoker {
    pub fn new(outcomes: impl IntoIterator<Item = InvocationOutcome>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn models_called(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
    }

    pub fn prompts_sent(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(_, p)| p.clone()).collect()
    }
}

#[async_trait]
impl ModelInvoker for ScriptedInvoker {
    async fn invoke(&self, model: &str, prompt: &str) -> InvocationOutcome {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.to_string()));
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| InvocationOutcome::TransientError("script exhausted".to_string()))
    }
}

/// Never answers.
pub struct HangingInvoker;

#[async_trait]
impl ModelInvoker for HangingInvoker {
    async fn invoke(&self, _model: &str, _prompt: &str) -> InvocationOutcome {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        InvocationOutcome::Success("too late".to_string())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Persistence double
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<UserProfile>>,
    posts: Mutex<Vec<Post>>,
}

impl MemoryStore {
    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn summary_of(&self, user_id: Uuid) -> Option<serde_json::Value> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .and_then(UserProfile::summary_json)
    }
}

#[async_trait]
impl PersistenceGateway for MemoryStore {
    async fn get_first_user(&self) -> Result<Option<UserProfile>, AppError> {
        Ok(self.users.lock().unwrap().first().cloned())
    }

    async fn upsert_user(&self, identity: &ExternalIdentity) -> Result<UserProfile, AppError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users
            .iter_mut()
            .find(|u| u.external_id == identity.external_id)
        {
            user.display_name = identity.name.clone();
            user.avatar_url = identity.avatar_url.clone();
            return Ok(user.clone());
        }

        let user = UserProfile {
            id: Uuid::new_v4(),
            external_id: identity.external_id.clone(),
            display_name: identity.name.clone(),
            avatar_url: identity.avatar_url.clone(),
            profile_summary: None,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn save_analysis(
        &self,
        user_id: Uuid,
        result: &NormalizedResult,
    ) -> Result<(), AppError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;
        user.profile_summary = Some(serde_json::to_string(result).map_err(anyhow::Error::from)?);
        Ok(())
    }

    async fn append_post(&self, user_id: Uuid, content: &str) -> Result<Post, AppError> {
        let post = Post {
            id: Uuid::new_v4(),
            user_id,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn list_posts(&self, user_id: Uuid) -> Result<Vec<Post>, AppError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Connector doubles
// ────────────────────────────────────────────────────────────────────────────

/// Issues `token-for-<code>` and always resolves to the same member.
#[derive(Default)]
pub struct FakeIdentity {
    published: Mutex<Vec<(String, String)>>,
}

impl FakeIdentity {
    pub fn member() -> ExternalIdentity {
        ExternalIdentity {
            external_id: "member-1".to_string(),
            name: "Ada Lovelace".to_string(),
            avatar_url: "https://media.example.test/ada.png".to_string(),
        }
    }

    /// `(text, visibility)` pairs published so far.
    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    fn authorization_url(&self) -> String {
        "https://auth.example.test/authorize".to_string()
    }

    async fn exchange_code(&self, code: &str) -> Result<String, LinkedInError> {
        Ok(format!("token-for-{code}"))
    }

    async fn fetch_identity(&self, _token: &str) -> Result<ExternalIdentity, LinkedInError> {
        Ok(Self::member())
    }

    async fn publish(
        &self,
        _token: &str,
        text: &str,
        visibility: &str,
    ) -> Result<String, LinkedInError> {
        let mut published = self.published.lock().unwrap();
        published.push((text.to_string(), visibility.to_string()));
        Ok(format!("urn:li:share:{}", published.len()))
    }
}

pub struct StaticExtractor(pub String);

impl DocumentTextExtractor for StaticExtractor {
    fn extract_text(&self, _bytes: &[u8]) -> String {
        self.0.clone()
    }
}

pub struct StaticScraper(pub Option<ScrapedProfile>);

#[async_trait]
impl ProfileScraper for StaticScraper {
    async fn scrape(&self, _url: &str) -> Option<ScrapedProfile> {
        self.0.clone()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Harness
// ────────────────────────────────────────────────────────────────────────────

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/linkbrand_test".to_string(),
        gemini_api_key: "test-key".to_string(),
        candidate_models: vec!["model-a".to_string(), "model-b".to_string()],
        analysis_model: "analysis-model".to_string(),
        llm_timeout: Duration::from_secs(30),
        rate_limit_backoff: Duration::from_secs(5),
        linkedin_client_id: "client-id".to_string(),
        linkedin_client_secret: "client-secret".to_string(),
        redirect_uri: "http://localhost:8000/auth/callback".to_string(),
        frontend_url: "http://localhost:3000".to_string(),
        rapidapi_key: None,
        scraper_endpoint: None,
        scraper_timeout: Duration::from_secs(90),
        max_upload_bytes: 20 * 1024 * 1024,
        port: 8000,
        rust_log: "debug".to_string(),
    }
}

/// Wires an `AppState` out of in-memory doubles.
pub struct TestHarness {
    pub invoker: Arc<ScriptedInvoker>,
    pub store: Arc<MemoryStore>,
    pub identity: Arc<FakeIdentity>,
    pub config: Config,
    document_text: String,
    scraped: Option<ScrapedProfile>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_outcomes(Vec::new())
    }

    pub fn with_outcomes(outcomes: impl IntoIterator<Item = InvocationOutcome>) -> Self {
        Self {
            invoker: ScriptedInvoker::new(outcomes),
            store: Arc::new(MemoryStore::default()),
            identity: Arc::new(FakeIdentity::default()),
            config: test_config(),
            document_text: String::new(),
            scraped: None,
        }
    }

    pub fn with_document_text(mut self, text: &str) -> Self {
        self.document_text = text.to_string();
        self
    }

    pub fn with_scraped_profile(mut self, profile: ScrapedProfile) -> Self {
        self.scraped = Some(profile);
        self
    }

    pub async fn sign_in(&self) -> UserProfile {
        self.store
            .upsert_user(&FakeIdentity::member())
            .await
            .unwrap()
    }

    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(
            self.invoker.clone(),
            self.config.candidate_models.clone(),
            self.config.analysis_model.clone(),
            RetryPolicy {
                max_attempts: 3,
                backoff: self.config.rate_limit_backoff,
            },
            self.config.llm_timeout,
        )
    }

    pub fn state(&self) -> AppState {
        AppState {
            store: self.store.clone(),
            orchestrator: self.orchestrator(),
            identity: self.identity.clone(),
            jobs: Arc::new(JSearchClient::new(None, Duration::from_secs(1)).unwrap()),
            extractor: Arc::new(StaticExtractor(self.document_text.clone())),
            scraper: Arc::new(StaticScraper(self.scraped.clone())),
            config: self.config.clone(),
        }
    }
}
