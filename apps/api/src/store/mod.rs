//! Persistence Gateway: the two-entity store behind the dashboard.
//!
//! `AppState` holds an `Arc<dyn PersistenceGateway>`; production wires `PgStore`,
//! tests use an in-memory double.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::post::Post;
use crate::models::user::{ExternalIdentity, UserProfile};
use crate::resilience::NormalizedResult;

pub mod postgres;

pub use postgres::PgStore;

#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// The install's user. The deployment model is one user per install.
    async fn get_first_user(&self) -> Result<Option<UserProfile>, AppError>;

    /// Creates the user for `identity.external_id`, or refreshes its name and avatar.
    async fn upsert_user(&self, identity: &ExternalIdentity) -> Result<UserProfile, AppError>;

    /// Overwrites the user's latest analysis summary. Last write wins.
    async fn save_analysis(&self, user_id: Uuid, result: &NormalizedResult)
        -> Result<(), AppError>;

    async fn append_post(&self, user_id: Uuid, content: &str) -> Result<Post, AppError>;

    /// Posts for `user_id`, most recent first.
    async fn list_posts(&self, user_id: Uuid) -> Result<Vec<Post>, AppError>;
}
