use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::post::Post;
use crate::models::user::{ExternalIdentity, UserProfile};
use crate::resilience::NormalizedResult;
use crate::store::PersistenceGateway;

/// PostgreSQL-backed gateway. Single-row upserts and appends only; no cross-request locking.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersistenceGateway for PgStore {
    async fn get_first_user(&self) -> Result<Option<UserProfile>, AppError> {
        let user = sqlx::query_as::<_, UserProfile>(
            "SELECT * FROM users ORDER BY created_at ASC, id ASC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn upsert_user(&self, identity: &ExternalIdentity) -> Result<UserProfile, AppError> {
        let user = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO users (id, external_id, display_name, avatar_url)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (external_id)
            DO UPDATE SET display_name = EXCLUDED.display_name,
                          avatar_url = EXCLUDED.avatar_url
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&identity.external_id)
        .bind(&identity.name)
        .bind(&identity.avatar_url)
        .fetch_one(&self.pool)
        .await?;

        info!("Upserted user {} ({})", user.id, user.external_id);
        Ok(user)
    }

    async fn save_analysis(
        &self,
        user_id: Uuid,
        result: &NormalizedResult,
    ) -> Result<(), AppError> {
        let summary = serde_json::to_string(result).map_err(anyhow::Error::from)?;

        let updated = sqlx::query("UPDATE users SET profile_summary = $1 WHERE id = $2")
            .bind(summary)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(AppError::NotFound(format!("User {user_id} not found")));
        }
        Ok(())
    }

    async fn append_post(&self, user_id: Uuid, content: &str) -> Result<Post, AppError> {
        let post = sqlx::query_as::<_, Post>(
            "INSERT INTO posts (id, user_id, content) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;

        info!("Appended post {} for user {user_id}", post.id);
        Ok(post)
    }

    async fn list_posts(&self, user_id: Uuid) -> Result<Vec<Post>, AppError> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT * FROM posts WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }
}
