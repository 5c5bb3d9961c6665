//! Post generation: ranked fallback across candidate models, append on success.

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::{self, PromptOptions};
use crate::resilience::{fallback, Orchestrator, TaskKind, TaskResult};
use crate::store::PersistenceGateway;

#[derive(Debug, Clone, Deserialize)]
pub struct PostRequest {
    pub topic: String,
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default)]
    pub author_style: String,
}

fn default_tone() -> String {
    "Professional".to_string()
}

/// Generates a post for `request.topic`.
///
/// Live results are appended to the user's posts. Degraded results carry a
/// topic-specific template and are never stored.
pub async fn generate_post(
    orchestrator: &Orchestrator,
    store: &dyn PersistenceGateway,
    request: &PostRequest,
) -> Result<TaskResult, AppError> {
    let topic = request.topic.trim();
    if topic.is_empty() {
        return Err(AppError::Validation("topic cannot be empty".to_string()));
    }

    let options = PromptOptions {
        tone: &request.tone,
        author_style: &request.author_style,
        ..PromptOptions::default()
    };
    let prompt = prompts::build(TaskKind::SocialPostGeneration, topic, &options);
    let mut result = orchestrator
        .run(TaskKind::SocialPostGeneration, &prompt)
        .await;

    if result.is_degraded() {
        result
            .fields
            .insert("content", Value::String(fallback::post_template(topic)));
        return Ok(result);
    }

    let content = result.fields.str_field("content").unwrap_or_default();
    match store.get_first_user().await? {
        Some(user) => {
            let post = store.append_post(user.id, content).await?;
            info!("Saved generated post {} for user {}", post.id, user.id);
        }
        None => warn!("No user signed in; generated post not saved"),
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::InvocationOutcome;
    use crate::testing::TestHarness;

    fn request(topic: &str) -> PostRequest {
        serde_json::from_value(serde_json::json!({ "topic": topic })).unwrap()
    }

    #[test]
    fn test_request_defaults() {
        let req = request("Rust");
        assert_eq!(req.tone, "Professional");
        assert_eq!(req.author_style, "");
    }

    #[tokio::test]
    async fn test_live_post_is_appended() {
        let harness = TestHarness::with_outcomes([
            InvocationOutcome::Rejected("model not found".into()),
            InvocationOutcome::Success("\"Rust made our service 3x faster.\"".into()),
        ]);
        let user = harness.sign_in().await;

        let result = generate_post(&harness.orchestrator(), harness.store.as_ref(), &request("Rust"))
            .await
            .unwrap();

        assert!(!result.is_degraded());
        assert_eq!(result.fields.str_field("content"), Some("Rust made our service 3x faster."));
        assert_eq!(harness.invoker.models_called(), vec!["model-a", "model-b"]);

        let posts = harness.store.list_posts(user.id).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].content, "Rust made our service 3x faster.");
    }

    #[tokio::test]
    async fn test_degraded_post_is_never_appended() {
        let harness = TestHarness::with_outcomes([
            InvocationOutcome::RateLimited,
            InvocationOutcome::TransientError("503".into()),
        ]);
        let user = harness.sign_in().await;

        let result = generate_post(
            &harness.orchestrator(),
            harness.store.as_ref(),
            &request("Remote Work"),
        )
        .await
        .unwrap();

        assert!(result.is_degraded());
        let content = result.fields.str_field("content").unwrap();
        assert!(fallback::is_degraded_post(content));
        assert!(content.contains("#RemoteWork"));
        assert!(harness.store.list_posts(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_quote_only_model_output_is_not_stored() {
        let harness = TestHarness::with_outcomes([
            InvocationOutcome::Success("\"\"".into()),
            InvocationOutcome::Success("\"\"".into()),
        ]);
        let user = harness.sign_in().await;

        let result = generate_post(&harness.orchestrator(), harness.store.as_ref(), &request("Rust"))
            .await
            .unwrap();

        assert!(result.is_degraded());
        assert!(harness.store.list_posts(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_topic_rejected_before_invocation() {
        let harness = TestHarness::new();
        let result =
            generate_post(&harness.orchestrator(), harness.store.as_ref(), &request("  ")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(harness.invoker.call_count(), 0);
    }
}
