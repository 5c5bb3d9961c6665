//! Analysis pipeline: readability gate → prompt → orchestrate → persist on success.

use tracing::{info, warn};

use crate::documents::extractor::is_readable;
use crate::errors::AppError;
use crate::llm_client::prompts::{self, PromptOptions};
use crate::resilience::{Orchestrator, TaskKind, TaskResult};
use crate::store::PersistenceGateway;

/// Analyzes text extracted from an uploaded document.
///
/// Unreadable text (image-only or failed extraction) returns the task's fallback
/// without calling the model.
pub async fn analyze_document(
    orchestrator: &Orchestrator,
    store: &dyn PersistenceGateway,
    task: TaskKind,
    text: &str,
    options: &PromptOptions<'_>,
) -> Result<TaskResult, AppError> {
    if !is_readable(text) {
        warn!(task = %task, chars = text.trim().chars().count(), "Document unreadable, returning fallback");
        return Ok(TaskResult::degraded(task));
    }

    run_analysis(orchestrator, store, task, text, options).await
}

/// Orchestrates `task` over `input` and, for profile analyses that succeeded,
/// overwrites the user's stored summary. Degraded results are never persisted.
pub async fn run_analysis(
    orchestrator: &Orchestrator,
    store: &dyn PersistenceGateway,
    task: TaskKind,
    input: &str,
    options: &PromptOptions<'_>,
) -> Result<TaskResult, AppError> {
    let prompt = prompts::build(task, input, options);
    let result = orchestrator.run(task, &prompt).await;

    if result.is_degraded() || !task.persists_summary() {
        return Ok(result);
    }

    match store.get_first_user().await? {
        Some(user) => {
            store.save_analysis(user.id, &result.fields).await?;
            info!(task = %task, "Saved analysis summary for user {}", user.id);
        }
        None => warn!(task = %task, "No user signed in; analysis not saved"),
    }

    Ok(result)
}
