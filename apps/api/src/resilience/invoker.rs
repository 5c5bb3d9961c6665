//! Model Invoker seam: one call to the generation provider for one model identifier.

use async_trait::async_trait;

use crate::resilience::task::TaskKind;

/// Classified result of a single generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    /// Raw, unvalidated model text. Never empty.
    Success(String),
    /// This model may answer shortly; wait and retry.
    RateLimited,
    /// This model will never serve this request as-is; try another.
    Rejected(String),
    /// Anything unclassified, including empty bodies and timeouts.
    TransientError(String),
}

impl InvocationOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            InvocationOutcome::Success(_) => "success",
            InvocationOutcome::RateLimited => "rate_limited",
            InvocationOutcome::Rejected(_) => "rejected",
            InvocationOutcome::TransientError(_) => "transient_error",
        }
    }
}

/// The generation provider as seen by the orchestrator.
///
/// Carried in `AppState` as `Arc<dyn ModelInvoker>`; tests swap in a scripted double.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, model: &str, prompt: &str) -> InvocationOutcome;
}

/// One call, folded into orchestration state and then dropped.
#[derive(Debug)]
pub struct GenerationAttempt<'a> {
    pub model: &'a str,
    pub task: TaskKind,
    pub prompt: &'a str,
    pub outcome: InvocationOutcome,
}

impl GenerationAttempt<'_> {
    pub fn log(&self, attempt: u32) {
        match &self.outcome {
            InvocationOutcome::Success(text) => tracing::info!(
                model = self.model,
                task = %self.task,
                attempt,
                response_chars = text.chars().count(),
                "Generation succeeded"
            ),
            InvocationOutcome::RateLimited => tracing::warn!(
                model = self.model,
                task = %self.task,
                attempt,
                "Generation rate limited"
            ),
            InvocationOutcome::Rejected(reason) | InvocationOutcome::TransientError(reason) => {
                tracing::warn!(
                    model = self.model,
                    task = %self.task,
                    attempt,
                    outcome = self.outcome.label(),
                    prompt_chars = self.prompt.chars().count(),
                    "Generation failed: {reason}"
                )
            }
        }
    }
}
