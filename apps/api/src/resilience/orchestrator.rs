//! Resilience Orchestrator: drives the Model Invoker until a task has an answer.
//!
//! Two modes, chosen by `TaskKind::mode()`:
//! - Ranked fallback: try each candidate model once, in order, stop at first success.
//! - Retry with backoff: one model, constant delay between rate-limited attempts,
//!   at most `max_attempts` calls.
//!
//! Both modes terminate in a `TaskResult`. Provider failures never escape as errors;
//! exhaustion yields the Fallback Catalog entry marked `degraded`.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::resilience::fallback;
use crate::resilience::invoker::{GenerationAttempt, InvocationOutcome, ModelInvoker};
use crate::resilience::normalizer::{normalize, NormalizedResult};
use crate::resilience::task::{InvocationMode, TaskKind};

/// Bounded constant-delay retry for rate-limited calls.
///
/// The delay does not grow between attempts. That is enough for a single-tenant
/// deployment; it will not spread load under real concurrency.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(5),
        }
    }
}

/// Schema-complete outcome of one orchestration run.
///
/// Serializes as the schema fields plus `degraded`, so live and fallback responses
/// share one key set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskResult {
    #[serde(flatten)]
    pub fields: NormalizedResult,
    pub degraded: bool,
}

impl TaskResult {
    pub fn live(fields: NormalizedResult) -> Self {
        Self {
            fields,
            degraded: false,
        }
    }

    pub fn degraded(task: TaskKind) -> Self {
        Self {
            fields: fallback::get(task),
            degraded: true,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    invoker: Arc<dyn ModelInvoker>,
    candidate_models: Arc<[String]>,
    analysis_model: String,
    policy: RetryPolicy,
    call_timeout: Duration,
}

impl Orchestrator {
    pub fn new(
        invoker: Arc<dyn ModelInvoker>,
        candidate_models: Vec<String>,
        analysis_model: String,
        policy: RetryPolicy,
        call_timeout: Duration,
    ) -> Self {
        Self {
            invoker,
            candidate_models: candidate_models.into(),
            analysis_model,
            policy,
            call_timeout,
        }
    }

    /// Runs `task` with the mode it is configured for.
    pub async fn run(&self, task: TaskKind, prompt: &str) -> TaskResult {
        match task.mode() {
            InvocationMode::RankedFallback => {
                self.ranked_fallback(task, &self.candidate_models, prompt)
                    .await
            }
            InvocationMode::RetryWithBackoff => {
                self.retry_with_backoff(task, &self.analysis_model, prompt)
                    .await
            }
        }
    }

    /// Mode A. Every non-success outcome, rate limits included, advances to the
    /// next candidate without spending retry budget.
    pub async fn ranked_fallback(
        &self,
        task: TaskKind,
        candidates: &[String],
        prompt: &str,
    ) -> TaskResult {
        for (index, model) in candidates.iter().enumerate() {
            let attempt = GenerationAttempt {
                model,
                task,
                prompt,
                outcome: self.invoke_bounded(model, prompt).await,
            };
            attempt.log(index as u32 + 1);

            match attempt.outcome {
                InvocationOutcome::Success(text) => match usable_result(&text, task) {
                    Some(fields) => {
                        info!(task = %task, model = model.as_str(), "Ranked fallback resolved");
                        return TaskResult::live(fields);
                    }
                    None => {
                        warn!(task = %task, model = model.as_str(), "Model returned an empty post, trying next candidate");
                        continue;
                    }
                },
                InvocationOutcome::RateLimited
                | InvocationOutcome::Rejected(_)
                | InvocationOutcome::TransientError(_) => continue,
            }
        }

        error!(
            task = %task,
            candidates = candidates.len(),
            "All candidate models failed, returning fallback"
        );
        TaskResult::degraded(task)
    }

    /// Mode B. `Start -> Invoking -> {Done | Waiting -> Invoking | Fallback}`.
    pub async fn retry_with_backoff(&self, task: TaskKind, model: &str, prompt: &str) -> TaskResult {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempts = 0;

        loop {
            attempts += 1;
            let attempt = GenerationAttempt {
                model,
                task,
                prompt,
                outcome: self.invoke_bounded(model, prompt).await,
            };
            attempt.log(attempts);

            match attempt.outcome {
                InvocationOutcome::Success(text) => {
                    return match usable_result(&text, task) {
                        Some(fields) => TaskResult::live(fields),
                        None => {
                            error!(task = %task, model, "Model returned empty content, returning fallback");
                            TaskResult::degraded(task)
                        }
                    };
                }
                InvocationOutcome::RateLimited if attempts < max_attempts => {
                    warn!(
                        "Quota hit. Waiting {}s... (attempt {attempts}/{max_attempts})",
                        self.policy.backoff.as_secs()
                    );
                    tokio::time::sleep(self.policy.backoff).await;
                }
                InvocationOutcome::RateLimited => {
                    error!(task = %task, model, "Rate limited on every attempt, returning fallback");
                    return TaskResult::degraded(task);
                }
                InvocationOutcome::Rejected(_) | InvocationOutcome::TransientError(_) => {
                    error!(task = %task, model, "Generation abandoned, returning fallback");
                    return TaskResult::degraded(task);
                }
            }
        }
    }

    async fn invoke_bounded(&self, model: &str, prompt: &str) -> InvocationOutcome {
        match tokio::time::timeout(self.call_timeout, self.invoker.invoke(model, prompt)).await {
            Ok(outcome) => outcome,
            Err(_) => InvocationOutcome::TransientError(format!(
                "no response within {}s",
                self.call_timeout.as_secs()
            )),
        }
    }
}

/// Normalized fields, or `None` when a plain-text task produced no body.
fn usable_result(text: &str, task: TaskKind) -> Option<NormalizedResult> {
    let fields = normalize(text, task);
    if task.expects_plain_text()
        && fields
            .str_field("content")
            .map_or(true, |content| content.trim().is_empty())
    {
        return None;
    }
    Some(fields)
}
