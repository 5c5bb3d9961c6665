// AI-response resilience layer.
// Every generation call in the service goes through the Orchestrator, which
// guarantees a schema-complete answer even when the provider is down.

pub mod fallback;
pub mod invoker;
pub mod normalizer;
pub mod orchestrator;
pub mod task;

pub use invoker::{InvocationOutcome, ModelInvoker};
pub use normalizer::NormalizedResult;
pub use orchestrator::{Orchestrator, RetryPolicy, TaskResult};
pub use task::TaskKind;
