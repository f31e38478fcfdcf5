pub mod batch;
pub mod escalation;
pub mod llm;
pub mod normalizer;
pub mod orchestrator;
pub mod pacing;
pub mod progress;
pub mod prompt;
pub mod schema;
pub mod session;

#[cfg(test)]
mod testing;

pub use batch::{BatchError, BatchOutcome, BatchRunner, TextSource};
pub use escalation::{EscalationController, EscalationPolicy, PromptedQuery, TierQuery};
pub use llm::{resolve_model, AnthropicClient, CompletionClient, LlmError, OllamaClient, Sampling};
pub use normalizer::{ResponseNormalizer, SENTINEL};
pub use orchestrator::{PipelineSettings, TopicExtractionOrchestrator};
pub use pacing::PacedClient;
pub use progress::{NoProgress, ProgressEvent, ProgressSink, TracingProgress};
pub use schema::{Answer, DocumentResult, Topic, TopicEntry, TopicResult};
pub use session::SessionReset;

/// A failed model query, as seen by the pipeline.
pub type QueryError = LlmError;
