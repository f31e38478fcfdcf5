use crate::llm::CompletionClient;
use crate::orchestrator::TopicExtractionOrchestrator;
use crate::progress::ProgressEvent;
use crate::schema::DocumentResult;
use async_trait::async_trait;
use ingest::{DocumentLoader, DocumentText, ExtractionError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("No results were obtained from {attempted} document(s)")]
    NoSuccessfulDocuments { attempted: usize },
}

/// Produces the text of a document, or the reason it has none.
#[async_trait]
pub trait TextSource: Send + Sync {
    async fn load(&self, path: &Path) -> Result<DocumentText, ExtractionError>;
}

#[async_trait]
impl TextSource for DocumentLoader {
    async fn load(&self, path: &Path) -> Result<DocumentText, ExtractionError> {
        DocumentLoader::load(self, path).await
    }
}

/// Results of one batch, one entry per input document, in input order.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub documents: Vec<DocumentResult>,
}

impl BatchOutcome {
    pub fn succeeded(&self) -> usize {
        self.documents.iter().filter(|d| !d.is_failed()).count()
    }

    pub fn failed(&self) -> usize {
        self.documents.len() - self.succeeded()
    }

    /// A batch in which every document failed is a failure as a whole.
    pub fn ensure_any_succeeded(&self) -> Result<(), BatchError> {
        if self.succeeded() == 0 {
            return Err(BatchError::NoSuccessfulDocuments {
                attempted: self.documents.len(),
            });
        }
        Ok(())
    }
}

/// Feeds documents one at a time through the orchestrator.
pub struct BatchRunner<C, S> {
    orchestrator: TopicExtractionOrchestrator<C>,
    source: S,
}

impl<C: CompletionClient, S: TextSource> BatchRunner<C, S> {
    pub fn new(orchestrator: TopicExtractionOrchestrator<C>, source: S) -> Self {
        Self {
            orchestrator,
            source,
        }
    }

    pub async fn run(&self, paths: &[PathBuf]) -> BatchOutcome {
        let progress = self.orchestrator.progress();
        progress.report(ProgressEvent::BatchStarted {
            documents: paths.len(),
        });

        let mut documents = Vec::with_capacity(paths.len());

        for (index, path) in paths.iter().enumerate() {
            let path_str = path.to_string_lossy().to_string();
            progress.report(ProgressEvent::DocumentStarted {
                index,
                name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path_str.clone()),
            });

            let text = self.source.load(path).await;
            documents.push(self.orchestrator.process(&path_str, text).await);
        }

        let outcome = BatchOutcome { documents };
        info!(
            succeeded = outcome.succeeded(),
            failed = outcome.failed(),
            "Batch complete"
        );
        outcome
    }
}
