use crate::escalation::{EscalationController, EscalationPolicy, PromptedQuery};
use crate::llm::CompletionClient;
use crate::normalizer::ResponseNormalizer;
use crate::pacing::PacedClient;
use crate::progress::{ProgressEvent, ProgressSink, TracingProgress};
use crate::schema::{DocumentResult, Topic};
use crate::session::SessionReset;
use ingest::{DocumentText, ExtractionError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub escalation: EscalationPolicy,
    /// Minimum gap between any two model calls
    pub query_delay: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            escalation: EscalationPolicy::default(),
            query_delay: Duration::from_secs(1),
        }
    }
}

/// Runs every configured topic against one document at a time.
pub struct TopicExtractionOrchestrator<C> {
    client: PacedClient<C>,
    topics: Vec<Topic>,
    controller: EscalationController,
    session: SessionReset,
    progress: Arc<dyn ProgressSink>,
}

impl<C: CompletionClient> TopicExtractionOrchestrator<C> {
    pub fn new(client: C, topics: Vec<Topic>, settings: PipelineSettings) -> Self {
        Self {
            client: PacedClient::new(client, settings.query_delay),
            topics,
            controller: EscalationController::new(settings.escalation, ResponseNormalizer::new()),
            session: SessionReset::new(),
            progress: Arc::new(TracingProgress),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_normalizer(mut self, normalizer: ResponseNormalizer) -> Self {
        let policy = self.controller.policy().clone();
        self.controller = EscalationController::new(policy, normalizer);
        self
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn progress(&self) -> &Arc<dyn ProgressSink> {
        &self.progress
    }

    /// Extract every topic from one document.
    ///
    /// Never fails: extraction errors and query errors are recorded on the
    /// returned result. The first failing topic stops the document; topics
    /// already completed are kept.
    pub async fn process(
        &self,
        document_path: &str,
        document: Result<DocumentText, ExtractionError>,
    ) -> DocumentResult {
        let document = match document {
            Ok(document) => document,
            Err(e) => {
                let message = format!("Failed to extract text: {}", e);
                error!(document = %document_path, error = %e, "Failed to extract text");
                let result = DocumentResult::failed(document_path, message);
                self.report_failure(&result);
                return result;
            }
        };

        let mut result = DocumentResult::new(document_path);

        let reset = self.session.reset(&self.client).await;
        self.progress.report(ProgressEvent::SessionReset { success: reset });

        let query = PromptedQuery::new(&self.client);

        for topic in &self.topics {
            self.progress.report(ProgressEvent::TopicStarted {
                topic: topic.label().to_string(),
            });

            match self
                .controller
                .extract_with_progress(&document, topic, &query, self.progress.as_ref())
                .await
            {
                Ok(topic_result) => {
                    self.progress.report(ProgressEvent::TopicFinished {
                        topic: topic.label().to_string(),
                        empty: topic_result.is_empty(),
                        citations: topic_result.citations.len(),
                    });
                    result.insert(topic.clone(), topic_result);
                }
                Err(e) => {
                    error!(
                        document = %result.document_name,
                        topic = %topic,
                        error = %e,
                        "Error processing document"
                    );
                    result.failure = Some(format!("Error processing topic '{}': {}", topic, e));
                    break;
                }
            }
        }

        debug!(bytes = document.byte_len(), "Releasing document text");
        drop(document);

        if result.is_failed() {
            self.report_failure(&result);
        } else {
            info!(document = %result.document_name, "Completed all topics");
            self.progress.report(ProgressEvent::DocumentFinished {
                name: result.document_name.clone(),
                topics: result.topics.len(),
            });
        }

        result
    }

    fn report_failure(&self, result: &DocumentResult) {
        self.progress.report(ProgressEvent::DocumentFailed {
            name: result.document_name.clone(),
            message: result.failure.clone().unwrap_or_default(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::SENTINEL;
    use crate::testing::{RecordingProgress, ScriptedClient};
    use ingest::{Tierer, TieringPolicy};
    use std::path::PathBuf;

    fn topics(n: usize) -> Vec<Topic> {
        ["Base Wages", "Wage Growth", "Fringe Benefits", "Taxes", "Social Security Benefits"]
            .iter()
            .take(n)
            .map(|t| Topic::new(*t))
            .collect()
    }

    fn settings() -> PipelineSettings {
        PipelineSettings {
            query_delay: Duration::ZERO,
            ..PipelineSettings::default()
        }
    }

    fn deep_document() -> DocumentText {
        let pages: Vec<String> = (1..=24).map(|i| format!("economist page {}", i)).collect();
        Tierer::new(TieringPolicy::default()).tier(&pages, true)
    }

    #[tokio::test]
    async fn test_topics_in_declared_order_with_one_reset() {
        let client = Arc::new(ScriptedClient::constant("\"Quote\" (Page 2)"));
        let orchestrator = TopicExtractionOrchestrator::new(client.clone(), topics(3), settings());

        let flat = DocumentText::Flat { body: "deposition".into() };
        let result = orchestrator.process("/cases/depo.txt", Ok(flat)).await;

        let labels: Vec<&str> = result.topics.iter().map(|e| e.topic.label()).collect();
        assert_eq!(labels, vec!["Base Wages", "Wage Growth", "Fringe Benefits"]);
        assert_eq!(client.calls(), 4);
        assert!(client.prompts()[0].contains("new document analysis session"));
        assert!(!result.is_failed());
    }

    #[tokio::test]
    async fn test_extraction_error_makes_no_queries() {
        let client = Arc::new(ScriptedClient::constant("N/A"));
        let progress = Arc::new(RecordingProgress::default());
        let orchestrator = TopicExtractionOrchestrator::new(client.clone(), topics(5), settings())
            .with_progress(progress.clone());

        let error = ExtractionError::Unsupported(PathBuf::from("/cases/scan.pdf"));
        let result = orchestrator.process("/cases/scan.pdf", Err(error)).await;

        assert_eq!(client.calls(), 0);
        assert!(result.topics.is_empty());
        assert!(result.failure.unwrap().contains("Unsupported file format"));
        assert!(matches!(
            progress.events().last(),
            Some(ProgressEvent::DocumentFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_failed_reset_still_processes_topics() {
        let client = Arc::new(ScriptedClient::failing_on(&[1]));
        let orchestrator = TopicExtractionOrchestrator::new(client.clone(), topics(2), settings());

        let flat = DocumentText::Flat { body: "deposition".into() };
        let result = orchestrator.process("/cases/depo.txt", Ok(flat)).await;

        assert!(!result.is_failed());
        assert_eq!(result.topics.len(), 2);
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn test_query_error_stops_document_and_keeps_completed_topics() {
        // Call 1 is the reset, call 2 topic one, call 3 topic two
        let client = Arc::new(ScriptedClient::failing_on(&[3]));
        let orchestrator = TopicExtractionOrchestrator::new(client.clone(), topics(5), settings());

        let flat = DocumentText::Flat { body: "deposition".into() };
        let result = orchestrator.process("/cases/depo.txt", Ok(flat)).await;

        assert_eq!(client.calls(), 3);
        assert_eq!(result.topics.len(), 1);
        let failure = result.failure.unwrap();
        assert!(failure.contains("Wage Growth"));
        assert!(failure.contains("Connection error"));
    }

    #[tokio::test]
    async fn test_deep_document_all_empty_costs_three_calls_per_topic() {
        let client = Arc::new(ScriptedClient::constant(SENTINEL));
        let progress = Arc::new(RecordingProgress::default());
        let orchestrator = TopicExtractionOrchestrator::new(client.clone(), topics(2), settings())
            .with_progress(progress.clone());

        let result = orchestrator
            .process("/cases/Expert Reports/econ.txt", Ok(deep_document()))
            .await;

        assert_eq!(client.calls(), 1 + 3 * 2);
        for entry in &result.topics {
            assert_eq!(entry.result.content, SENTINEL);
            assert_eq!(entry.result.tiers_queried, 3);
        }

        let tiers_reported = progress
            .events()
            .iter()
            .filter(|e| matches!(e, ProgressEvent::TierQueried { .. }))
            .count();
        assert_eq!(tiers_reported, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_applies_between_reset_and_every_tier_query() {
        let client = Arc::new(ScriptedClient::constant(SENTINEL));
        let orchestrator =
            TopicExtractionOrchestrator::new(client.clone(), topics(1), PipelineSettings::default());

        let start = tokio::time::Instant::now();
        orchestrator
            .process("/cases/Expert Reports/econ.txt", Ok(deep_document()))
            .await;

        // Reset plus three tiers, with a one-second gap before each of the last three
        assert_eq!(client.calls(), 4);
        assert!(start.elapsed() >= Duration::from_secs(3));
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_custom_normalizer_is_used() {
        let client = Arc::new(ScriptedClient::constant("Not addressed in this report."));
        let normalizer = ResponseNormalizer::with_extra_patterns(["not addressed"]).unwrap();
        let orchestrator = TopicExtractionOrchestrator::new(client.clone(), topics(1), settings())
            .with_normalizer(normalizer);

        let flat = DocumentText::Flat { body: "deposition".into() };
        let result = orchestrator.process("/cases/depo.txt", Ok(flat)).await;
        assert_eq!(result.topics[0].result.content, SENTINEL);
    }
}
