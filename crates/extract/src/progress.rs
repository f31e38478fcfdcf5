use ingest::TierKind;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

/// Pipeline transitions reported to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    BatchStarted { documents: usize },
    DocumentStarted { index: usize, name: String },
    SessionReset { success: bool },
    TopicStarted { topic: String },
    /// `tier` is `None` for flat documents
    TierQueried { topic: String, tier: Option<TierKind>, empty: bool },
    TopicFinished { topic: String, empty: bool, citations: usize },
    DocumentFinished { name: String, topics: usize },
    DocumentFailed { name: String, message: String },
}

/// Receives progress events from the sequential worker.
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Logs every event through `tracing`.
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::BatchStarted { documents } => {
                info!(documents, "Processing documents");
            }
            ProgressEvent::DocumentStarted { index, name } => {
                info!(index, document = %name, "Processing document");
            }
            ProgressEvent::SessionReset { success } => {
                if success {
                    info!("Session reset confirmed");
                } else {
                    warn!("Session reset failed, continuing");
                }
            }
            ProgressEvent::TopicStarted { topic } => {
                info!(topic = %topic, "Processing topic");
            }
            ProgressEvent::TierQueried { topic, tier, empty } => {
                let tier = tier.map(|t| t.as_str()).unwrap_or("full");
                info!(topic = %topic, tier, empty, "Queried tier");
            }
            ProgressEvent::TopicFinished { topic, empty, citations } => {
                info!(topic = %topic, empty, citations, "Completed topic");
            }
            ProgressEvent::DocumentFinished { name, topics } => {
                info!(document = %name, topics, "Completed all topics");
            }
            ProgressEvent::DocumentFailed { name, message } => {
                warn!(document = %name, error = %message, "Document failed");
            }
        }
    }
}

/// Discards events.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Forwards events to a channel, e.g. for a UI running on another task.
impl ProgressSink for UnboundedSender<ProgressEvent> {
    fn report(&self, event: ProgressEvent) {
        // A closed receiver only means nobody is watching
        let _ = self.send(event);
    }
}
