use extract::{ProgressEvent, ProgressSink, TracingProgress};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Counts pipeline events for the end-of-run summary and forwards every
/// event to the log.
pub struct ProgressCounters {
    started: Instant,

    // Documents
    documents_started: AtomicUsize,
    documents_finished: AtomicUsize,
    documents_failed: AtomicUsize,

    // Sessions
    resets_confirmed: AtomicUsize,
    resets_failed: AtomicUsize,

    // Queries
    topics_finished: AtomicUsize,
    topics_empty: AtomicUsize,
    tier_queries: AtomicUsize,
    citations: AtomicUsize,

    log: TracingProgress,
}

impl ProgressCounters {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            started: Instant::now(),
            documents_started: AtomicUsize::new(0),
            documents_finished: AtomicUsize::new(0),
            documents_failed: AtomicUsize::new(0),
            resets_confirmed: AtomicUsize::new(0),
            resets_failed: AtomicUsize::new(0),
            topics_finished: AtomicUsize::new(0),
            topics_empty: AtomicUsize::new(0),
            tier_queries: AtomicUsize::new(0),
            citations: AtomicUsize::new(0),
            log: TracingProgress,
        })
    }

    fn record(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::BatchStarted { .. } | ProgressEvent::TopicStarted { .. } => {}
            ProgressEvent::DocumentStarted { .. } => {
                self.documents_started.fetch_add(1, Ordering::Relaxed);
            }
            ProgressEvent::SessionReset { success } => {
                if *success {
                    self.resets_confirmed.fetch_add(1, Ordering::Relaxed);
                } else {
                    self.resets_failed.fetch_add(1, Ordering::Relaxed);
                }
            }
            ProgressEvent::TierQueried { .. } => {
                self.tier_queries.fetch_add(1, Ordering::Relaxed);
            }
            ProgressEvent::TopicFinished { empty, citations, .. } => {
                self.topics_finished.fetch_add(1, Ordering::Relaxed);
                if *empty {
                    self.topics_empty.fetch_add(1, Ordering::Relaxed);
                }
                self.citations.fetch_add(*citations, Ordering::Relaxed);
            }
            ProgressEvent::DocumentFinished { .. } => {
                self.documents_finished.fetch_add(1, Ordering::Relaxed);
            }
            ProgressEvent::DocumentFailed { .. } => {
                self.documents_failed.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            documents_started: self.documents_started.load(Ordering::Relaxed),
            documents_finished: self.documents_finished.load(Ordering::Relaxed),
            documents_failed: self.documents_failed.load(Ordering::Relaxed),
            resets_confirmed: self.resets_confirmed.load(Ordering::Relaxed),
            resets_failed: self.resets_failed.load(Ordering::Relaxed),
            topics_finished: self.topics_finished.load(Ordering::Relaxed),
            topics_empty: self.topics_empty.load(Ordering::Relaxed),
            tier_queries: self.tier_queries.load(Ordering::Relaxed),
            citations: self.citations.load(Ordering::Relaxed),
            elapsed_secs: self.started.elapsed().as_secs_f64(),
        }
    }
}

impl ProgressSink for ProgressCounters {
    fn report(&self, event: ProgressEvent) {
        self.record(&event);
        self.log.report(event);
    }
}

#[derive(Debug, Serialize)]
pub struct ProgressSnapshot {
    pub documents_started: usize,
    pub documents_finished: usize,
    pub documents_failed: usize,
    pub resets_confirmed: usize,
    pub resets_failed: usize,
    pub topics_finished: usize,
    pub topics_empty: usize,
    pub tier_queries: usize,
    pub citations: usize,
    pub elapsed_secs: f64,
}

impl ProgressSnapshot {
    /// Pretty JSON for the end-of-run summary.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
