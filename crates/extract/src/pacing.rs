use crate::llm::{CompletionClient, LlmError};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Enforces a minimum gap between successive calls to the wrapped client.
///
/// The gap is measured from the end of one call, successful or not, to the
/// start of the next.
pub struct PacedClient<C> {
    inner: C,
    interval: Duration,
    last_finished: Mutex<Option<Instant>>,
}

impl<C: CompletionClient> PacedClient<C> {
    pub fn new(inner: C, interval: Duration) -> Self {
        Self {
            inner,
            interval,
            last_finished: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[async_trait]
impl<C: CompletionClient> CompletionClient for PacedClient<C> {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let mut last_finished = self.last_finished.lock().await;

        if let Some(finished) = *last_finished {
            let ready_at = finished + self.interval;
            if ready_at > Instant::now() {
                debug!(wait_ms = (ready_at - Instant::now()).as_millis() as u64, "Pacing model call");
                sleep_until(ready_at).await;
            }
        }

        let result = self.inner.complete(system, prompt).await;
        *last_finished = Some(Instant::now());
        result
    }

    fn model(&self) -> &str {
        self.inner.model()
    }
}
