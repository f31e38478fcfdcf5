use crate::llm::CompletionClient;
use crate::prompt::{RESET_PROMPT, RESET_SYSTEM_INSTRUCTION};
use tracing::{debug, warn};

/// Tells the model to disregard everything from earlier documents.
///
/// Best effort: a failed reset is logged and the document is processed anyway.
/// The previous document's text is already released by the time this runs,
/// since the orchestrator consumes each document's text.
pub struct SessionReset {
    system: String,
    prompt: String,
}

impl SessionReset {
    pub fn new() -> Self {
        Self {
            system: RESET_SYSTEM_INSTRUCTION.to_string(),
            prompt: RESET_PROMPT.to_string(),
        }
    }

    pub async fn reset<C: CompletionClient + ?Sized>(&self, client: &C) -> bool {
        match client.complete(&self.system, &self.prompt).await {
            Ok(ack) => {
                debug!(ack = %ack.trim(), "Session reset acknowledged");
                true
            }
            Err(e) => {
                warn!(error = %e, "Error resetting model session");
                false
            }
        }
    }
}

impl Default for SessionReset {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedClient;

    #[tokio::test]
    async fn test_reset_sends_isolation_instruction() {
        let client = ScriptedClient::constant("Session reset confirmed");
        assert!(SessionReset::new().reset(&client).await);

        let sent = client.prompts();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("should be disregarded"));
    }

    #[tokio::test]
    async fn test_failed_reset_is_not_fatal() {
        let client = ScriptedClient::failing_on(&[1]);
        assert!(!SessionReset::new().reset(&client).await);
        assert_eq!(client.calls(), 1);
    }
}
