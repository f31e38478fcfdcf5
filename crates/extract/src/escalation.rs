use crate::llm::{CompletionClient, LlmError};
use crate::normalizer::{ResponseNormalizer, SENTINEL};
use crate::progress::{NoProgress, ProgressEvent, ProgressSink};
use crate::prompt;
use crate::schema::{Answer, Topic, TopicResult};
use async_trait::async_trait;
use ingest::{DocumentText, TierKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Asks the model about one topic against one slice of document text.
#[async_trait]
pub trait TierQuery: Send + Sync {
    async fn ask(&self, tier_text: &str, topic: &Topic) -> Result<String, LlmError>;
}

/// [`TierQuery`] that wraps the text in the extraction prompt and sends it
/// with the extraction system instruction.
pub struct PromptedQuery<'a, C: ?Sized> {
    client: &'a C,
    system: String,
}

impl<'a, C: CompletionClient + ?Sized> PromptedQuery<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            system: prompt::extraction_system_instruction(),
        }
    }
}

#[async_trait]
impl<'a, C: CompletionClient + ?Sized> TierQuery for PromptedQuery<'a, C> {
    async fn ask(&self, tier_text: &str, topic: &Topic) -> Result<String, LlmError> {
        let prompt = prompt::build_extraction_prompt(topic.label(), tier_text);
        self.client.complete(&self.system, &prompt).await
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationPolicy {
    /// Answers shorter than this (in characters) count as weak evidence
    pub min_content_chars: usize,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            min_content_chars: 100,
        }
    }
}

/// Drives tier-by-tier queries for one (document, topic) pair.
pub struct EscalationController {
    policy: EscalationPolicy,
    normalizer: ResponseNormalizer,
}

impl EscalationController {
    pub fn new(policy: EscalationPolicy, normalizer: ResponseNormalizer) -> Self {
        Self { policy, normalizer }
    }

    pub fn default() -> Self {
        Self::new(EscalationPolicy::default(), ResponseNormalizer::new())
    }

    pub fn policy(&self) -> &EscalationPolicy {
        &self.policy
    }

    pub async fn extract<Q>(
        &self,
        document: &DocumentText,
        topic: &Topic,
        query: &Q,
    ) -> Result<TopicResult, LlmError>
    where
        Q: TierQuery + ?Sized,
    {
        self.extract_with_progress(document, topic, query, &NoProgress).await
    }

    /// Query tiers in priority order until the evidence is sufficient, then
    /// merge. Any query failure aborts the whole topic.
    pub async fn extract_with_progress<Q>(
        &self,
        document: &DocumentText,
        topic: &Topic,
        query: &Q,
        progress: &dyn ProgressSink,
    ) -> Result<TopicResult, LlmError>
    where
        Q: TierQuery + ?Sized,
    {
        let answers = match document {
            DocumentText::Flat { body } => {
                vec![self.ask(query, body, topic, None, progress).await?]
            }
            DocumentText::Tiered { tiers } => {
                let mut answers: Vec<Answer> = Vec::with_capacity(tiers.len());
                for tier in tiers {
                    if !self.should_query_next(&answers) {
                        debug!(topic = %topic, tier = %tier.kind, "Skipping tier");
                        break;
                    }
                    let answer = self
                        .ask(query, &tier.text, topic, Some(tier.kind), progress)
                        .await?;
                    answers.push(answer);
                }
                answers
            }
        };

        Ok(TopicResult::from_content(merge_answers(&answers), answers.len()))
    }

    async fn ask<Q>(
        &self,
        query: &Q,
        text: &str,
        topic: &Topic,
        tier: Option<TierKind>,
        progress: &dyn ProgressSink,
    ) -> Result<Answer, LlmError>
    where
        Q: TierQuery + ?Sized,
    {
        let raw = query.ask(text, topic).await?;
        let answer = self.normalizer.normalize(&raw);

        progress.report(ProgressEvent::TierQueried {
            topic: topic.label().to_string(),
            tier,
            empty: answer.is_empty,
        });

        Ok(answer)
    }

    /// Escalation gate, given the answers of the tiers queried so far.
    fn should_query_next(&self, answers: &[Answer]) -> bool {
        match answers {
            [] => true,
            // Secondary: primary found nothing or too little
            [primary] => primary.is_empty || self.is_weak(primary),
            // Tertiary: both earlier tiers unproductive
            [primary, secondary] => {
                (primary.is_empty && secondary.is_empty)
                    || (self.is_weak(primary) && self.is_weak(secondary) && secondary.is_empty)
            }
            _ => false,
        }
    }

    fn is_weak(&self, answer: &Answer) -> bool {
        answer.content.chars().count() < self.policy.min_content_chars
    }
}

/// Join non-sentinel tier contents in tier order, or the sentinel if none.
pub fn merge_answers(answers: &[Answer]) -> String {
    let parts: Vec<&str> = answers
        .iter()
        .map(|a| a.content.trim())
        .filter(|c| *c != SENTINEL && !c.is_empty())
        .collect();

    if parts.is_empty() {
        SENTINEL.to_string()
    } else {
        parts.join("\n\n")
    }
}
