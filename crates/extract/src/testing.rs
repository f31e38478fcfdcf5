//! Scripted doubles shared by unit tests.

use crate::escalation::TierQuery;
use crate::llm::{CompletionClient, LlmError};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::schema::Topic;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

type Responder = Box<dyn Fn(usize, &str, &str) -> Result<String, LlmError> + Send + Sync>;

/// Completion client answering from a closure of (call number, system, prompt).
pub struct ScriptedClient {
    respond: Responder,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(usize, &str, &str) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn constant(answer: &str) -> Self {
        let answer = answer.to_string();
        Self::new(move |_, _, _| Ok(answer.clone()))
    }

    /// Answers "ok" except on the given 1-based call numbers.
    pub fn failing_on(failing_calls: &[usize]) -> Self {
        let failing_calls = failing_calls.to_vec();
        Self::new(move |call, _, _| {
            if failing_calls.contains(&call) {
                Err(LlmError::Connection(format!("call {} refused", call)))
            } else {
                Ok("ok".to_string())
            }
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.prompts.lock().unwrap().push(prompt.to_string());
        (self.respond)(call, system, prompt)
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Tier query returning queued answers in order.
pub struct ScriptedTierQuery {
    answers: Mutex<VecDeque<Result<String, LlmError>>>,
    texts: Mutex<Vec<String>>,
}

impl ScriptedTierQuery {
    pub fn new(answers: Vec<Result<String, LlmError>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            texts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.texts.lock().unwrap().len()
    }

    /// Tier texts received, in call order
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TierQuery for ScriptedTierQuery {
    async fn ask(&self, tier_text: &str, _topic: &Topic) -> Result<String, LlmError> {
        self.texts.lock().unwrap().push(tier_text.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected tier query #{}", self.calls()))
    }
}

#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingProgress {
    fn report(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}
