use anyhow::{Context, Result};
use extract::{EscalationPolicy, PipelineSettings, Topic};
use ingest::{DeepDocumentClassifier, TieringPolicy};
use report::ReportConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub pipeline: PipelineConfig,
    pub report: ReportConfig,
    pub topics: TopicList,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Anthropic,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: Provider,
    /// Provider default when unset
    pub endpoint: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Skips model probing when set
    pub model: Option<String>,
    /// Probed in order at startup when `model` is unset
    pub model_candidates: Vec<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub min_content_chars: usize,
    pub query_delay_ms: u64,
    pub primary_pages: usize,
    pub secondary_pages: usize,
    pub page_cap: usize,
    pub deep_path_marker: String,
    /// Added to the built-in "found nothing" patterns
    pub extra_no_answer_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicList(pub Vec<String>);

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Anthropic,
            endpoint: None,
            api_key: None,
            model: None,
            model_candidates: vec![
                "claude-3-5-sonnet-20241022".to_string(),
                "claude-3-sonnet-20240229".to_string(),
            ],
            max_tokens: 4000,
            temperature: 0.0,
            request_timeout_secs: 300,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_content_chars: 100,
            query_delay_ms: 1000,
            primary_pages: 10,
            secondary_pages: 10,
            page_cap: 250,
            deep_path_marker: "Expert Reports".to_string(),
            extra_no_answer_patterns: Vec::new(),
        }
    }
}

impl Default for TopicList {
    fn default() -> Self {
        Self(
            [
                "Personal History and Living Situation (basic plaintiff facts)",
                "Education History (Plaintiff Only - Do not include Author or Expert Education History)",
                "Pre-Event Employment History (Jobs prior to accident)",
                "Employment at the Time of the Event",
                "Post Event Employment (jobs after the accident)",
                "Base Wages (earnings around the time of the accident)",
                "Wage Growth (how much earnings are expected to grow)",
                "Fringe Benefits (Employer-Paid Benefits)",
                "Taxes",
                "Work Life Expectancy (how long plaintiff is expected to work)",
                "Social Security Benefits",
                "Discounting to Present Value (discount rate or inflation)",
                "Loss of Household Services",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        )
    }
}

impl AppConfig {
    /// Defaults, overlaid by the TOML file if given, then by the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {:?}", path))?;
                Self::from_toml(&raw).with_context(|| format!("Invalid config file: {:?}", path))?
            }
            None => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        if config.topics.0.is_empty() {
            anyhow::bail!("At least one topic must be configured");
        }
        Ok(config)
    }

    /// Supported env vars:
    /// - `ANTHROPIC_API_KEY`
    /// - `LLM_ENDPOINT`
    /// - `LLM_MODEL`
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            if !key.trim().is_empty() {
                self.llm.api_key = Some(key.trim().to_string());
            }
        }
        if let Ok(endpoint) = std::env::var("LLM_ENDPOINT") {
            self.llm.endpoint = Some(endpoint);
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            self.llm.model = Some(model);
        }
        self
    }

    pub fn topics(&self) -> Vec<Topic> {
        self.topics.0.iter().map(|t| Topic::new(t.as_str())).collect()
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            escalation: EscalationPolicy {
                min_content_chars: self.pipeline.min_content_chars,
            },
            query_delay: Duration::from_millis(self.pipeline.query_delay_ms),
        }
    }

    pub fn tiering_policy(&self) -> TieringPolicy {
        TieringPolicy {
            primary_pages: self.pipeline.primary_pages,
            secondary_pages: self.pipeline.secondary_pages,
            page_cap: self.pipeline.page_cap,
        }
    }

    pub fn classifier(&self) -> DeepDocumentClassifier {
        DeepDocumentClassifier::new(self.pipeline.deep_path_marker.as_str())
    }
}

impl LlmConfig {
    pub fn endpoint(&self) -> String {
        match (&self.endpoint, self.provider) {
            (Some(endpoint), _) => endpoint.clone(),
            (None, Provider::Anthropic) => "https://api.anthropic.com".to_string(),
            (None, Provider::Ollama) => "http://localhost:11434".to_string(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
