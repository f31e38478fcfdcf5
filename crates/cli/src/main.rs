mod config;
mod progress;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{AppConfig, LlmConfig, Provider};
use extract::{
    resolve_model, AnthropicClient, BatchRunner, CompletionClient, OllamaClient, ProgressSink,
    ResponseNormalizer, Sampling, TopicExtractionOrchestrator,
};
use ingest::DocumentLoader;
use progress::ProgressCounters;
use report::ReportWriter;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Probe requests only need to prove the model answers
const PROBE_MAX_TOKENS: u32 = 10;

#[derive(Parser)]
#[command(name = "quarry")]
#[command(about = "Extract cited quotes on fixed topics from case documents")]
#[command(version)]
struct Cli {
    /// TOML config file
    #[arg(short, long, global = true, env = "QUARRY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze documents and write the report
    Run {
        /// Files or directories to analyze
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Write the report here instead of the work product folder
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Use this model instead of probing candidates
        #[arg(short, long)]
        model: Option<String>,
        /// Minimum gap between model calls, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// List the configured topics
    Topics,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Topics => {
            for (i, topic) in config.topics().iter().enumerate() {
                println!("{:>2}. {}", i + 1, topic);
            }
            Ok(())
        }
        Commands::Run {
            paths,
            output,
            model,
            delay_ms,
        } => {
            if let Some(output) = output {
                config.report.output_dir = Some(output);
            }
            if let Some(model) = model {
                config.llm.model = Some(model);
            }
            if let Some(delay_ms) = delay_ms {
                config.pipeline.query_delay_ms = delay_ms;
            }
            run(config, paths).await
        }
    }
}

async fn run(config: AppConfig, paths: Vec<PathBuf>) -> Result<()> {
    let documents = ingest::discover_documents(&paths);
    if documents.is_empty() {
        anyhow::bail!("No supported documents found in {:?}", paths);
    }

    let client = build_client(&config.llm).await?;
    info!(model = client.model(), documents = documents.len(), "Starting analysis");

    let normalizer =
        ResponseNormalizer::with_extra_patterns(config.pipeline.extra_no_answer_patterns.iter())
            .context("Invalid extra_no_answer_patterns")?;
    let counters = ProgressCounters::new();
    let sink: Arc<dyn ProgressSink> = counters.clone();

    let topics = config.topics();
    let orchestrator =
        TopicExtractionOrchestrator::new(client, topics.clone(), config.pipeline_settings())
            .with_normalizer(normalizer)
            .with_progress(sink);
    let loader = DocumentLoader::new(config.classifier(), config.tiering_policy());

    let outcome = BatchRunner::new(orchestrator, loader).run(&documents).await;

    let report = ReportWriter::new(config.report.clone()).write(&topics, &outcome.documents)?;
    let snapshot = counters.snapshot();
    info!(
        succeeded = outcome.succeeded(),
        failed = outcome.failed(),
        "Analysis complete"
    );
    println!("{}", snapshot.to_json()?);
    println!("Report: {}", report.display());

    outcome.ensure_any_succeeded()?;
    Ok(())
}

/// Build the provider client, resolving the model by probing candidates
/// when none is pinned.
async fn build_client(llm: &LlmConfig) -> Result<Arc<dyn CompletionClient>> {
    let sampling = Sampling {
        max_tokens: llm.max_tokens,
        temperature: llm.temperature,
    };
    let probe_sampling = Sampling {
        max_tokens: PROBE_MAX_TOKENS,
        temperature: llm.temperature,
    };

    match llm.provider {
        Provider::Anthropic => {
            let api_key = llm
                .api_key
                .clone()
                .context("ANTHROPIC_API_KEY is not set")?;
            let base = AnthropicClient::new(
                llm.endpoint(),
                api_key,
                String::new(),
                sampling,
                llm.request_timeout(),
            )?;

            let model = match &llm.model {
                Some(model) => model.clone(),
                None => resolve_model(&llm.model_candidates, |candidate| {
                    base.with_model(candidate).with_sampling(probe_sampling.clone())
                })
                .await
                .context("No candidate models configured")?,
            };
            Ok(Arc::new(base.with_model(model)))
        }
        Provider::Ollama => {
            let model = match &llm.model {
                Some(model) => model.clone(),
                None => {
                    let base = OllamaClient::new(
                        llm.endpoint(),
                        String::new(),
                        probe_sampling,
                        llm.request_timeout(),
                    )?;
                    warn!("No model pinned for Ollama, probing candidates");
                    resolve_model(&llm.model_candidates, |candidate| base.with_model(candidate))
                        .await
                        .context("No candidate models configured")?
                }
            };
            Ok(Arc::new(OllamaClient::new(
                llm.endpoint(),
                model,
                sampling,
                llm.request_timeout(),
            )?))
        }
    }
}
