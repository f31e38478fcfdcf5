pub mod markdown;

pub use markdown::render_markdown;

use anyhow::{Context, Result};
use chrono::Local;
use extract::{DocumentResult, Topic};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Write here instead of searching for the work product folder
    pub output_dir: Option<PathBuf>,
    pub work_product_folder: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            work_product_folder: "Work Product".to_string(),
        }
    }
}

#[derive(Serialize)]
struct Manifest<'a> {
    generated_at: String,
    topics: &'a [Topic],
    documents: &'a [DocumentResult],
}

pub struct ReportWriter {
    config: ReportConfig,
}

impl ReportWriter {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Write the Markdown report and its JSON manifest; returns the report path.
    pub fn write(&self, topics: &[Topic], results: &[DocumentResult]) -> Result<PathBuf> {
        let start = match results.first() {
            Some(first) => PathBuf::from(&first.document_path),
            None => std::env::current_dir().context("Failed to determine working directory")?,
        };

        let output_dir = match &self.config.output_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
                dir.clone()
            }
            None => self.find_work_product_folder(&start)?,
        };

        let now = Local::now();
        let stem = format!("Document_Analysis_Report_{}", now.format("%Y%m%d_%H%M%S"));
        let generated_at = now.format("%Y-%m-%d %H:%M:%S").to_string();

        let report_path = output_dir.join(format!("{}.md", stem));
        let markdown = render_markdown(topics, results, &generated_at);
        std::fs::write(&report_path, markdown)
            .with_context(|| format!("Failed to write report: {:?}", report_path))?;

        let manifest_path = output_dir.join(format!("{}.json", stem));
        let manifest = Manifest {
            generated_at,
            topics,
            documents: results,
        };
        let json = serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
        std::fs::write(&manifest_path, json)
            .with_context(|| format!("Failed to write manifest: {:?}", manifest_path))?;

        info!(report = %report_path.display(), "Report created");
        Ok(report_path)
    }

    /// Nearest ancestor folder named `work_product_folder`, or a new one
    /// beside `start`.
    pub fn find_work_product_folder(&self, start: &Path) -> Result<PathBuf> {
        let absolute = std::path::absolute(start)
            .with_context(|| format!("Failed to resolve path: {:?}", start))?;

        for ancestor in absolute.ancestors() {
            let candidate = ancestor.join(&self.config.work_product_folder);
            if candidate.is_dir() {
                return Ok(candidate);
            }
        }

        let base = if absolute.is_dir() {
            absolute.clone()
        } else {
            absolute.parent().map(Path::to_path_buf).unwrap_or_else(|| absolute.clone())
        };
        let created = base.join(&self.config.work_product_folder);
        std::fs::create_dir_all(&created)
            .with_context(|| format!("Failed to create output directory: {:?}", created))?;
        Ok(created)
    }
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new(ReportConfig::default())
    }
}
