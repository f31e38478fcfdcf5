use crate::normalizer::SENTINEL;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)page\s+(\d+)").expect("citation pattern is valid"));

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*\)?").expect("parenthetical pattern is valid"));

/// One extraction category, e.g. "Base Wages".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn label(&self) -> &str {
        &self.0
    }

    /// Label without parenthetical notes, for headings.
    pub fn heading(&self) -> String {
        PARENTHETICAL.replace_all(&self.0, "").trim().to_string()
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Topic {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl From<String> for Topic {
    fn from(label: String) -> Self {
        Self(label)
    }
}

/// A normalized model answer for one tier and topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub raw: String,
    pub is_empty: bool,
    /// Sentinel when empty, otherwise the trimmed raw text
    pub content: String,
}

/// Merged extraction for one document and topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicResult {
    pub content: String,
    /// Cited page numbers, de-duplicated in order of first appearance
    pub citations: Vec<u32>,
    pub tiers_queried: usize,
}

impl TopicResult {
    pub fn from_content(content: String, tiers_queried: usize) -> Self {
        let citations = if content == SENTINEL {
            Vec::new()
        } else {
            parse_citations(&content)
        };
        Self {
            content,
            citations,
            tiers_queried,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content == SENTINEL
    }
}

/// Collect "Page N" citations, case-insensitive, de-duplicated.
pub fn parse_citations(content: &str) -> Vec<u32> {
    let mut pages = Vec::new();
    for captures in CITATION.captures_iter(content) {
        if let Ok(page) = captures[1].parse::<u32>() {
            if !pages.contains(&page) {
                pages.push(page);
            }
        }
    }
    pages
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicEntry {
    pub topic: Topic,
    pub result: TopicResult,
}

/// Everything extracted from one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub document_id: String,
    pub document_name: String,
    pub document_path: String,
    /// In topic declaration order
    pub topics: Vec<TopicEntry>,
    pub failure: Option<String>,
}

impl DocumentResult {
    pub fn new(document_path: &str) -> Self {
        let document_name = std::path::Path::new(document_path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| document_path.to_string());

        Self {
            document_id: ingest::generate_doc_id(document_path),
            document_name,
            document_path: document_path.to_string(),
            topics: Vec::new(),
            failure: None,
        }
    }

    pub fn failed(document_path: &str, message: impl Into<String>) -> Self {
        let mut result = Self::new(document_path);
        result.failure = Some(message.into());
        result
    }

    pub fn insert(&mut self, topic: Topic, result: TopicResult) {
        self.topics.push(TopicEntry { topic, result });
    }

    pub fn get(&self, topic: &Topic) -> Option<&TopicResult> {
        self.topics
            .iter()
            .find(|entry| &entry.topic == topic)
            .map(|entry| &entry.result)
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_citations_in_order_without_duplicates() {
        let content = "\"Earned $40k\" (Page 3)\n\n\"Raise in 2020\" (page 12)\n\n\"Again\" (PAGE 3)";
        assert_eq!(parse_citations(content), vec![3, 12]);
    }

    #[test]
    fn test_sentinel_has_no_citations() {
        let result = TopicResult::from_content(SENTINEL.to_string(), 3);
        assert!(result.is_empty());
        assert!(result.citations.is_empty());
    }

    #[test]
    fn test_heading_strips_parentheticals() {
        let topic = Topic::new("Base Wages (earnings around the time of the accident)");
        assert_eq!(topic.heading(), "Base Wages");

        // Unclosed parenthetical in the label
        let topic = Topic::new("Education History (Plaintiff Only - Do not include Author");
        assert_eq!(topic.heading(), "Education History");

        assert_eq!(Topic::new("Taxes").heading(), "Taxes");
    }

    #[test]
    fn test_document_result_keeps_topic_order() {
        let mut doc = DocumentResult::new("/cases/Expert Reports/econ.txt");
        doc.insert(Topic::new("Taxes"), TopicResult::from_content("N/A".into(), 1));
        doc.insert(
            Topic::new("Base Wages"),
            TopicResult::from_content("\"$50,000\" (Page 2)".into(), 1),
        );

        assert_eq!(doc.document_name, "econ.txt");
        assert_eq!(doc.topics[0].topic.label(), "Taxes");
        assert_eq!(doc.get(&Topic::new("Base Wages")).unwrap().citations, vec![2]);
        assert!(!doc.is_failed());
    }
}
