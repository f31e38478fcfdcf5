use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Priority slot of a tier inside a deep document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierKind {
    Primary,
    Secondary,
    Tertiary,
}

impl TierKind {
    pub const ALL: [TierKind; 3] = [TierKind::Primary, TierKind::Secondary, TierKind::Tertiary];

    pub fn as_str(&self) -> &'static str {
        match self {
            TierKind::Primary => "primary",
            TierKind::Secondary => "secondary",
            TierKind::Tertiary => "tertiary",
        }
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concatenated text of a contiguous page range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierText {
    pub kind: TierKind,
    pub text: String,
    /// 1-based number of the first page, or `None` for an empty tier
    pub first_page: Option<usize>,
    pub page_count: usize,
}

impl TierText {
    pub fn is_empty(&self) -> bool {
        self.page_count == 0
    }
}

/// Extracted text of one source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "lowercase")]
pub enum DocumentText {
    Flat { body: String },
    Tiered { tiers: Vec<TierText> },
}

impl DocumentText {
    pub fn is_tiered(&self) -> bool {
        matches!(self, DocumentText::Tiered { .. })
    }

    pub fn tier_count(&self) -> usize {
        match self {
            DocumentText::Flat { .. } => 1,
            DocumentText::Tiered { tiers } => tiers.len(),
        }
    }

    /// Total bytes of text held, used when logging the reclaim point.
    pub fn byte_len(&self) -> usize {
        match self {
            DocumentText::Flat { body } => body.len(),
            DocumentText::Tiered { tiers } => tiers.iter().map(|t| t.text.len()).sum(),
        }
    }
}

/// Page-boundary marker appended after every page's text.
///
/// The model is asked to cite pages as "(Page N)"; the marker gives it the
/// page numbers to cite.
pub fn page_marker(page_number: usize) -> String {
    format!("\n--- Page {} ---\n", page_number)
}

/// Generate a stable document ID from file path
pub fn generate_doc_id(path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..16])
}
