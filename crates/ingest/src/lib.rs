pub mod classify;
pub mod discover;
pub mod document;
pub mod error;
pub mod reader;
pub mod tiering;

pub use classify::DeepDocumentClassifier;
pub use discover::discover_documents;
pub use document::{generate_doc_id, DocumentText, TierKind, TierText};
pub use error::ExtractionError;
pub use reader::PagedReader;
pub use tiering::{Tierer, TieringPolicy};

use std::path::Path;
use tracing::info;

/// Loads a document from disk into its tiered or flat text form.
pub struct DocumentLoader {
    classifier: DeepDocumentClassifier,
    tierer: Tierer,
}

impl DocumentLoader {
    pub fn new(classifier: DeepDocumentClassifier, policy: TieringPolicy) -> Self {
        Self {
            classifier,
            tierer: Tierer::new(policy),
        }
    }

    pub fn default() -> Self {
        Self::new(DeepDocumentClassifier::default(), TieringPolicy::default())
    }

    /// Read pages, classify, tier
    pub async fn load(&self, path: &Path) -> Result<DocumentText, ExtractionError> {
        let pages = PagedReader::read_pages(path).await?;
        let is_deep = self.classifier.is_deep(path);

        info!(
            path = %path.display(),
            pages = pages.len(),
            deep = is_deep,
            "Extracted document text"
        );

        Ok(self.tierer.tier(&pages, is_deep))
    }
}
