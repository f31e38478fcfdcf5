use std::path::PathBuf;
use thiserror::Error;

/// Text could not be obtained from a document.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file format: {}", .0.display())]
    Unsupported(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No extractable text in {}", .0.display())]
    Empty(PathBuf),
}
