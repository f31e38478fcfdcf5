use crate::error::ExtractionError;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Page separator emitted by `pdftotext` and most text-layer dumps.
pub const PAGE_BREAK: char = '\x0c';

pub struct PagedReader;

impl PagedReader {
    /// Read a text file and split it into pages on form feeds.
    pub async fn read_pages(path: &Path) -> Result<Vec<String>, ExtractionError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "txt" | "text" | "md" => {
                let bytes = fs::read(path).await.map_err(|source| ExtractionError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                let content = String::from_utf8_lossy(&bytes);
                let pages = split_pages(&content);

                if pages.iter().all(|p| p.trim().is_empty()) {
                    return Err(ExtractionError::Empty(path.to_path_buf()));
                }

                debug!(path = %path.display(), pages = pages.len(), "Read document pages");
                Ok(pages)
            }
            _ => Err(ExtractionError::Unsupported(path.to_path_buf())),
        }
    }
}

/// Split on form feeds, dropping a trailing empty page left by a final break.
pub fn split_pages(content: &str) -> Vec<String> {
    let mut pages: Vec<String> = content.split(PAGE_BREAK).map(str::to_string).collect();
    if pages.len() > 1 && pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pages_on_form_feed() {
        let pages = split_pages("one\x0ctwo\x0cthree\x0c");
        assert_eq!(pages, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_no_form_feed_is_single_page() {
        assert_eq!(split_pages("just text"), vec!["just text"]);
    }

    #[tokio::test]
    async fn test_read_pages_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");
        std::fs::write(&path, "first\x0csecond").unwrap();

        let pages = PagedReader::read_pages(&path).await.unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1], "second");
    }

    #[tokio::test]
    async fn test_rejects_unsupported_and_empty() {
        let dir = tempfile::tempdir().unwrap();

        let pdf = dir.path().join("scan.pdf");
        std::fs::write(&pdf, b"%PDF-1.7").unwrap();
        assert!(matches!(
            PagedReader::read_pages(&pdf).await,
            Err(ExtractionError::Unsupported(_))
        ));

        let blank = dir.path().join("blank.txt");
        std::fs::write(&blank, "  \x0c \n").unwrap();
        assert!(matches!(
            PagedReader::read_pages(&blank).await,
            Err(ExtractionError::Empty(_))
        ));

        let missing = dir.path().join("missing.txt");
        assert!(matches!(
            PagedReader::read_pages(&missing).await,
            Err(ExtractionError::Io { .. })
        ));
    }
}
