use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions accepted when collecting documents from the selection.
///
/// Includes container formats the reader refuses, so a selected PDF is
/// reported as a failed document rather than silently skipped.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "docx", "doc", "txt", "text", "md"];

/// Expand files and folders into a de-duplicated, ordered document list.
pub fn discover_documents(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut documents = Vec::new();
    let mut seen = HashSet::new();

    for input in inputs {
        if input.is_file() {
            push_unique(input, &mut documents, &mut seen);
        } else if input.is_dir() {
            for entry in WalkDir::new(input)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                push_unique(entry.path(), &mut documents, &mut seen);
            }
        }
    }

    documents
}

fn push_unique(path: &Path, documents: &mut Vec<PathBuf>, seen: &mut HashSet<PathBuf>) {
    if !has_document_extension(path) {
        return;
    }
    let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if seen.insert(key) {
        documents.push(path.to_path_buf());
    }
}

fn has_document_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| DOCUMENT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walks_folders_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let reports = dir.path().join("Expert Reports");
        std::fs::create_dir(&reports).unwrap();
        std::fs::write(reports.join("a.txt"), "a").unwrap();
        std::fs::write(reports.join("b.TXT"), "b").unwrap();
        std::fs::write(reports.join("notes.csv"), "c").unwrap();

        let inputs = vec![reports.join("a.txt"), dir.path().to_path_buf()];
        let found = discover_documents(&inputs);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0], reports.join("a.txt"));
        assert!(found[1].ends_with("b.TXT"));
    }

    #[test]
    fn test_container_formats_are_discovered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("scan.pdf"), b"%PDF-1.7").unwrap();
        std::fs::write(dir.path().join("memo.docx"), b"PK").unwrap();

        let found = discover_documents(&[dir.path().to_path_buf()]);

        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("memo.docx"));
        assert!(found[1].ends_with("scan.pdf"));
    }

    #[test]
    fn test_missing_inputs_are_skipped() {
        let found = discover_documents(&[PathBuf::from("/definitely/not/here.txt")]);
        assert!(found.is_empty());
    }
}
