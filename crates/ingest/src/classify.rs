use std::path::Path;

/// Decides whether a document gets tiered extraction.
///
/// Classification is by path only; content is never inspected.
#[derive(Debug, Clone)]
pub struct DeepDocumentClassifier {
    marker: String,
}

impl DeepDocumentClassifier {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    pub fn is_deep(&self, path: &Path) -> bool {
        !self.marker.is_empty() && path.to_string_lossy().contains(&self.marker)
    }
}

impl Default for DeepDocumentClassifier {
    fn default() -> Self {
        Self::new("Expert Reports")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_in_any_component() {
        let classifier = DeepDocumentClassifier::default();

        assert!(classifier.is_deep(Path::new("/cases/smith/Expert Reports/econ.txt")));
        assert!(!classifier.is_deep(Path::new("/cases/smith/Depositions/plaintiff.txt")));
    }

    #[test]
    fn test_empty_marker_never_matches() {
        let classifier = DeepDocumentClassifier::new("");
        assert!(!classifier.is_deep(Path::new("/anything/at/all.txt")));
    }
}
