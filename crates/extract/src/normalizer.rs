use crate::schema::Answer;
use regex::RegexSet;
use std::sync::LazyLock;
use tracing::warn;

/// Reserved answer meaning "no information found".
pub const SENTINEL: &str = "N/A";

/// Phrases models use to say they found nothing, matched against the
/// lower-cased, trimmed answer.
pub const NO_ANSWER_PATTERNS: &[&str] = &[
    r"based on my review.*no.*found",
    r"no (relevant )?(quotes|information|data|content|text) (was |were )?found",
    r"no relevant (quotes|information|data|content|text)",
    r"no (quotes|information|data|content|text) (related|relevant|pertaining|referring)",
    r"i (do not|don't|cannot|can't|could not|couldn't) find",
    r"there (is|are|was|were) no",
    r"(the )?document does not (contain|include|mention|discuss|address)",
    r"nothing in the document",
];

static BUILTIN_PATTERNS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new(NO_ANSWER_PATTERNS).expect("built-in no-answer patterns are valid")
});

/// Classifies raw model answers and canonicalizes "nothing found" to [`SENTINEL`].
#[derive(Debug, Clone)]
pub struct ResponseNormalizer {
    patterns: RegexSet,
}

impl ResponseNormalizer {
    pub fn new() -> Self {
        Self {
            patterns: BUILTIN_PATTERNS.clone(),
        }
    }

    /// Built-in patterns plus operator-supplied ones. Extras are compiled
    /// case-insensitively, with the pattern text kept as written.
    pub fn with_extra_patterns<I, S>(extra: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut all: Vec<String> = NO_ANSWER_PATTERNS.iter().map(|p| p.to_string()).collect();
        all.extend(extra.into_iter().map(|p| format!("(?i:{})", p.as_ref())));
        Ok(Self {
            patterns: RegexSet::new(all)?,
        })
    }

    pub fn normalize(&self, raw: &str) -> Answer {
        let trimmed = raw.trim();
        let is_empty = self.is_no_answer(trimmed);

        let content = if is_empty {
            if trimmed != SENTINEL {
                warn!(chars = trimmed.len(), "Cleaning up verbose no-answer response");
            }
            SENTINEL.to_string()
        } else {
            trimmed.to_string()
        };

        Answer {
            raw: raw.to_string(),
            is_empty,
            content,
        }
    }

    /// True for the sentinel (bare or embedded in a verbose answer), an
    /// answer with no text at all, or any "found nothing" phrasing.
    pub fn is_no_answer(&self, trimmed: &str) -> bool {
        if trimmed.is_empty() || trimmed.contains(SENTINEL) {
            return true;
        }
        self.patterns.is_match(&trimmed.to_lowercase())
    }
}

impl Default for ResponseNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
