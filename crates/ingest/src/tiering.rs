use crate::document::{page_marker, DocumentText, TierKind, TierText};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TieringPolicy {
    pub primary_pages: usize,
    pub secondary_pages: usize,
    /// Pages beyond this index are never read
    pub page_cap: usize,
}

impl Default for TieringPolicy {
    fn default() -> Self {
        Self {
            primary_pages: 10,
            secondary_pages: 10,
            page_cap: 250,
        }
    }
}

pub struct Tierer {
    policy: TieringPolicy,
}

impl Tierer {
    pub fn new(policy: TieringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &TieringPolicy {
        &self.policy
    }

    /// Partition page texts into a flat body or three priority tiers.
    ///
    /// Deep documents are split by absolute page index into
    /// `[0, p)`, `[p, p + s)` and `[p + s, N)` where `N` is the page count
    /// clamped to the page cap. Short documents produce empty trailing tiers.
    pub fn tier(&self, pages: &[String], is_deep_document: bool) -> DocumentText {
        let page_count = pages.len().min(self.policy.page_cap);
        let pages = &pages[..page_count];

        if !is_deep_document {
            return DocumentText::Flat {
                body: render_pages(pages, 0),
            };
        }

        let primary_end = self.policy.primary_pages.min(page_count);
        let secondary_end = (self.policy.primary_pages + self.policy.secondary_pages).min(page_count);

        let bounds = [
            (TierKind::Primary, 0, primary_end),
            (TierKind::Secondary, primary_end, secondary_end),
            (TierKind::Tertiary, secondary_end, page_count),
        ];

        let tiers = bounds
            .into_iter()
            .map(|(kind, start, end)| {
                debug!(tier = %kind, start_page = start + 1, end_page = end, "Building tier");
                TierText {
                    kind,
                    text: render_pages(&pages[start..end], start),
                    first_page: (end > start).then_some(start + 1),
                    page_count: end - start,
                }
            })
            .collect();

        DocumentText::Tiered { tiers }
    }
}

impl Default for Tierer {
    fn default() -> Self {
        Self::new(TieringPolicy::default())
    }
}

/// Concatenate pages, each followed by its 1-based page marker.
/// `offset` is the absolute index of the first page in the slice.
pub fn render_pages(pages: &[String], offset: usize) -> String {
    let mut text = String::with_capacity(pages.iter().map(|p| p.len() + 20).sum());
    for (i, page) in pages.iter().enumerate() {
        text.push_str(page);
        text.push_str(&page_marker(offset + i + 1));
    }
    text
}
