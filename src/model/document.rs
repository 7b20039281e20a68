//! Document-level types.

use super::{Page, TextRun};
use serde::{Deserialize, Serialize};

/// A document to be re-laid out after translation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Pages in the document, in order
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by its page number.
    pub fn get_page(&self, page_num: u32) -> Option<&Page> {
        self.pages.iter().find(|p| p.number == page_num)
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total number of blocks across all pages.
    pub fn block_count(&self) -> usize {
        self.pages.iter().map(|p| p.block_count()).sum()
    }

    /// Iterate over every text run in reading order.
    pub fn runs(&self) -> impl Iterator<Item = &TextRun> {
        self.pages
            .iter()
            .flat_map(|p| p.blocks.iter())
            .flat_map(|b| b.runs.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, BoundingBox};

    #[test]
    fn test_document_new() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.page_count(), 0);
        assert!(doc.get_page(0).is_none());
    }

    #[test]
    fn test_document_runs() {
        let mut doc = Document::new();
        let mut page = Page::letter(1);
        page.add_block(
            Block::paragraph("b1", BoundingBox::new(0.0, 0.0, 100.0, 20.0))
                .with_run(TextRun::new("r1", "a", "Arial", 10.0))
                .with_run(TextRun::new("r2", "b", "Arial", 10.0)),
        );
        doc.add_page(page);
        doc.add_page(Page::letter(2));

        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.block_count(), 1);
        let ids: Vec<_> = doc.runs().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
        assert_eq!(doc.get_page(2).map(|p| p.number), Some(2));
    }

    #[test]
    fn test_get_page_by_number() {
        // An excerpt starting at page 5 of a larger source.
        let mut doc = Document::new();
        doc.add_page(Page::letter(5));
        doc.add_page(Page::letter(6));

        assert_eq!(doc.get_page(6).map(|p| p.number), Some(6));
        assert!(doc.get_page(1).is_none());
        assert!(doc.get_page(2).is_none());
    }

    #[test]
    fn test_source_metadata_ignored() {
        let json = r#"{"metadata": {"title": "Rapport"}, "pages": []}"#;
        let doc: Document = serde_json::from_str(json).unwrap();
        assert!(doc.is_empty());
    }
}
